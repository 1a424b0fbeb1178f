//! Route table extraction from router source.
//!
//! The router is scanned as plain text rather than parsed, so registrations written in any
//! shape the pattern recognizes are picked up regardless of the surrounding code.
//!
//! # Example
//!
//! ```
//! use swag_from_source::extractor::{gin::GinExtractor, HttpMethod, RouteExtractor};
//!
//! let source = r#"authorized.GET("/users/:id", user.GetUser)"#;
//! let routes = GinExtractor::default().extract_routes(source);
//! let route = routes.get("GetUser").unwrap();
//! assert_eq!(route.path, "/users/{id}");
//! assert_eq!(route.method, HttpMethod::Get);
//! assert!(route.secured);
//! ```

pub mod gin;

use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Error;

/// Trait for turning router source into a handler-name keyed route table.
pub trait RouteExtractor {
    fn extract_routes(&self, source: &str) -> RouteTable;
}

/// HTTP methods a handler can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Parses a verb in any letter case.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Status code of the documented success response.
    pub fn success_code(&self) -> u16 {
        match self {
            HttpMethod::Post => 201,
            HttpMethod::Delete => 204,
            _ => 200,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One handler registration: where it is mounted and whether it sits behind auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// URL pattern with `{name}` placeholders
    pub path: String,
    pub method: HttpMethod,
    /// Bare handler function name
    pub handler: String,
    pub secured: bool,
}

/// Routes keyed by handler name. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteRecord>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route, replacing any earlier registration of the same handler.
    pub fn insert(&mut self, route: RouteRecord) {
        if let Some(previous) = self.routes.get(&route.handler) {
            debug!(
                "Handler {} registered again: {} {} replaces {} {}",
                route.handler, route.method, route.path, previous.method, previous.path
            );
        }
        self.routes.insert(route.handler.clone(), route);
    }

    pub fn get(&self, handler: &str) -> Option<&RouteRecord> {
        self.routes.get(handler)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteRecord> {
        self.routes.values()
    }
}

/// Reads the router file and extracts its routes.
///
/// An unreadable router is not fatal: the table comes back empty together with the
/// error, and every handler falls back to name-based inference.
pub fn load_route_table(path: &Path, extractor: &dyn RouteExtractor) -> (RouteTable, Option<Error>) {
    match fs::read_to_string(path) {
        Ok(source) => {
            let table = extractor.extract_routes(&source);
            debug!("Extracted {} routes from {}", table.len(), path.display());
            (table, None)
        }
        Err(source) => {
            warn!("Cannot read router file {}: {}", path.display(), source);
            (
                RouteTable::new(),
                Some(Error::RouterUnreadable {
                    path: path.to_path_buf(),
                    source,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_method_parse_and_render() {
        assert_eq!(HttpMethod::parse("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("Get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("HEAD"), None);
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_success_codes() {
        assert_eq!(HttpMethod::Post.success_code(), 201);
        assert_eq!(HttpMethod::Delete.success_code(), 204);
        assert_eq!(HttpMethod::Get.success_code(), 200);
        assert_eq!(HttpMethod::Put.success_code(), 200);
        assert_eq!(HttpMethod::Patch.success_code(), 200);
    }

    #[test]
    fn test_insert_last_wins() {
        let mut table = RouteTable::new();
        table.insert(RouteRecord {
            path: "/a".to_string(),
            method: HttpMethod::Get,
            handler: "H".to_string(),
            secured: false,
        });
        table.insert(RouteRecord {
            path: "/b".to_string(),
            method: HttpMethod::Post,
            handler: "H".to_string(),
            secured: true,
        });
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("H").unwrap().path, "/b");
    }

    #[test]
    fn test_load_missing_router_is_not_fatal() {
        let (table, err) = load_route_table(
            Path::new("/nonexistent/router.go"),
            &gin::GinExtractor::default(),
        );
        assert!(table.is_empty());
        assert!(matches!(err, Some(Error::RouterUnreadable { .. })));
    }

    #[test]
    fn test_load_router_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("router.go");
        std::fs::write(
            &path,
            "package router\n\nfunc Setup() {\n\tapi.POST(\"/login\", auth.Login)\n}\n",
        )
        .unwrap();

        let (table, err) = load_route_table(&path, &gin::GinExtractor::default());
        assert!(err.is_none());
        assert_eq!(table.get("Login").unwrap().method, HttpMethod::Post);
    }
}
