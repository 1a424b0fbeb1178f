use crate::parser::SyntaxCache;
use crate::scanner::{expand_glob, GlobPattern};
use crate::syntax::{Field, TypeExpr};
use log::{debug, warn};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static URI_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"uri:"([^"]*)""#).expect("valid uri tag regex"));

static REQUIRED_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"binding:"[^"]*required[^"]*""#).expect("valid binding tag regex")
});

/// Scalar kind of a path parameter as swag spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    /// Maps a Go type identifier to a parameter kind.
    pub fn from_go_type(ident: &str) -> Self {
        match ident {
            "int" | "int32" | "int64" | "uint" | "uint32" | "uint64" => ParamKind::Integer,
            "float32" | "float64" => ParamKind::Number,
            "bool" => ParamKind::Boolean,
            _ => ParamKind::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request-struct field bound to a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
}

/// Path bindings of one request type.
///
/// `found` is false for the "unknown" sentinel returned when no declaration matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTypeInfo {
    pub found: bool,
    pub params: HashMap<String, PathParam>,
}

impl RequestTypeInfo {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PathParam> {
        self.params.get(name)
    }
}

/// Request-struct reflector.
///
/// Looks request types up by name across the configured type-source globs, reading each
/// file through the shared [`SyntaxCache`]. Results, including misses, are memoized for
/// the lifetime of the resolver.
pub struct TypeResolver {
    type_sources: Vec<GlobPattern>,
    syntax_cache: Arc<SyntaxCache>,
    type_cache: RwLock<HashMap<String, Arc<RequestTypeInfo>>>,
}

impl TypeResolver {
    pub fn new(type_sources: Vec<GlobPattern>, syntax_cache: Arc<SyntaxCache>) -> Self {
        debug!("Initializing TypeResolver with {} type source globs", type_sources.len());
        Self {
            type_sources,
            syntax_cache,
            type_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves `pkg.Type` to its path-bound fields.
    ///
    /// Names that do not have exactly two segments resolve to the unknown sentinel.
    pub fn find_request_type(&self, qualified_name: &str) -> Arc<RequestTypeInfo> {
        if let Some(cached) = self.type_cache.read().get(qualified_name) {
            debug!("Type {} found in cache", qualified_name);
            return Arc::clone(cached);
        }

        let info = Arc::new(self.lookup(qualified_name));
        let mut cache = self.type_cache.write();
        let entry = cache
            .entry(qualified_name.to_string())
            .or_insert(info);
        Arc::clone(entry)
    }

    fn lookup(&self, qualified_name: &str) -> RequestTypeInfo {
        let segments: Vec<&str> = qualified_name.split('.').collect();
        let type_name = match segments.as_slice() {
            [_, name] => *name,
            _ => {
                debug!("Not a package-qualified type name: {}", qualified_name);
                return RequestTypeInfo::unknown();
            }
        };

        for pattern in &self.type_sources {
            for path in expand_glob(pattern) {
                let parsed = match self.syntax_cache.get_tree(&path) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!("Skipping type source {}: {:#}", path.display(), e);
                        continue;
                    }
                };

                let spec = parsed
                    .syntax_tree
                    .type_specs()
                    .find(|spec| spec.name == type_name);
                if let Some(spec) = spec {
                    debug!("Found type {} in {}", type_name, path.display());
                    return match &spec.ty {
                        TypeExpr::Struct(fields) => Self::reflect_fields(fields),
                        _ => RequestTypeInfo {
                            found: true,
                            params: HashMap::new(),
                        },
                    };
                }
            }
        }

        debug!("Type {} not found", qualified_name);
        RequestTypeInfo::unknown()
    }

    fn reflect_fields(fields: &[Field]) -> RequestTypeInfo {
        let mut params = HashMap::new();
        for field in fields {
            if let Some(param) = Self::path_param(field) {
                debug!("Found path binding {} ({})", param.name, param.kind);
                params.insert(param.name.clone(), param);
            }
        }
        RequestTypeInfo {
            found: true,
            params,
        }
    }

    /// Reads the `uri` and `binding` directives from a field's tag.
    fn path_param(field: &Field) -> Option<PathParam> {
        let tag = field.tag.as_deref()?;
        let name = URI_DIRECTIVE.captures(tag)?.get(1)?.as_str().to_string();

        // only bare identifiers carry a scalar kind; pointers, slices and the rest are strings
        let kind = match &field.ty {
            TypeExpr::Ident(ident) => ParamKind::from_go_type(ident),
            _ => ParamKind::String,
        };

        Some(PathParam {
            name,
            kind,
            required: REQUIRED_DIRECTIVE.is_match(tag),
        })
    }

    pub fn cached_types(&self) -> usize {
        self.type_cache.read().len()
    }
}
