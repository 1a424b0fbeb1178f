use crate::extractor::{HttpMethod, RouteExtractor, RouteRecord, RouteTable};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

/// `<group>.<VERB>("<pattern>", <receiver>.<handler>)`
static REGISTRATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^.\w])(\w+)\.(GET|POST|PUT|PATCH|DELETE)\(\s*"([^"]*)"\s*,\s*\w+\.(\w+)\s*\)"#)
        .expect("valid registration regex")
});

static COLON_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(\w+)").expect("valid colon parameter regex"));

/// Extracts routes from Gin router groups.
///
/// Only registrations made on one of the two configured group identifiers are
/// recognized; the secured group marks its routes as requiring authentication.
#[derive(Debug, Clone)]
pub struct GinExtractor {
    public_group: String,
    secured_group: String,
}

impl Default for GinExtractor {
    fn default() -> Self {
        Self::new("api", "authorized")
    }
}

impl GinExtractor {
    pub fn new(public_group: impl Into<String>, secured_group: impl Into<String>) -> Self {
        Self {
            public_group: public_group.into(),
            secured_group: secured_group.into(),
        }
    }

    fn parse_registration(&self, caps: &regex::Captures<'_>) -> Option<RouteRecord> {
        let group = caps.get(1)?.as_str();
        let secured = if group == self.secured_group {
            true
        } else if group == self.public_group {
            false
        } else {
            trace!("Ignoring registration on group {}", group);
            return None;
        };

        Some(RouteRecord {
            path: braces_for_colons(caps.get(3)?.as_str()),
            method: HttpMethod::parse(caps.get(2)?.as_str())?,
            handler: caps.get(4)?.as_str().to_string(),
            secured,
        })
    }
}

impl RouteExtractor for GinExtractor {
    fn extract_routes(&self, source: &str) -> RouteTable {
        let mut table = RouteTable::new();
        for caps in REGISTRATION.captures_iter(source) {
            if let Some(route) = self.parse_registration(&caps) {
                debug!(
                    "Found route: {} {} -> {} (secured: {})",
                    route.method, route.path, route.handler, route.secured
                );
                table.insert(route);
            }
        }
        table
    }
}

/// Rewrites `:name` segments as `{name}`.
pub fn braces_for_colons(path: &str) -> String {
    COLON_PARAM.replace_all(path, "{$1}").into_owned()
}
