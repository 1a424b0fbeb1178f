use crate::config::GeneratorConfig;
use crate::detector::HandlerDescriptor;
use crate::extractor::{HttpMethod, RouteRecord, RouteTable};
use crate::naming;
use crate::type_resolver::TypeResolver;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("valid placeholder regex"));

/// Assembles swag doc-comment blocks for handlers.
pub struct CommentBuilder<'a> {
    config: &'a GeneratorConfig,
    routes: &'a RouteTable,
    resolver: &'a TypeResolver,
}

impl<'a> CommentBuilder<'a> {
    pub fn new(config: &'a GeneratorConfig, routes: &'a RouteTable, resolver: &'a TypeResolver) -> Self {
        Self {
            config,
            routes,
            resolver,
        }
    }

    /// Route used for `handler`, with the API prefix applied.
    pub fn route_for(&self, handler: &HandlerDescriptor) -> RouteRecord {
        let mut route = naming::resolve_route(&handler.name, self.routes);
        route.path = self.apply_prefix(&route.path);
        route
    }

    fn apply_prefix(&self, path: &str) -> String {
        let prefix = self.config.api_prefix.as_str();
        if prefix.is_empty() || path.starts_with(prefix) {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", prefix.trim_end_matches('/'), path)
        } else {
            format!("{}{}", prefix, path)
        }
    }

    /// Directive lines without the comment marker.
    pub fn lines(&self, handler: &HandlerDescriptor) -> Vec<String> {
        let name = &handler.name;
        let pkg = &self.config.types_package;
        let route = self.route_for(handler);
        debug!(
            "Building comment for {}: {} {} (secured: {})",
            name, route.method, route.path, route.secured
        );

        let mut lines = vec![
            format!("{} godoc", name),
            format!("@Summary {}", naming::split_camel(name)),
            format!("@Description {}", naming::describe(name)),
            format!("@Tags {}", naming::tag_for_receiver(&handler.receiver)),
            "@Accept json".to_string(),
            "@Produce json".to_string(),
        ];

        lines.extend(self.path_param_lines(name, &route.path));

        let (location, required) = if route.method == HttpMethod::Get {
            ("query", false)
        } else {
            ("body", true)
        };
        lines.push(format!(
            "@Param req {} {}.{}Req {} \"req\"",
            location, pkg, name, required
        ));

        lines.push(format!(
            "@Success {} {{object}} {pkg}.Response{{data={pkg}.{}Resp}} \"Success\"",
            route.method.success_code(),
            name,
            pkg = pkg
        ));
        lines.push(format!("@Failure 400 {{object}} {}.Response \"Bad Request\"", pkg));
        lines.push(format!("@Failure 401 {{object}} {}.Response \"Unauthorized\"", pkg));
        lines.push(format!(
            "@Failure 500 {{object}} {}.Response \"Internal Server Error\"",
            pkg
        ));

        if route.secured {
            lines.push(format!("@Security {}", self.config.security_scheme));
        }
        lines.push(format!("@Router {} [{}]", route.path, route.method));

        lines
    }

    fn path_param_lines(&self, name: &str, path: &str) -> Vec<String> {
        let request_type = format!("{}.{}Req", self.config.types_package, name);
        let info = self.resolver.find_request_type(&request_type);

        PLACEHOLDER
            .captures_iter(path)
            .filter_map(|caps| caps.get(1))
            .map(|m| {
                let param = m.as_str();
                let (kind, required) = match info.get(param) {
                    Some(reflected) => (reflected.kind.as_str(), reflected.required),
                    None if param == "id" || param.ends_with("_id") => ("integer", true),
                    None => ("string", true),
                };
                format!("@Param {} path {} {} \"{}\"", param, kind, required, param)
            })
            .collect()
    }

    /// The full comment block, one `// ` line per directive, newline-terminated.
    pub fn build(&self, handler: &HandlerDescriptor) -> String {
        self.lines(handler)
            .iter()
            .map(|line| format!("// {}\n", line))
            .collect()
    }
}
