//! Name-derived fallbacks for handlers the router does not mention.
//!
//! Handler names are read as camel-case verb phrases: `GetUserById`, `ListOrders`,
//! `DeleteProduct`. Verb prefixes are plain string prefixes, so `AddressBook` counts as an
//! `Add` handler.

use crate::extractor::{HttpMethod, RouteRecord, RouteTable};
use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid camel boundary regex"));

const STRIPPED_PREFIXES: &[&str] = &["get-", "list-", "create-", "update-", "delete-", "handle-"];

const PUBLIC_MARKERS: &[&str] = &["Login", "Register", "Captcha", "Public"];

/// `GetUserById` -> `Get User By Id`
pub fn split_camel(name: &str) -> String {
    CAMEL_BOUNDARY.replace_all(name, "$1 $2").into_owned()
}

/// `GetUserById` -> `get-user-by-id`
pub fn to_kebab(name: &str) -> String {
    CAMEL_BOUNDARY.replace_all(name, "$1-$2").to_lowercase()
}

fn starts_with_any(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| name.starts_with(prefix))
}

pub fn infer_method(name: &str) -> HttpMethod {
    if starts_with_any(name, &["Create", "Add"]) {
        HttpMethod::Post
    } else if starts_with_any(name, &["Update", "Modify"]) {
        HttpMethod::Put
    } else if starts_with_any(name, &["Patch", "Partial"]) {
        HttpMethod::Patch
    } else if starts_with_any(name, &["Delete", "Remove"]) {
        HttpMethod::Delete
    } else {
        HttpMethod::Get
    }
}

pub fn infer_path(name: &str) -> String {
    let kebab = to_kebab(name);
    let resource = STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| kebab.strip_prefix(prefix))
        .unwrap_or(&kebab);

    let single = name.contains("ById")
        || (name.starts_with("Get") && !name.starts_with("List"))
        || name.starts_with("Update")
        || name.starts_with("Delete");

    if single {
        let resource = resource.replacen("-by-id", "", 1);
        format!("/{}/{{id}}", resource)
    } else {
        // a `List` prefix is already gone from `resource`
        format!("/{}", resource)
    }
}

pub fn infer_secured(name: &str) -> bool {
    !PUBLIC_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Route for a handler: the router's registration when there is one, otherwise one
/// synthesized from the name.
pub fn resolve_route(name: &str, routes: &RouteTable) -> RouteRecord {
    if let Some(route) = routes.get(name) {
        return route.clone();
    }
    RouteRecord {
        path: infer_path(name),
        method: infer_method(name),
        handler: name.to_string(),
        secured: infer_secured(name),
    }
}

/// Sentence for `@Description`.
pub fn describe(name: &str) -> String {
    let split = split_camel(name);
    let prefix = if name.starts_with("Create") {
        Some("Creates a new ")
    } else if name.starts_with("Get") && !name.starts_with("List") {
        Some("Retrieves a single ")
    } else if name.starts_with("List") {
        Some("Retrieves a list of ")
    } else if name.starts_with("Update") {
        Some("Updates an existing ")
    } else if name.starts_with("Delete") {
        Some("Deletes an existing ")
    } else {
        None
    };

    match prefix {
        Some(prefix) => {
            let rest: Vec<&str> = split.split_whitespace().skip(1).collect();
            format!("{}{}", prefix, rest.join(" "))
        }
        None => split,
    }
}

/// `UserHandler` -> `user`
pub fn tag_for_receiver(receiver: &str) -> String {
    let tag = receiver
        .strip_suffix("Handler")
        .unwrap_or(receiver)
        .to_lowercase();
    if tag.is_empty() {
        "default".to_string()
    } else {
        tag
    }
}
