//! Endpoint fingerprint normalization (spec §4.5): two HTTP route
//! declarations or call sites mean the same endpoint once their method and
//! path are reduced to the same canonical string, regardless of the
//! placeholder syntax the source language/framework uses (`:id`, `{id}`,
//! `<id>`) or incidental differences in slashes.

use regex::Regex;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(:[A-Za-z_][A-Za-z0-9_]*)|(\{[A-Za-z_][A-Za-z0-9_]*\})|(<[A-Za-z_][A-Za-z0-9_]*>)").unwrap())
}

fn collapse_slashes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/+").unwrap())
}

/// Produces the canonical `METHOD path` fingerprint used to match an
/// endpoint declaration (server route) against an endpoint call site
/// (client fetch/axios/`$.ajax` call).
pub fn fingerprint(method: &str, path: &str) -> String {
    let method = method.trim().to_ascii_uppercase();
    let method = if method.is_empty() { "GET".to_string() } else { method };

    let path = placeholder_pattern().replace_all(path, "{}");
    let path = collapse_slashes().replace_all(&path, "/");
    let path = path.trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };
    let path = if let Some(stripped) = path.strip_prefix('/') {
        format!("/{stripped}")
    } else {
        format!("/{path}")
    };

    format!("{method} {path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_placeholder_syntaxes_to_the_same_fingerprint() {
        assert_eq!(fingerprint("get", "/users/:id"), fingerprint("GET", "/users/{id}"));
        assert_eq!(fingerprint("GET", "/users/{id}"), fingerprint("GET", "/users/<id>"));
    }

    #[test]
    fn collapses_duplicate_slashes_and_trailing_slash() {
        assert_eq!(fingerprint("post", "//users//"), "POST /users");
    }

    #[test]
    fn defaults_missing_method_to_get() {
        assert_eq!(fingerprint("", "/health"), "GET /health");
    }
}
