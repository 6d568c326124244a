//! Tool naming: sanitizing operation ids, synthesizing names from
//! method + path, and keeping names unique across one extraction run.

use crate::types::HttpMethod;
use std::collections::HashSet;

/// Fallback when a name sanitizes down to nothing.
const EMPTY_NAME: &str = "operation";

/// Shortest length cap honored; smaller caps are raised to this.
pub const MIN_NAME_LENGTH: usize = 8;

/// Convert an arbitrary identifier to lower snake_case using only
/// `[a-z0-9_]`.
///
/// Word boundaries are non-alphanumeric characters, lower-to-upper
/// transitions (`getUser`) and the end of an acronym (`HTTPResponse`).
/// A leading digit gets an `op_` prefix so the result stays a valid
/// identifier.
pub fn sanitize_name(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            push_separator(&mut out);
            continue;
        }

        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                push_separator(&mut out);
            }
        }

        out.push(c.to_ascii_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "op_");
    }

    out
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with('_') {
        out.push('_');
    }
}

/// Build a name from method and path: `GET /users/{id}` becomes
/// `get_users_id`. Placeholder braces are dropped but their names kept.
pub fn synthesize_name(method: HttpMethod, path: &str) -> String {
    let path = sanitize_name(path);
    if path.is_empty() {
        format!("{}_root", method.as_str())
    } else {
        format!("{}_{}", method.as_str(), path)
    }
}

/// The preferred name for an operation: its sanitized `operationId` when it
/// has a usable one, the synthesized method + path name otherwise.
pub fn base_name(operation_id: Option<&str>, method: HttpMethod, path: &str) -> String {
    operation_id
        .map(sanitize_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| synthesize_name(method, path))
}

/// Hands out names that are unique within one run.
///
/// The first claimant of a name keeps it; later ones get `_2`, `_3`, ...
/// in traversal order. With a length limit, the stem is shortened so the
/// suffixed name still fits.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    used: HashSet<String>,
    max_len: Option<usize>,
}

impl NameRegistry {
    /// A cap of 0 means no limit.
    pub(crate) fn new(max_len: Option<usize>) -> Self {
        Self {
            used: HashSet::new(),
            max_len: max_len
                .filter(|&len| len > 0)
                .map(|len| len.max(MIN_NAME_LENGTH)),
        }
    }

    /// Claim `base` (or the first free disambiguated form of it).
    pub(crate) fn assign(&mut self, base: &str) -> String {
        let base = self.fit(base, 0);
        let base = if base.is_empty() { EMPTY_NAME.to_string() } else { base };

        if self.used.insert(base.clone()) {
            return base;
        }

        let mut n = 2usize;
        loop {
            let suffix = format!("_{n}");
            let candidate = format!("{}{}", self.fit(&base, suffix.len()), suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Truncate `name` so that `reserve` more characters still fit.
    fn fit(&self, name: &str, reserve: usize) -> String {
        let Some(max_len) = self.max_len else {
            return name.to_string();
        };
        let limit = max_len.saturating_sub(reserve);
        if name.len() <= limit {
            return name.to_string();
        }
        // sanitized names are ASCII, so byte slicing is safe
        name[..limit].trim_end_matches('_').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("getUserById"), "get_user_by_id");
        assert_eq!(sanitize_name("HTTPResponse"), "http_response");
        assert_eq!(sanitize_name("already_snake"), "already_snake");
        assert_eq!(sanitize_name("kebab-case"), "kebab_case");
        assert_eq!(sanitize_name("listUsers"), "list_users");
        assert_eq!(sanitize_name("users.list v2"), "users_list_v2");
        assert_eq!(sanitize_name("__weird__--name__"), "weird_name");
        assert_eq!(sanitize_name("v2Users"), "v2_users");
        assert_eq!(sanitize_name("2fa-verify"), "op_2fa_verify");
        assert_eq!(sanitize_name("café"), "caf");
        assert_eq!(sanitize_name("{}"), "");
    }

    #[test]
    fn test_synthesize_name() {
        assert_eq!(synthesize_name(HttpMethod::Get, "/users/{id}"), "get_users_id");
        assert_eq!(
            synthesize_name(HttpMethod::Post, "/orgs/{orgId}/members"),
            "post_orgs_org_id_members"
        );
        assert_eq!(synthesize_name(HttpMethod::Delete, "/"), "delete_root");
    }

    #[test]
    fn test_base_name_prefers_operation_id() {
        assert_eq!(base_name(Some("listPets"), HttpMethod::Get, "/pets"), "list_pets");
        assert_eq!(base_name(None, HttpMethod::Get, "/pets"), "get_pets");
        assert_eq!(base_name(Some("--"), HttpMethod::Get, "/pets"), "get_pets");
    }

    #[test]
    fn test_registry_disambiguates_in_order() {
        let mut names = NameRegistry::new(None);
        assert_eq!(names.assign("get_item"), "get_item");
        assert_eq!(names.assign("get_item"), "get_item_2");
        assert_eq!(names.assign("get_item"), "get_item_3");
        // a later explicit id equal to a generated suffix is itself renamed
        assert_eq!(names.assign("get_item_2"), "get_item_2_2");
    }

    #[test]
    fn test_registry_respects_length_limit() {
        let mut names = NameRegistry::new(Some(10));
        assert_eq!(names.assign("abcdefghijklmnop"), "abcdefghij");
        let second = names.assign("abcdefghijklmnop");
        assert_eq!(second, "abcdefgh_2");
        assert!(second.len() <= 10);
    }

    #[test]
    fn test_registry_zero_cap_is_unlimited() {
        let mut names = NameRegistry::new(Some(0));
        assert_eq!(names.assign("create_user"), "create_user");
        assert_eq!(names.assign("create_user"), "create_user_2");
    }

    #[test]
    fn test_registry_raises_tiny_caps() {
        let mut names = NameRegistry::new(Some(3));
        assert_eq!(names.assign("list_users"), "list_use");
        assert_eq!(names.assign("list_users"), "list_u_2");
        assert_eq!(names.assign("list_users"), "list_u_3");
    }

    #[test]
    fn test_registry_never_returns_empty() {
        let mut names = NameRegistry::new(None);
        assert_eq!(names.assign(""), "operation");
        assert_eq!(names.assign(""), "operation_2");
    }
}
