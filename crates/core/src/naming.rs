//! Project slug generation and validation.
//!
//! Slugs are lowercase ASCII alphanumerics separated by single hyphens and
//! identify a project in URLs and CLI configuration.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

/// Derive a slug from a display name.
///
/// Runs of non-alphanumeric characters collapse into a single `-` and the
/// result is truncated to [`MAX_SLUG_LEN`].
///
/// # Examples
///
/// ```
/// use driftwatch_core::naming::slugify;
///
/// assert_eq!(slugify("My Project"), "my-project");
/// assert_eq!(slugify("  serde_json / bench  "), "serde-json-bench");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Validate a user-supplied slug.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "slug must be between 1 and {MAX_SLUG_LEN} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "slug '{slug}' must be lowercase letters and digits separated by single hyphens"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("--a--b--"), "a-b");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café bench"), "caf-bench");
    }

    #[test]
    fn slugify_truncates_without_trailing_dash() {
        let name = format!("{} tail", "a".repeat(MAX_SLUG_LEN - 1));
        let slug = slugify(&name);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slugify_output_validates() {
        for name in ["My Project", "x", "Rust 2024 / Bench"] {
            assert!(validate_slug(&slugify(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn validate_slug_rejects_bad_input() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Upper").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LEN + 1)).is_err());
    }
}
