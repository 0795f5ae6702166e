// src/utils/slug.rs

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static NON_SLUG: OnceLock<Regex> = OnceLock::new();
static DASH_RUN: OnceLock<Regex> = OnceLock::new();

/// Derives a URL slug from a title: whitespace becomes '-', everything that
/// is not an ASCII word character is dropped, the rest is lowercased and
/// runs of dashes are collapsed.
///
/// Uniqueness is *not* handled here; callers probe the database and append
/// `-1`, `-2`, ... until the slug is free.
pub fn slugify(input: &str) -> String {
    let ws = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    let non_slug = NON_SLUG.get_or_init(|| Regex::new(r"[^A-Za-z0-9-]").unwrap());
    let dash_run = DASH_RUN.get_or_init(|| Regex::new(r"-{2,}").unwrap());

    let dashed = ws.replace_all(input.trim(), "-");
    let stripped = non_slug.replace_all(&dashed, "");
    let collapsed = dash_run.replace_all(&stripped, "-");

    collapsed.trim_matches('-').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_title() {
        assert_eq!(slugify("Trail Running Shoes"), "trail-running-shoes");
    }

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slugify("50% Off! Summer Sale"), "50-off-summer-sale");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(slugify("  GPS   Watch  "), "gps-watch");
    }

    #[test]
    fn non_ascii_is_stripped() {
        assert_eq!(slugify("Café Édition 2"), "caf-dition-2");
    }

    #[test]
    fn empty_input() {
        assert_eq!(slugify("   "), "");
    }
}
