/// Maximum number of body characters carried into an auto-generated excerpt.
pub const EXCERPT_CHARS: usize = 150;

/// Derive the URL slug for a post title.
///
/// The title is lower-cased, every run of characters outside `[a-z0-9]` becomes
/// a single `-`, and hyphens at either end are dropped. Titles made entirely of
/// punctuation produce an empty slug, which callers must reject.
pub fn derive_slug(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Derive a preview from the first [`EXCERPT_CHARS`] characters of a body.
///
/// Counts characters, not bytes, and does not look for word boundaries.
pub fn derive_excerpt(body: &str) -> String {
    let head: String = body.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_slug_shape(slug: &str) {
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!slug.starts_with('-'), "leading hyphen in {slug:?}");
        assert!(!slug.ends_with('-'), "trailing hyphen in {slug:?}");
        assert!(!slug.contains("--"), "double hyphen in {slug:?}");
    }

    #[test]
    fn test_slug_basic() {
        assert_eq!(derive_slug("Hello World!"), "hello-world");
        assert_eq!(derive_slug("Building Modern Web Applications"), "building-modern-web-applications");
    }

    #[test]
    fn test_slug_collapses_runs() {
        assert_eq!(derive_slug("Rust  &&  Go -- 2024"), "rust-go-2024");
        assert_eq!(derive_slug("a_b.c/d"), "a-b-c-d");
    }

    #[test]
    fn test_slug_strips_edges() {
        assert_eq!(derive_slug("  --Leading and trailing!!  "), "leading-and-trailing");
        assert_eq!(derive_slug("?why"), "why");
    }

    #[test]
    fn test_slug_non_ascii_is_separator() {
        assert_eq!(derive_slug("Café Olé"), "caf-ol");
        assert_eq!(derive_slug("日本語"), "");
    }

    #[test]
    fn test_slug_only_punctuation_is_empty() {
        assert_eq!(derive_slug("!!!"), "");
        assert_eq!(derive_slug(""), "");
    }

    #[test]
    fn test_slug_shape_holds_for_assorted_titles() {
        let titles = [
            "Hello World!",
            "  spaces  ",
            "UPPER lower 123",
            "émoji 🚀 launch",
            "---",
            "x",
            "The Power of Minimalist Design",
            "tabs\tand\nnewlines",
        ];
        for title in titles {
            assert_slug_shape(&derive_slug(title));
        }
    }

    #[test]
    fn test_distinct_titles_can_share_a_slug() {
        assert_eq!(derive_slug("Hello, World"), derive_slug("hello world!"));
    }

    #[test]
    fn test_excerpt_long_body() {
        let body = "x".repeat(200);
        let excerpt = derive_excerpt(&body);
        assert_eq!(excerpt.chars().count(), 153);
        assert!(excerpt.ends_with("..."));
        assert_eq!(&excerpt[..150], &body[..150]);
    }

    #[test]
    fn test_excerpt_short_body() {
        assert_eq!(derive_excerpt("Short post."), "Short post....");
    }

    #[test]
    fn test_excerpt_trims_whitespace() {
        let body = format!("  {}   ", "word ".repeat(10));
        assert_eq!(derive_excerpt(&body), format!("{}...", "word ".repeat(10).trim()));
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let body = "é".repeat(160);
        let excerpt = derive_excerpt(&body);
        assert_eq!(excerpt.chars().count(), 153);
        assert!(excerpt.starts_with(&"é".repeat(150)));
    }
}
