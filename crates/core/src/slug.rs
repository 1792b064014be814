//! URL slug generation for board titles.

/// Fallback slug used when a title contains no usable characters.
pub const DEFAULT_SLUG: &str = "board";

/// Maximum slug length, in characters.
pub const MAX_SLUG_LENGTH: usize = 80;

/// Derive a URL-safe slug from a board title.
///
/// Lowercases ASCII, collapses every run of non-alphanumeric characters
/// into a single `-`, trims leading/trailing dashes, and truncates to
/// [`MAX_SLUG_LENGTH`]. An empty result falls back to [`DEFAULT_SLUG`].
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = true; // suppress a leading dash

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
        if slug.len() >= MAX_SLUG_LENGTH {
            break;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_title() {
        assert_eq!(slugify("Sprint Planning"), "sprint-planning");
    }

    #[test]
    fn punctuation_collapses() {
        assert_eq!(slugify("Q3 -- Roadmap (draft)"), "q3-roadmap-draft");
    }

    #[test]
    fn non_ascii_only_falls_back() {
        assert_eq!(slugify("日本語"), DEFAULT_SLUG);
    }

    #[test]
    fn empty_falls_back() {
        assert_eq!(slugify(""), DEFAULT_SLUG);
    }

    #[test]
    fn long_title_truncated() {
        let slug = slugify(&"a".repeat(500));
        assert_eq!(slug.len(), MAX_SLUG_LENGTH);
    }

    #[test]
    fn no_leading_or_trailing_dash() {
        let slug = slugify("  hello world!  ");
        assert_eq!(slug, "hello-world");
    }
}
