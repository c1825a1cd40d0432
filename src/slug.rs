use crate::error::{AppError, Result};

/// Turn `s` into a URL-safe slug: lowercase ASCII alphanumerics, with every
/// other run of characters collapsed into a single `-`.
///
/// Empty input and input that leaves nothing after stripping are reported as
/// distinct errors so callers can tell a missing title from an unusable one.
pub fn slugify(s: &str) -> Result<String> {
    if s.is_empty() {
        return Err(AppError::EmptySlugInput);
    }

    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        return Err(AppError::UnusableSlugInput);
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_phrases() {
        assert_eq!(slugify("Hello, World!").unwrap(), "hello-world");
        assert_eq!(slugify("now is the time").unwrap(), "now-is-the-time");
    }

    #[test]
    fn collapses_runs_and_trims_edges() {
        assert_eq!(slugify("  --Dogs && Cats--  ").unwrap(), "dogs-cats");
        assert_eq!(slugify("a...b").unwrap(), "a-b");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Top 10 uploads of 2026").unwrap(), "top-10-uploads-of-2026");
    }

    #[test]
    fn empty_input() {
        assert!(matches!(slugify(""), Err(AppError::EmptySlugInput)));
    }

    #[test]
    fn input_with_no_usable_characters() {
        assert!(matches!(
            slugify("!!! ??? &&&"),
            Err(AppError::UnusableSlugInput)
        ));
    }
}
