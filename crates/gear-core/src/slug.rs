//! URL slugs for courses and blog posts.

use unicode_normalization::UnicodeNormalization;

/// Longest slug stored for a course.
pub const COURSE_SLUG_MAX: usize = 180;

/// Length a course name's slug is cut to before any `-N` suffix.
pub const COURSE_SLUG_BASE_MAX: usize = 170;

/// Lowercase ASCII slug in the Django manner.
///
/// Accented letters are decomposed (NFKD) and lose their marks, other
/// non-ASCII characters are dropped, punctuation is removed, and runs of
/// whitespace or hyphens become one `-`. Underscores are kept, except at the
/// ends where `-` and `_` are trimmed.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.nfkd().filter(char::is_ascii) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else if ch == '-' || ch.is_ascii_whitespace() {
            pending_dash = true;
        }
    }
    out.trim_matches(|c: char| c == '-' || c == '_').to_string()
}

/// Append `-{n}` to `base`, trimming `base` so the result fits in `max_len`.
#[must_use]
pub fn with_suffix(base: &str, n: u32, max_len: usize) -> String {
    let suffix = format!("-{n}");
    let keep = max_len.saturating_sub(suffix.len()).min(base.len());
    let trimmed = base[..keep].trim_end_matches('-');
    format!("{trimmed}{suffix}")
}

/// Base slug for a course name, or `None` when the name has no usable characters.
#[must_use]
pub fn course_base_slug(name: &str) -> Option<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return None;
    }
    let cut = slug.len().min(COURSE_SLUG_BASE_MAX);
    Some(slug[..cut].trim_end_matches('-').to_string())
}

/// Base slug for a blog post title, falling back to `"blog"`.
#[must_use]
pub fn blog_base_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "blog".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("  Beginner Driver Ed (BDE)!  "), "beginner-driver-ed-bde");
        assert_eq!(slugify("G2 / G Road-Test Prep"), "g2-g-road-test-prep");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn slugify_folds_accents_and_keeps_underscores() {
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("night_driving 101"), "night_driving-101");
        assert_eq!(slugify("Mr. Smith's Q&A"), "mr-smiths-qa");
        assert_eq!(slugify("_edge case_-"), "edge-case");
        assert_eq!(slugify("驾驶 lessons"), "lessons");
    }

    #[test]
    fn suffix_keeps_within_limit() {
        let base = "a".repeat(COURSE_SLUG_MAX);
        let slug = with_suffix(&base, 12, COURSE_SLUG_MAX);
        assert_eq!(slug.len(), COURSE_SLUG_MAX);
        assert!(slug.ends_with("-12"));
        assert_eq!(with_suffix("defensive", 2, COURSE_SLUG_MAX), "defensive-2");
    }

    #[test]
    fn course_base_is_truncated() {
        let long = "word ".repeat(60);
        let slug = course_base_slug(&long).unwrap();
        assert!(slug.len() <= COURSE_SLUG_BASE_MAX);
        assert!(!slug.ends_with('-'));
        assert_eq!(course_base_slug("!!!"), None);
    }

    #[test]
    fn blog_falls_back_to_blog() {
        assert_eq!(blog_base_slug("???"), "blog");
        assert_eq!(blog_base_slug("Winter Driving Tips"), "winter-driving-tips");
    }
}
