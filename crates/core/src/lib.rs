//! Core business logic for goty-rs.

pub mod services;

pub use services::*;

/// Derive a URL slug from a display name.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters collapses into a single `-`.
#[must_use]
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

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Best Narrative"), "best-narrative");
        assert_eq!(slugify("  Baldur's Gate 3!  "), "baldur-s-gate-3");
        assert_eq!(slugify("Ori & the Will of the Wisps"), "ori-the-will-of-the-wisps");
        assert_eq!(slugify("日本語"), "");
    }
}
