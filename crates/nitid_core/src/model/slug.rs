//! Title slugs for note file names.

/// Slug used when a title has no ASCII alphanumeric characters.
pub const UNTITLED_SLUG: &str = "untitled";

/// Normalizes a title into a filesystem-safe token.
///
/// Lowercases, keeps `[a-z0-9]`, collapses every other run of characters
/// into a single `-`, and trims `-` from both ends. Inputs without any
/// ASCII alphanumeric character yield [`UNTITLED_SLUG`].
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        slug
    }
}
