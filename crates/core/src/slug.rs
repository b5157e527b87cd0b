//! Slug normalization for split-test lookups.

/// Collapses a raw path segment into the URL-safe token format test slugs
/// are stored in: lowercase alphanumerics, dashes and underscores, with
/// runs of anything else folded into a single dash.
pub fn normalize_slug(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
