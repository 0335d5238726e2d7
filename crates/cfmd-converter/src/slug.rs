//! Slug generation for anchors and file names.

/// Generate a GitHub-style slug from text.
///
/// Lowercases, turns whitespace, `-` and `_` into hyphens, drops other
/// punctuation and collapses consecutive/leading/trailing hyphens. Non-ASCII
/// letters and digits are kept.
///
/// # Examples
///
/// ```
/// use cfmd_converter::slugify;
///
/// assert_eq!(slugify("Release Notes 2.0"), "release-notes-20");
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .flat_map(|c| {
            let mapped: Vec<char> = if c.is_alphanumeric() {
                c.to_lowercase().collect()
            } else if c.is_whitespace() || c == '-' || c == '_' {
                vec!['-']
            } else {
                Vec::new()
            };
            mapped
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
