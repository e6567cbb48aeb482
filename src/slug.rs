/// Turn free text into a URL-safe slug.
///
/// Lowercases the input, replaces every run of characters outside
/// `[a-z0-9-]` with a single `-`, collapses repeated dashes, and trims
/// dashes from both ends. Text with no ASCII alphanumerics yields `""`.
///
/// ```
/// assert_eq!(inliner_rs::slugify("Hello, World!"), "hello-world");
/// assert_eq!(inliner_rs::slugify("---"), "");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(c);
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
