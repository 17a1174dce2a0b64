/// Convert free text to a URL slug: lowercase ASCII alphanumerics joined by single `-`.
///
/// Non-ASCII letters are transliterated first (`"Café"` -> `"cafe"`), everything else acts
/// as a separator. The result is empty only when the input has no letters or digits at all.
pub fn slugify(text: &str) -> String {
    ::slug::slugify(text)
}

/// Username stem derived from a display name on first sign-in, e.g. `"Ada Lovelace"` -> `"adalovelace"`.
pub fn username_base(name: &str) -> String {
    let base = slugify(name).replace('-', "");
    if base.is_empty() {
        "user".to_owned()
    } else {
        base
    }
}
