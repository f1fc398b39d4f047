/// Classification of a single resource token inside a collection declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceToken<'a> {
    /// `@name`: a reference to another registered asset. Holds the token as written.
    Reference(&'a str),
    /// A pattern containing `*`, expanded at compile time.
    Glob(&'a str),
    /// A plain file path.
    File(&'a str),
}

/// Classify a collection token.
///
/// A leading `@` wins over everything else, so `@icons*` is still a reference.
pub fn classify_resource(token: &str) -> ResourceToken<'_> {
    if token.starts_with('@') {
        ResourceToken::Reference(token)
    } else if token.contains('*') {
        ResourceToken::Glob(token)
    } else {
        ResourceToken::File(token)
    }
}
