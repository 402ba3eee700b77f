use url::Url;

/// What a decoded payload looks like, which decides the actions offered for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Absolute http or https URL
    Url,
    PlainText,
}

pub fn classify(text: &str) -> ResultKind {
    match Url::parse(text) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => ResultKind::Url,
        _ => ResultKind::PlainText,
    }
}
