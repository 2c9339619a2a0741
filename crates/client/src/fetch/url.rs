//! URL validation and domain derivation for scrape records.

/// Error type for URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse an absolute http(s) URL.
///
/// Unlike a browser address bar, a missing scheme is an error: the URL is
/// stored exactly as given, so it must already be absolute.
pub fn parse_absolute(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    Ok(parsed)
}

/// Domain of a URL: its lowercased host with a leading `www.` removed.
pub fn domain_of(input: &str) -> Result<String, UrlError> {
    let parsed = parse_absolute(input)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(input.to_string()))?
        .to_lowercase();

    Ok(match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    })
}
