use url::Url;

/// What became of one raw link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLink {
    /// An absolute URL ready for the dedup check
    Absolute(String),
    /// A same-page fragment (`#section`), never enqueued
    Fragment,
    /// Could not be joined against the page URL
    Invalid,
}

/// Resolves a raw link against the URL of the page it was found on
///
/// | Raw link | Result |
/// |----------|--------|
/// | `/path` | page origin (scheme, host, port) + path |
/// | `#frag` | [`ResolvedLink::Fragment`] |
/// | `http://...`, `https://...` | unchanged |
/// | anything else | joined against the page URL |
///
/// # Example
///
/// ```
/// use media_crawler::url::{resolve_link, ResolvedLink};
/// use url::Url;
///
/// let page = Url::parse("http://example.com/music/index.htm").unwrap();
/// assert_eq!(
///     resolve_link("track.mp3", &page),
///     ResolvedLink::Absolute("http://example.com/music/track.mp3".to_string())
/// );
/// ```
pub fn resolve_link(raw: &str, page_url: &Url) -> ResolvedLink {
    let raw = raw.trim();

    if raw.starts_with('#') {
        return ResolvedLink::Fragment;
    }

    if is_absolute_http(raw) {
        return ResolvedLink::Absolute(raw.to_string());
    }

    // Root-relative and relative links both resolve through join; a leading
    // slash replaces the whole path of the page URL.
    match page_url.join(raw) {
        Ok(joined) => ResolvedLink::Absolute(joined.to_string()),
        Err(e) => {
            tracing::trace!("Cannot resolve '{}' against {}: {}", raw, page_url, e);
            ResolvedLink::Invalid
        }
    }
}

/// Scheme check only; `http-notes.htm` is a relative link
fn is_absolute_http(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
