use std::fmt;

/// MIME types treated as media
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/x-ms-wma",
    "audio/ogg",
    "audio/aac",
];

/// How a fetched resource is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentClass {
    /// Audio resource: extract metadata
    Media,
    /// Anything else: assume HTML and extract links
    Page,
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Media => write!(f, "media"),
            Self::Page => write!(f, "page"),
        }
    }
}

/// Returns the bare, lowercased MIME type of a Content-Type header value
pub fn mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Classifies a resource by its Content-Type header
///
/// Media iff the MIME type, parameters stripped, is exactly one of
/// [`SUPPORTED_MEDIA_TYPES`]. A missing or unparsable header is a page.
///
/// # Example
///
/// ```
/// use media_crawler::media::{classify, ContentClass};
///
/// assert_eq!(classify(Some("audio/mpeg")), ContentClass::Media);
/// assert_eq!(classify(Some("text/html; charset=utf-8")), ContentClass::Page);
/// assert_eq!(classify(None), ContentClass::Page);
/// ```
pub fn classify(content_type: Option<&str>) -> ContentClass {
    let Some(header) = content_type else {
        return ContentClass::Page;
    };

    let mime = mime_type(header);
    if SUPPORTED_MEDIA_TYPES.contains(&mime.as_str()) {
        ContentClass::Media
    } else {
        ContentClass::Page
    }
}
