//! Page parsing: body decoding and link extraction
//!
//! Links are found with a single pattern over the page text rather than a
//! DOM. Only `href` attributes of `<a>` tags are discovered; `<link>`,
//! `<script>` and script-built links are invisible to the crawler.

use crate::DecodeError;
use encoding_rs::Encoding;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Matches `<a ... href="..." ...>` across newlines, any case, any attribute order
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s(?:[^>]*?\s)?href\s*=\s*["']([^"']*)["'][^>]*>"#)
        .expect("anchor pattern is valid")
});

/// Extracts the raw `href` value of every anchor tag in `html`
///
/// The returned iterator is lazy and borrows from `html`; each call scans the
/// text again from the start. Values are returned verbatim, unresolved.
///
/// # Example
///
/// ```
/// use media_crawler::crawler::extract_links;
///
/// let html = r#"<p><A class="x"
///     HREF="song.mp3">Song</A> <a href='/next.htm'>next</a></p>"#;
/// let links: Vec<&str> = extract_links(html).collect();
/// assert_eq!(links, vec!["song.mp3", "/next.htm"]);
/// ```
pub fn extract_links(html: &str) -> impl Iterator<Item = &str> + '_ {
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reads the `charset=` parameter out of a Content-Type header value
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    let lower = content_type.to_ascii_lowercase();
    let start = lower.rfind("charset=")? + "charset=".len();
    let value = content_type[start..]
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Decodes a page body to text
///
/// With a declared charset the body is decoded strictly in that encoding.
/// Without one the bytes are read as UTF-8, replacing invalid sequences.
///
/// # Errors
///
/// * [`DecodeError::UnknownCharset`] - the label names no known encoding
/// * [`DecodeError::Malformed`] - the body is not valid in the declared encoding
pub fn decode_body<'a>(
    body: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, DecodeError> {
    let Some(label) = content_type.and_then(charset_from_content_type) else {
        return Ok(String::from_utf8_lossy(body));
    };

    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| DecodeError::UnknownCharset(label.to_string()))?;

    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        return Err(DecodeError::Malformed(encoding.name().to_string()));
    }

    Ok(text)
}
