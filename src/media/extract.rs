use crate::media::tags::{MetadataParser, ParsedTags};
use crate::MetadataParseError;

/// One row of extracted media metadata
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    /// Stream length in seconds
    pub duration: f64,
    pub source_url: String,
}

/// Parses media bytes and derives an output record from the tags
///
/// # Errors
///
/// Any [`MetadataParseError`] from the parser, or
/// [`MetadataParseError::MissingDuration`] when no stream length is known.
pub fn extract_record<P: MetadataParser + ?Sized>(
    parser: &P,
    bytes: &[u8],
    source_url: &str,
) -> Result<OutputRecord, MetadataParseError> {
    let parsed = parser.parse_tags(bytes)?;
    record_from_tags(&parsed, source_url)
}

/// Applies the field derivation rules to parsed tags
///
/// * artist: values of `artist`, space-joined
/// * title: values of `title`, else of `Title`, space-joined
/// * album: values of `album`, space-joined
/// * duration: the stream length, required
pub fn record_from_tags(
    parsed: &ParsedTags,
    source_url: &str,
) -> Result<OutputRecord, MetadataParseError> {
    let duration = parsed
        .stream_length_seconds
        .ok_or(MetadataParseError::MissingDuration)?;

    Ok(OutputRecord {
        artist: joined(parsed, "artist"),
        title: joined(parsed, "title").or_else(|| joined(parsed, "Title")),
        album: joined(parsed, "album"),
        duration,
        source_url: source_url.to_string(),
    })
}

fn joined(parsed: &ParsedTags, name: &str) -> Option<String> {
    parsed.values(name).map(|values| {
        values
            .iter()
            .map(|v| v.trim_end_matches('\0'))
            .collect::<Vec<_>>()
            .join(" ")
    })
}
