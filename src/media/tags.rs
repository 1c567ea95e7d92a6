//! Metadata parser collaborator
//!
//! The crawler never inspects audio containers itself. A [`MetadataParser`]
//! turns raw bytes into a stream length and a map of text tags; the default
//! implementation is backed by `lofty`.

use crate::MetadataParseError;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::collections::HashMap;
use std::io::Cursor;

/// Raw result of parsing a media resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTags {
    /// Stream length reported by the container, if known
    pub stream_length_seconds: Option<f64>,

    /// Text tags by name; a tag may carry several values
    pub tags: HashMap<String, Vec<String>>,
}

impl ParsedTags {
    /// Returns the values of a tag, matched by exact name
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.tags.get(name).map(Vec::as_slice)
    }
}

/// Parses media bytes into tags
pub trait MetadataParser {
    fn parse_tags(&self, bytes: &[u8]) -> Result<ParsedTags, MetadataParseError>;
}

impl<P: MetadataParser + ?Sized> MetadataParser for &P {
    fn parse_tags(&self, bytes: &[u8]) -> Result<ParsedTags, MetadataParseError> {
        (**self).parse_tags(bytes)
    }
}

/// [`MetadataParser`] backed by `lofty`
///
/// The format is guessed from the bytes themselves, not from the declared
/// Content-Type. Well-known keys are reported as `artist`, `title` and
/// `album`; keys lofty has no mapping for keep their native name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyParser;

impl MetadataParser for LoftyParser {
    fn parse_tags(&self, bytes: &[u8]) -> Result<ParsedTags, MetadataParseError> {
        let probe = Probe::new(Cursor::new(bytes))
            .guess_file_type()
            .map_err(|e| MetadataParseError::Corrupt(e.to_string()))?;

        if probe.file_type().is_none() {
            return Err(MetadataParseError::UnsupportedFormat);
        }

        let tagged_file = probe
            .read()
            .map_err(|e| MetadataParseError::Corrupt(e.to_string()))?;

        let duration = tagged_file.properties().duration();
        let stream_length_seconds = if duration.is_zero() {
            None
        } else {
            Some(duration.as_secs_f64())
        };

        let mut tags: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        {
            for item in tag.items() {
                let (Some(name), Some(text)) = (tag_name(item.key()), item.value().text()) else {
                    continue;
                };
                tags.entry(name).or_default().push(text.to_string());
            }
        }

        Ok(ParsedTags {
            stream_length_seconds,
            tags,
        })
    }
}

fn tag_name(key: &ItemKey) -> Option<String> {
    match key {
        ItemKey::TrackArtist => Some("artist".to_string()),
        ItemKey::TrackTitle => Some("title".to_string()),
        ItemKey::AlbumTitle => Some("album".to_string()),
        ItemKey::Unknown(native) => Some(native.clone()),
        _ => None,
    }
}
