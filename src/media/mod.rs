//! Media handling: content classification and metadata extraction
//!
//! A fetched resource is either media, judged only by its declared
//! Content-Type, or a page to mine for links. Media bytes go through a
//! [`MetadataParser`] and the raw tags are shaped into an [`OutputRecord`].

mod classify;
mod extract;
mod tags;

pub use classify::{classify, mime_type, ContentClass, SUPPORTED_MEDIA_TYPES};
pub use extract::{extract_record, record_from_tags, OutputRecord};
pub use tags::{LoftyParser, MetadataParser, ParsedTags};
