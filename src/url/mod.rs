//! URL handling module
//!
//! Turns the raw `href` values found on a page into absolute URLs that can be
//! enqueued. Beyond joining against the page URL no canonicalization is done;
//! two spellings of the same resource are two different URLs.

mod resolve;

pub use resolve::{resolve_link, ResolvedLink};
