//! XMind archive format support.
//!
//! An XMind file is a zip container whose main payload describes a tree of
//! topics, free-floating topics, and cross-tree relations. Two historical
//! schema variants exist: the current JSON document (`content.json`) and the
//! legacy XML document (`content.xml`). The reader accepts both and
//! normalizes them into one [`crate::MindMap`]; the writer always produces
//! the current variant.

mod reader;
mod writer;

pub use reader::read_xmind;
pub use writer::write_xmind;

/// Fixed archive entry names.
pub(crate) const CONTENT_ENTRY: &str = "content.json";
pub(crate) const LEGACY_CONTENT_ENTRY: &str = "content.xml";
pub(crate) const METADATA_ENTRY: &str = "metadata.json";
pub(crate) const MANIFEST_ENTRY: &str = "manifest.json";
pub(crate) const THUMBNAIL_ENTRY: &str = "Thumbnails/thumbnail.png";
