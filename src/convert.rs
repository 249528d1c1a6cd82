//! Extension-based format dispatch.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::MindMap;

/// The file formats this crate can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xmind,
    Csv,
    Markdown,
    Html,
    Json,
}

impl Format {
    /// Select a format from a path's extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] for a missing or unregistered extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Format> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .ok_or_else(|| {
                Error::Format(format!("no file extension: {}", path.display()))
            })?;

        match ext.as_str() {
            "xmind" => Ok(Format::Xmind),
            "csv" => Ok(Format::Csv),
            "md" | "markdown" => Ok(Format::Markdown),
            "html" | "htm" => Ok(Format::Html),
            "json" => Ok(Format::Json),
            other => Err(Error::Format(format!("unsupported extension: .{other}"))),
        }
    }
}

/// Read a mind map from any supported format, selected by extension.
pub fn read_mindmap<P: AsRef<Path>>(path: P) -> Result<MindMap> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Xmind => crate::xmind::read_xmind(path),
        Format::Csv => crate::csv::read_csv(path),
        Format::Markdown => crate::markdown::read_markdown(path),
        Format::Html => crate::html::read_html(path),
        Format::Json => crate::json::read_json(path),
    }
}

/// Write a mind map to any supported format, selected by extension.
pub fn write_mindmap<P: AsRef<Path>>(map: &MindMap, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Xmind => crate::xmind::write_xmind(map, path),
        Format::Csv => crate::csv::write_csv(map, path),
        Format::Markdown => crate::markdown::write_markdown(map, path),
        Format::Html => crate::html::write_html(map, path),
        Format::Json => crate::json::write_json(map, path),
    }
}
