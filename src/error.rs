//! Error types for mind map conversion.

use thiserror::Error;

/// Errors that can occur while reading, converting, or writing mind maps.
#[derive(Error, Debug)]
pub enum Error {
    /// Input path does not exist.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Recognizable but wrong container, or an unsupported file extension.
    #[error("invalid format: {0}")]
    Format(String),

    /// Container or payload recognized but internally malformed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Failure while producing output.
    #[error("conversion error: {0}")]
    Converter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Normalize into the parse category, preserving the cause's message.
    ///
    /// Readers call this at their public boundary so callers never see raw
    /// I/O or library error types. `NotFound` and `Format` pass through
    /// untouched since they carry entry-validation meaning of their own.
    pub(crate) fn into_parse(self) -> Error {
        match self {
            Error::NotFound(_) | Error::Format(_) | Error::Parse(_) => self,
            other => Error::Parse(other.to_string()),
        }
    }

    /// Normalize into the converter category; the writer-side counterpart of
    /// [`Error::into_parse`].
    pub(crate) fn into_converter(self) -> Error {
        match self {
            Error::Converter(_) => self,
            other => Error::Converter(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_normalize_to_parse() {
        let io = Error::Io(std::io::Error::other("disk on fire"));
        match io.into_parse() {
            Error::Parse(msg) => assert!(msg.contains("disk on fire")),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn entry_validation_errors_pass_through() {
        let not_found = Error::NotFound("a.xmind".into());
        assert!(matches!(not_found.into_parse(), Error::NotFound(_)));

        let format = Error::Format("not a zip".into());
        assert!(matches!(format.into_parse(), Error::Format(_)));
    }

    #[test]
    fn writer_errors_normalize_to_converter() {
        let zip = Error::Zip(zip::result::ZipError::FileNotFound);
        assert!(matches!(zip.into_converter(), Error::Converter(_)));
    }
}
