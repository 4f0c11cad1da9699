//! Errors that can occur while reading or writing
//! MetaImage header and raw data files.

use std::path::PathBuf;

use thiserror::Error;

use crate::header::{Tag, TagKind};

/// Every failure in this crate is fatal to the operation
/// that raised it. Nothing is retried or downgraded.
#[derive(Debug, Error)]
pub enum MetaImageError {
    /// Missing, unreadable, unwritable or truncated files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A non-blank header line without a `=` delimiter.
    #[error("Malformed header line {line_number}: {line:?} (expected `Key = Value`)")]
    MalformedLine { line_number: usize, line: String },

    /// A recognized tag whose value could not be parsed as its kind.
    #[error("Invalid value {value:?} for tag {tag}")]
    InvalidValue { tag: Tag, value: String },

    /// A typed value of the wrong kind was put into a header.
    #[error("Tag {tag} expects {expected} values")]
    WrongValueKind { tag: Tag, expected: TagKind },

    #[error("Missing required tag {0}")]
    MissingTag(Tag),

    #[error("ElementType {0} not understood")]
    UnsupportedElementType(String),

    #[error("Compressed data is not supported")]
    CompressedData,

    #[error("ElementNumberOfChannels is {declared}, but the trailing axis has size {found}")]
    ChannelMismatch { declared: usize, found: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Header files must have the `.mhd` extension: {0:?}")]
    WrongExtension(PathBuf),

    /// Decoding failures that are not plain I/O.
    #[error("Format error: {0}")]
    Format(String),
}

impl From<binrw::Error> for MetaImageError {
    fn from(err : binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io_err) => MetaImageError::Io(io_err),
            other => MetaImageError::Format(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MetaImageError>;
