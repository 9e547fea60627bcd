//! Error types for the codec crate.

/// Errors that can occur while decoding a document.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input is not well-formed XML.
    #[error("malformed document at byte {position}: {message}")]
    Parse { position: usize, message: String },

    /// The input has no root element.
    #[error("document has no root element")]
    MissingRoot,

    /// The input is not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Convenience alias for codec results.
pub type CodecResult<T> = Result<T, CodecError>;
