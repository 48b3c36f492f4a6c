use thiserror::Error;

use crate::clip::ClipError;

/// A request that never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{0} is not valid json")]
    InvalidJson(String),

    #[error("Must specify command in json request")]
    MissingCommand,

    #[error("{0} is not a recognized command")]
    UnknownCommand(String),

    #[error("PUSH requires a data array")]
    MissingData,

    #[error("malformed clip at index {index}: {source}")]
    MalformedClip {
        index: usize,
        #[source]
        source: ClipError,
    },

    #[error("request must be a single newline-terminated line")]
    Unterminated,

    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request is not valid utf-8 (invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
}
