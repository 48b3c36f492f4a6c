//! Clip value type.
//!
//! A [`Clip`] is one clipboard item: the time it was copied and its text.

mod timestamp;

pub use timestamp::Timestamp;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Wire field holding the timestamp.
pub const FIELD_TIMESTAMP: &str = "dt";
/// Wire field holding the text payload.
pub const FIELD_CONTENTS: &str = "contents";

/// A single clipboard item.
///
/// 剪贴板条目：时间戳 + 文本内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    #[serde(rename = "dt")]
    timestamp: Timestamp,
    contents: String,
}

impl Clip {
    pub fn new(timestamp_secs: u64, contents: impl Into<String>) -> Self {
        Self {
            timestamp: Timestamp::from_epoch_secs(timestamp_secs),
            contents: contents.into(),
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn into_contents(self) -> String {
        self.contents
    }

    /// Byte length of the contents encoded as UTF-8.
    pub fn size(&self) -> usize {
        self.contents.len()
    }

    /// Whether this clip was taken strictly after `other`.
    pub fn is_newer_than(&self, other: Timestamp) -> bool {
        self.timestamp > other
    }
}

/// A clip record that does not have the `{"dt": <int>, "contents": <string>}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipError {
    #[error("expected an object, got {0}")]
    NotAnObject(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("`dt` must be a non-negative integer, got {0}")]
    InvalidTimestamp(String),

    #[error("`contents` must be a string, got {0}")]
    InvalidContents(String),
}

impl TryFrom<&Value> for Clip {
    type Error = ClipError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let record = value
            .as_object()
            .ok_or_else(|| ClipError::NotAnObject(value.to_string()))?;

        let dt = record
            .get(FIELD_TIMESTAMP)
            .ok_or(ClipError::MissingField(FIELD_TIMESTAMP))?;
        let timestamp = dt
            .as_u64()
            .ok_or_else(|| ClipError::InvalidTimestamp(dt.to_string()))?;

        let contents = record
            .get(FIELD_CONTENTS)
            .ok_or(ClipError::MissingField(FIELD_CONTENTS))?;
        let contents = contents
            .as_str()
            .ok_or_else(|| ClipError::InvalidContents(contents.to_string()))?;

        Ok(Clip::new(timestamp, contents))
    }
}
