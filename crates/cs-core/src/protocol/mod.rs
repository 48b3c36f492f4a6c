//! Line-delimited JSON protocol spoken between clients and the history server.
//!
//! One connection carries exactly one exchange:
//!
//! ```text
//! -> {"cmd": "PUSH", "data": [{"dt": 1523769986, "contents": "hello"}]}
//! <- {"dt": 1523769986, "contents": "hello"}
//! ```
//!
//! Failures are answered with `{"err": "<message>"}`.

mod error;

pub use error::ProtocolError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clip::Clip;

/// Wire field naming the command.
pub const FIELD_COMMAND: &str = "cmd";
/// Wire field carrying the PUSH payload.
pub const FIELD_DATA: &str = "data";

/// The commands a client may issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Peek at the newest clip.
    Pull,
    /// Add clips, then report the newest clip.
    Push(Vec<Clip>),
    /// Remove and return the newest clip.
    Pop,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Pull => "PULL",
            Command::Push(_) => "PUSH",
            Command::Pop => "POP",
        }
    }

    /// Decode one request line (without its trailing newline).
    pub fn decode_line(line: &str) -> Result<Self, ProtocolError> {
        let request: Value = serde_json::from_str(line)
            .map_err(|_| ProtocolError::InvalidJson(line.to_string()))?;
        let request = request
            .as_object()
            .ok_or_else(|| ProtocolError::InvalidJson(line.to_string()))?;

        let cmd = request
            .get(FIELD_COMMAND)
            .ok_or(ProtocolError::MissingCommand)?;

        match cmd.as_str() {
            Some("PULL") => Ok(Command::Pull),
            Some("POP") => Ok(Command::Pop),
            Some("PUSH") => {
                let records = request
                    .get(FIELD_DATA)
                    .and_then(Value::as_array)
                    .ok_or(ProtocolError::MissingData)?;
                let clips = records
                    .iter()
                    .enumerate()
                    .map(|(index, record)| {
                        Clip::try_from(record)
                            .map_err(|source| ProtocolError::MalformedClip { index, source })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Command::Push(clips))
            }
            Some(other) => Err(ProtocolError::UnknownCommand(other.to_string())),
            None => Err(ProtocolError::UnknownCommand(cmd.to_string())),
        }
    }

    /// Encode as a request line, including the trailing newline.
    pub fn encode_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let request = RequestLine {
            cmd: self.name(),
            data: match self {
                Command::Push(clips) => Some(clips.as_slice()),
                _ => None,
            },
        };
        let mut line = serde_json::to_vec(&request)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[derive(Serialize)]
struct RequestLine<'a> {
    cmd: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a [Clip]>,
}

/// The single reply sent back on a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Clip(Clip),
    Error { err: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            err: message.into(),
        }
    }

    pub fn empty_store() -> Self {
        Response::error(crate::history::StoreError::Empty.to_string())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Encode as one line, including the trailing newline.
    pub fn encode_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    pub fn decode_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Self {
        Response::error(err.to_string())
    }
}

impl From<Clip> for Response {
    fn from(clip: Clip) -> Self {
        Response::Clip(clip)
    }
}
