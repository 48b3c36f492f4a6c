//! Newline-delimited framing helpers.

use std::io;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

/// What a bounded line read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A complete line, without its `\n` (and without a trailing `\r`).
    Line(String),
    /// The stream ended before a newline; `partial` bytes were discarded.
    Eof { partial: usize },
    /// More than `limit` bytes arrived without a newline.
    TooLarge { limit: usize },
    /// The line is not UTF-8; the first bad byte is at `valid_up_to`.
    InvalidUtf8 { valid_up_to: usize },
}

/// Read one `\n`-terminated line, buffering at most `limit` bytes of it.
///
/// Lines that are not valid UTF-8 are reported, never repaired.
pub async fn read_line_bounded<R>(reader: &mut R, limit: usize) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    // One byte of headroom so a line of exactly `limit` bytes plus its
    // newline still fits.
    let cap = (limit as u64).saturating_add(1);
    let n = reader.take(cap).read_until(b'\n', &mut buf).await?;
    trace!(stage = "read_line", read = n, "read request bytes");

    if buf.last() != Some(&b'\n') {
        if n as u64 >= cap {
            warn!(stage = "read_line", limit, "line exceeds limit");
            return Ok(LineRead::TooLarge { limit });
        }
        return Ok(LineRead::Eof { partial: n });
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    match String::from_utf8(buf) {
        Ok(line) => Ok(LineRead::Line(line)),
        Err(e) => {
            let valid_up_to = e.utf8_error().valid_up_to();
            warn!(stage = "read_line", valid_up_to, "line is not valid utf-8");
            Ok(LineRead::InvalidUtf8 { valid_up_to })
        }
    }
}

/// Write an already newline-terminated frame and flush it.
pub async fn write_line<W>(writer: &mut W, line: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    trace!(stage = "write_line", len = line.len(), "writing line");
    writer.write_all(line).await?;
    writer.flush().await?;
    Ok(())
}
