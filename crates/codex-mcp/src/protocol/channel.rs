//! Line-delimited text channel.
//!
//! Reads one line at a time from the peer and writes one compact JSON value
//! per line, flushed immediately.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Reads trimmed lines. Blank lines are returned as empty strings; callers
/// skip them.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// Next line, or `None` at end of input. Invalid UTF-8 is replaced, not
    /// rejected.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).trim().to_string()))
    }
}

/// Writes one JSON value per line.
pub struct LineWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Serialize `value` compactly, append `\n`, and flush.
    pub async fn write_json<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        let mut bytes = serde_json::to_vec(value)?;
        bytes.push(b'\n');
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
