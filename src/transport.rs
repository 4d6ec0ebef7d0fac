//! Newline-delimited text over a byte stream.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Longest line accepted from a peer, terminator excluded.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Reads lines of at most `max_length` bytes. Invalid UTF-8 is replaced
/// rather than rejected; an over-long line is an `InvalidData` error.
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    max_length: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn with_max_length(reader: R, max_length: usize) -> Self {
        Self {
            inner: BufReader::new(reader),
            buf: Vec::new(),
            max_length,
        }
    }

    /// Next line with the trailing `\n` (or `\r\n`) removed, `None` at EOF.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();

        let limit = self.max_length as u64 + 1;
        let n = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .await?;
        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        } else if n as u64 == limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line longer than {} bytes", self.max_length),
            ));
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

pub fn lines<R: AsyncRead + Unpin>(reader: R) -> LineReader<R> {
    LineReader::with_max_length(reader, MAX_LINE_LENGTH)
}

/// Writes `line` followed by `\n`.
pub async fn send_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> io::Result<()> {
    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');

    writer.write_all(&buf).await?;
    writer.flush().await
}

/// Writes `text` as is, for prompts that leave the cursor on the same line.
pub async fn send_raw<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await
}
