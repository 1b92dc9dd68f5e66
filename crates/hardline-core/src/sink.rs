//! Bounded-memory response body sink.
//!
//! Inbound bytes stay in memory up to a fixed threshold, then spill to an
//! unlinked temporary file so one large response cannot hold its full
//! payload in RAM. The finished stream is independent of the engine and
//! can be read any number of times.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Bytes buffered in memory before the sink spills to a temp file.
pub const SPILL_THRESHOLD: usize = 256 * 1024;

enum SinkBacking {
    Memory(Vec<u8>),
    File { file: File, len: u64 },
}

/// Write-side of the body sink, filled incrementally during a transfer.
pub struct BodySink {
    backing: SinkBacking,
    threshold: usize,
}

impl Default for BodySink {
    fn default() -> Self {
        Self::new()
    }
}

impl BodySink {
    pub fn new() -> Self {
        BodySink {
            backing: SinkBacking::Memory(Vec::new()),
            threshold: SPILL_THRESHOLD,
        }
    }

    /// Sink with a custom spill threshold. Used by tests to force spilling
    /// without writing hundreds of kilobytes.
    pub fn with_threshold(threshold: usize) -> Self {
        BodySink {
            backing: SinkBacking::Memory(Vec::new()),
            threshold,
        }
    }

    /// Append a chunk, spilling to a temp file once the threshold is crossed.
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match &mut self.backing {
            SinkBacking::Memory(buf) => {
                if buf.len() + data.len() > self.threshold {
                    let mut file = tempfile::tempfile()?;
                    file.write_all(buf)?;
                    file.write_all(data)?;
                    let len = (buf.len() + data.len()) as u64;
                    tracing::debug!(bytes = len, "body sink spilled to temp file");
                    self.backing = SinkBacking::File { file, len };
                } else {
                    buf.extend_from_slice(data);
                }
            }
            SinkBacking::File { file, len } => {
                file.write_all(data)?;
                *len += data.len() as u64;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> u64 {
        match &self.backing {
            SinkBacking::Memory(buf) => buf.len() as u64,
            SinkBacking::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seal the sink into a re-readable stream.
    pub fn finish(self) -> io::Result<BodyStream> {
        let backing = match self.backing {
            SinkBacking::Memory(buf) => StreamBacking::Memory(buf),
            SinkBacking::File { mut file, len } => {
                file.flush()?;
                StreamBacking::File { file, len }
            }
        };
        Ok(BodyStream {
            backing: Arc::new(backing),
        })
    }
}

enum StreamBacking {
    Memory(Vec<u8>),
    File { file: File, len: u64 },
}

/// Read-side of a finished body. Cloning is cheap; every `reader()` call
/// yields an independent cursor, so the body can be read more than once.
#[derive(Clone)]
pub struct BodyStream {
    backing: Arc<StreamBacking>,
}

impl std::fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match *self.backing {
            StreamBacking::Memory(_) => "memory",
            StreamBacking::File { .. } => "file",
        };
        f.debug_struct("BodyStream")
            .field("len", &self.len())
            .field("backing", &kind)
            .finish()
    }
}

impl BodyStream {
    /// Zero-length stream, for synthetic responses.
    pub fn empty() -> Self {
        BodyStream {
            backing: Arc::new(StreamBacking::Memory(Vec::new())),
        }
    }

    /// In-memory stream over the given bytes. Mostly used by tests.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        BodyStream {
            backing: Arc::new(StreamBacking::Memory(bytes)),
        }
    }

    pub fn len(&self) -> u64 {
        match &*self.backing {
            StreamBacking::Memory(buf) => buf.len() as u64,
            StreamBacking::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh cursor at offset zero.
    pub fn reader(&self) -> BodyReader {
        BodyReader {
            stream: self.clone(),
            pos: 0,
        }
    }

    /// Read the whole body into memory. Convenience for callers and tests;
    /// large bodies should prefer `reader()`.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.reader()
            .read_to_end(&mut out)
            .context("failed to read body stream")?;
        Ok(out)
    }
}

/// Independent read cursor over a [`BodyStream`].
pub struct BodyReader {
    stream: BodyStream,
    pos: u64,
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &*self.stream.backing {
            StreamBacking::Memory(data) => {
                let start = (self.pos as usize).min(data.len());
                let mut remaining = &data[start..];
                let n = remaining.read(buf)?;
                self.pos += n as u64;
                Ok(n)
            }
            StreamBacking::File { file, .. } => {
                let n = read_at(file, buf, self.pos)?;
                self.pos += n as u64;
                Ok(n)
            }
        }
    }
}

/// Positioned read that leaves no shared cursor behind. On Unix this is a
/// plain pread; elsewhere we reopen a private handle and seek.
#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], pos: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, pos)
}

#[cfg(not(unix))]
fn read_at(file: &File, buf: &mut [u8], pos: u64) -> io::Result<usize> {
    use std::io::{Seek, SeekFrom};
    let mut f = file.try_clone()?;
    f.seek(SeekFrom::Start(pos))?;
    f.read(buf)
}
