//! Shared output destinations for child process streams.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Cloneable handle to a writer that child output is forwarded to.
///
/// Clones share the same writer, so one sink can serve several sequential
/// commands. The runner only writes and flushes; it never shuts a sink down.
#[derive(Clone)]
pub struct OutputSink {
    name: &'static str,
    writer: Arc<Mutex<BoxedWriter>>,
}

impl OutputSink {
    pub fn new<W>(name: &'static str, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            name,
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new("stdout", tokio::io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new("stderr", tokio::io::stderr())
    }

    /// Discards everything written to it.
    pub fn null() -> Self {
        Self::new("null", tokio::io::sink())
    }

    /// Sink backed by a fresh in-memory buffer, plus a reader handle for it.
    pub fn capture() -> (Self, CaptureBuffer) {
        let buffer = CaptureBuffer::default();
        (Self::new("capture", buffer.clone()), buffer)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Write and flush one chunk.
    pub async fn write_chunk(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// In-memory writer whose contents stay readable through any clone.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<StdMutex<Vec<u8>>>,
    shut_down: Arc<AtomicBool>,
}

impl CaptureBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Whether a writer ever shut this buffer down.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl AsyncWrite for CaptureBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.is_shut_down() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "capture buffer was shut down",
            )));
        }
        let mut bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        bytes.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.shut_down.store(true, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}
