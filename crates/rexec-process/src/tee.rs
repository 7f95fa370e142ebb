//! Fan-out of a child stream to a live sink and an in-memory buffer.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::sink::OutputSink;

const CHUNK_SIZE: usize = 8 * 1024;

/// Writes each chunk to the sink as it arrives and keeps a copy.
pub(crate) struct TeeWriter<'a> {
    sink: &'a OutputSink,
    buffer: Vec<u8>,
    sink_failed: bool,
}

impl<'a> TeeWriter<'a> {
    pub(crate) fn new(sink: &'a OutputSink) -> Self {
        Self {
            sink,
            buffer: Vec::new(),
            sink_failed: false,
        }
    }

    /// Forward one chunk. A failing sink is dropped from the fan-out after
    /// the first error; buffering continues so the child is always drained.
    pub(crate) async fn write(&mut self, chunk: &[u8]) {
        if !self.sink_failed
            && let Err(e) = self.sink.write_chunk(chunk).await
        {
            tracing::warn!(
                sink = self.sink.name(),
                "Output sink write failed, continuing with buffer only: {e}"
            );
            self.sink_failed = true;
        }
        self.buffer.extend_from_slice(chunk);
    }

    pub(crate) fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}

/// Read `reader` to EOF through a [`TeeWriter`] on `sink`.
pub(crate) async fn tee_stream<R>(reader: Option<R>, sink: &OutputSink) -> String
where
    R: AsyncRead + Unpin,
{
    let mut tee = TeeWriter::new(sink);
    let Some(mut reader) = reader else {
        return tee.into_string();
    };

    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => tee.write(&chunk[..n]).await,
            Err(e) => {
                tracing::warn!(sink = sink.name(), "Failed to read child output: {e}");
                break;
            }
        }
    }
    tee.into_string()
}
