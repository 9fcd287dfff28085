// src/exec/capture.rs

//! Bounded capture of a child's stdout/stderr.
//!
//! Each stream is read by its own Tokio task into a [`TailBuffer`] that keeps
//! at most `cap` bytes. When the cap is exceeded the oldest bytes are dropped:
//! test programs print their summary last, so the tail is what the parser
//! needs.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::debug;

/// Text captured from one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub text: String,
    pub truncated: bool,
}

#[derive(Debug)]
pub struct TailBuffer {
    buf: Vec<u8>,
    cap: usize,
    truncated: bool,
}

impl TailBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: Vec::new(),
            cap: cap.max(1),
            truncated: false,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        // Compact lazily so a chatty child doesn't cause a memmove per read.
        if self.buf.len() > self.cap.saturating_mul(2) {
            self.compact();
        }
    }

    fn compact(&mut self) {
        if self.buf.len() <= self.cap {
            return;
        }
        let mut excess = self.buf.len() - self.cap;
        // Don't start the kept tail in the middle of a UTF-8 sequence.
        while excess < self.buf.len() && (self.buf[excess] & 0b1100_0000) == 0b1000_0000 {
            excess += 1;
        }
        self.buf.drain(..excess);
        self.truncated = true;
    }

    pub fn finish(&mut self) -> CapturedOutput {
        self.compact();
        CapturedOutput {
            text: String::from_utf8_lossy(&self.buf).into_owned(),
            truncated: self.truncated,
        }
    }
}

/// A running reader task plus the buffer it fills.
pub struct OutputCapture {
    buffer: Arc<Mutex<TailBuffer>>,
    handle: JoinHandle<()>,
}

impl OutputCapture {
    /// Start draining `reader` in the background.
    pub fn spawn<R>(mut reader: R, cap: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(TailBuffer::new(cap)));
        let shared = Arc::clone(&buffer);

        let handle = tokio::spawn(async move {
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => shared
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(&chunk[..n]),
                    Err(err) => {
                        debug!(error = %err, "output reader stopped on read error");
                        break;
                    }
                }
            }
        });

        Self { buffer, handle }
    }

    /// Wait for the stream to reach EOF, but no longer than `leak_window`.
    ///
    /// A grandchild that inherited the pipe can keep it open after the test
    /// process exits; in that case the reader is aborted and whatever was
    /// captured so far is returned.
    pub async fn finish(mut self, leak_window: Duration) -> CapturedOutput {
        if tokio::time::timeout(leak_window, &mut self.handle).await.is_err() {
            debug!("output pipe still open after process exit; abandoning reader");
            self.handle.abort();
        }
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish()
    }
}

/// Finish an optional capture (the pipe may not have been set up).
pub async fn finish_optional(capture: Option<OutputCapture>, leak_window: Duration) -> CapturedOutput {
    match capture {
        Some(capture) => capture.finish(leak_window).await,
        None => CapturedOutput::default(),
    }
}
