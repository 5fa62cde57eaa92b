//! JSON-lines frame replay.
//!
//! Reads one [`Frame`] per line from a file or stdin on a background thread
//! and hands them to the pipeline loop over a bounded channel. This stands in
//! for the live pose-estimation pipeline, which produces the same records.

use crate::source::types::Frame;
use crate::stats::SharedSessionStats;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Capacity of the frame channel.
const CHANNEL_CAPACITY: usize = 1_024;

/// Errors raised by a frame source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame source is already running")]
    AlreadyRunning,
    #[error("cannot open frame input {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Replays recorded landmark frames from a line-oriented reader.
pub struct ReplaySource {
    reader: Option<Box<dyn BufRead + Send>>,
    sender: Option<Sender<Frame>>,
    receiver: Receiver<Frame>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
    stats: Option<SharedSessionStats>,
}

impl ReplaySource {
    /// Create a source over any buffered reader.
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            reader: Some(Box::new(reader)),
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            stats: None,
        }
    }

    /// Open a file, or stdin when the path is `-`.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        if path.as_os_str() == "-" {
            return Ok(Self::new(BufReader::new(io::stdin())));
        }
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }

    /// Record malformed lines into shared session statistics.
    pub fn with_stats(mut self, stats: SharedSessionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Start reading frames in a background thread.
    ///
    /// A source reads its input once; starting it a second time fails with
    /// [`SourceError::AlreadyRunning`].
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        let (Some(reader), Some(sender)) = (self.reader.take(), self.sender.take()) else {
            return Err(SourceError::AlreadyRunning);
        };

        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let stats = self.stats.clone();

        let handle = thread::spawn(move || {
            read_frames(reader, sender, &running, stats.as_deref());
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop reading.
    ///
    /// The reader thread is joined when it can finish; a thread blocked on
    /// interactive input is detached and exits after its next line.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            // Unblock a sender waiting on a full channel.
            while self.receiver.try_recv().is_ok() {}
            thread::sleep(Duration::from_millis(10));
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }

    /// Check if the reader thread is still producing frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for frames. It disconnects once the input is exhausted.
    pub fn receiver(&self) -> &Receiver<Frame> {
        &self.receiver
    }

    /// Try to receive a frame without blocking.
    pub fn try_recv(&self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn read_frames(
    reader: Box<dyn BufRead + Send>,
    sender: Sender<Frame>,
    running: &AtomicBool,
    stats: Option<&crate::stats::SessionStats>,
) {
    for (line_no, line) in reader.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Frame input read failed at line {}: {}", line_no + 1, e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Frame>(trimmed) {
            Ok(frame) => {
                if sender.send(frame).is_err() {
                    debug!("Frame receiver dropped, stopping reader");
                    break;
                }
            }
            Err(e) => {
                warn!("Skipping malformed frame on line {}: {}", line_no + 1, e);
                if let Some(stats) = stats {
                    stats.record_malformed_line();
                }
            }
        }
    }
}
