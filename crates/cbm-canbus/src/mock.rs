//! Mock CAN transport for testing.
//!
//! Supports a scripted inbound queue and sent-frame recording. All engine
//! tests use this instead of real CAN hardware so the suite runs in CI on
//! any platform.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::{BusError, BusResult};
use crate::transport::{BusTransport, RawFrame};

/// Mock transport with scripted inbound frames and send recording.
pub struct MockTransport {
    /// Frames returned by `try_recv` (FIFO order).
    inbound: Mutex<VecDeque<RawFrame>>,
    /// All frames passed to `send_frame` (for test assertions).
    sent: Mutex<Vec<RawFrame>>,
    closed: AtomicBool,
}

impl MockTransport {
    /// Create a new mock with an empty inbound queue.
    pub fn new() -> Self {
        Self {
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a mock pre-loaded with inbound frames.
    pub fn with_inbound(frames: Vec<RawFrame>) -> Self {
        let mock = Self::new();
        mock.inbound.lock().unwrap().extend(frames);
        mock
    }

    /// Queue an additional inbound frame.
    pub fn queue_inbound(&self, frame: RawFrame) {
        self.inbound.lock().unwrap().push_back(frame);
    }

    /// Get copies of all frames that were sent.
    pub fn sent_frames(&self) -> Vec<RawFrame> {
        self.sent.lock().unwrap().clone()
    }

    /// Drain the record of sent frames, returning what was captured.
    /// Handy for per-tick assertions.
    pub fn take_sent(&self) -> Vec<RawFrame> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Get the last sent frame, if any.
    pub fn last_sent(&self) -> Option<RawFrame> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusTransport for MockTransport {
    async fn send_frame(&self, frame: &RawFrame) -> BusResult<()> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        self.sent.lock().unwrap().push(frame.clone());
        Ok(())
    }

    async fn try_recv(&self) -> BusResult<Option<RawFrame>> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        Ok(self.inbound.lock().unwrap().pop_front())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
