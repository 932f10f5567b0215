//! Scripted transport doubles for tests
//!
//! [`MockTransport`] records every submitted message and either holds the
//! completion callback for manual delivery, fires it inline with a canned
//! response, or fires it from a spawned thread to exercise the
//! callback-on-foreign-thread path.

use crate::{ResponseCallback, TransportError, TransportMessage, TransportSender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// How a scripted response reaches the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Callback is held; the test completes it explicitly.
    Manual,
    /// Callback fires inside `send`, before it returns.
    Inline,
    /// Callback fires from a freshly spawned thread.
    Thread,
}

/// A transport sender that collects messages and plays back scripted
/// completions.
pub struct MockTransport {
    sent: Mutex<Vec<TransportMessage>>,
    pending: Mutex<Vec<Arc<dyn ResponseCallback>>>,
    response: Mutex<Option<Option<TransportMessage>>>,
    delivery: Mutex<Delivery>,
    suspend: AtomicBool,
    fail_next_send: AtomicBool,
    send_count: AtomicU64,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("sent", &self.sent.lock().len())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

impl MockTransport {
    /// A transport that holds callbacks for manual completion and reports
    /// that the caller must suspend.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            response: Mutex::new(None),
            delivery: Mutex::new(Delivery::Manual),
            suspend: AtomicBool::new(true),
            fail_next_send: AtomicBool::new(false),
            send_count: AtomicU64::new(0),
        }
    }

    /// Script a response delivered inside `send` itself.
    pub fn respond_inline(self, response: Option<TransportMessage>) -> Self {
        *self.response.lock() = Some(response);
        *self.delivery.lock() = Delivery::Inline;
        self
    }

    /// Script a response delivered from a spawned thread after `send`
    /// returns.
    pub fn respond_from_thread(self, response: Option<TransportMessage>) -> Self {
        *self.response.lock() = Some(response);
        *self.delivery.lock() = Delivery::Thread;
        self
    }

    /// Set the suspend flag `send` reports back.
    pub fn will_suspend(self, suspend: bool) -> Self {
        self.suspend.store(suspend, Ordering::Relaxed);
        self
    }

    /// Make the next `send` call fail without invoking the callback.
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::Relaxed);
    }

    /// Messages submitted so far.
    pub fn sent_messages(&self) -> Vec<TransportMessage> {
        self.sent.lock().clone()
    }

    /// Number of `send` calls that were accepted.
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::Relaxed)
    }

    /// Complete the oldest held callback with the given response. Panics if
    /// nothing is pending.
    pub fn complete_next(&self, response: Option<TransportMessage>) {
        let callback = {
            let mut pending = self.pending.lock();
            assert!(!pending.is_empty(), "no pending callback to complete");
            pending.remove(0)
        };
        callback.done(response);
    }

    /// Number of callbacks still held.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportSender for MockTransport {
    fn send(
        &self,
        message: TransportMessage,
        callback: Arc<dyn ResponseCallback>,
    ) -> Result<bool, TransportError> {
        if self.fail_next_send.swap(false, Ordering::Relaxed) {
            return Err(TransportError::send_failed_with_context(
                "Simulated failure",
                crate::SendContext::new(message.payload_len()),
            ));
        }

        self.sent.lock().push(message);
        self.send_count.fetch_add(1, Ordering::Relaxed);

        let delivery = *self.delivery.lock();
        match delivery {
            Delivery::Manual => self.pending.lock().push(callback),
            Delivery::Inline => {
                let response = self.response.lock().clone().unwrap_or(None);
                callback.done(response);
            }
            Delivery::Thread => {
                let response = self.response.lock().clone().unwrap_or(None);
                std::thread::spawn(move || callback.done(response));
            }
        }

        Ok(self.suspend.load(Ordering::Relaxed))
    }
}

/// A callback that records every invocation.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    invocations: Mutex<Vec<Option<TransportMessage>>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `done` has fired.
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }

    /// The response from the most recent invocation.
    pub fn last_response(&self) -> Option<Option<TransportMessage>> {
        self.invocations.lock().last().cloned()
    }
}

impl ResponseCallback for RecordingCallback {
    fn done(&self, response: Option<TransportMessage>) {
        self.invocations.lock().push(response);
    }
}
