//! The engine's unit of work and the continuation seam

use crate::BridgeError;
use convert::{BodyValue, ConvertContext};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use transport::TransportMessage;

/// Engine header under which the backend's status code is published on a
/// response.
pub const RESPONSE_STATUS: &str = "bridge.response.status";

static NEXT_EXCHANGE_ID: AtomicU64 = AtomicU64::new(1);

/// An engine-native message: a header map plus an optional body in one of
/// the representations the converter registry understands.
#[derive(Debug, Clone, Default)]
pub struct EngineMessage {
    /// Engine-visible headers.
    pub headers: HashMap<String, Value>,
    /// Message body; `None` after a failed conversion.
    pub body: Option<BodyValue>,
}

impl EngineMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style body setter.
    pub fn with_body(mut self, body: BodyValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Builder-style header setter.
    pub fn with_header(mut self, name: impl Into<String>, value: Value) -> Self {
        self.headers.insert(name.into(), value);
        self
    }
}

#[derive(Debug, Default)]
struct ExchangeState {
    in_message: EngineMessage,
    out_message: Option<EngineMessage>,
    error: Option<BridgeError>,
    properties: HashMap<String, Value>,
}

/// The engine's unit of work for one request/response cycle.
///
/// A cheap cloneable handle: the clone moved into the response correlator and
/// the handle the engine keeps refer to the same state. This hand-off is the
/// only way exchange state crosses the transport-thread boundary.
#[derive(Debug, Clone)]
pub struct Exchange {
    id: u64,
    inner: Arc<Mutex<ExchangeState>>,
}

impl Exchange {
    /// Allocate a fresh exchange with a process-unique id.
    pub fn new() -> Self {
        Self {
            id: NEXT_EXCHANGE_ID.fetch_add(1, Ordering::Relaxed),
            inner: Arc::new(Mutex::new(ExchangeState::default())),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The inbound message.
    pub fn in_message(&self) -> EngineMessage {
        self.inner.lock().in_message.clone()
    }

    pub fn set_in_message(&self, message: EngineMessage) {
        self.inner.lock().in_message = message;
    }

    /// The outbound message, once the response correlator has attached one.
    pub fn out_message(&self) -> Option<EngineMessage> {
        self.inner.lock().out_message.clone()
    }

    pub fn set_out_message(&self, message: EngineMessage) {
        self.inner.lock().out_message = Some(message);
    }

    /// The error slot the engine's failover logic inspects.
    pub fn error(&self) -> Option<BridgeError> {
        self.inner.lock().error.clone()
    }

    pub fn set_error(&self, error: BridgeError) {
        self.inner.lock().error = Some(error);
    }

    /// Look up an exchange-scoped property.
    pub fn property(&self, key: &str) -> Option<Value> {
        self.inner.lock().properties.get(key).cloned()
    }

    pub fn set_property(&self, key: impl Into<String>, value: Value) {
        self.inner.lock().properties.insert(key.into(), value);
    }

    /// The inbound body, if one was set.
    pub fn in_body(&self) -> Option<BodyValue> {
        self.inner.lock().in_message.body.clone()
    }

    /// Replace the inbound body.
    pub fn set_in_body(&self, body: BodyValue) {
        self.inner.lock().in_message.body = Some(body);
    }

    /// The inbound body as a transport message, when it is carried in
    /// payload form.
    pub fn in_payload(&self) -> Option<TransportMessage> {
        match &self.inner.lock().in_message.body {
            Some(BodyValue::Payload(msg)) => Some(msg.clone()),
            _ => None,
        }
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertContext for Exchange {
    fn exchange_id(&self) -> u64 {
        self.id
    }

    fn property(&self, key: &str) -> Option<Value> {
        Exchange::property(self, key)
    }
}

/// Engine-supplied callback that resumes exchange processing.
///
/// Invoked exactly once per exchange by the bridge. `synchronous` is `true`
/// when the exchange completed without suspending, `false` when completion
/// arrived asynchronously through the transport callback.
pub trait Continuation: Send + Sync {
    fn done(&self, synchronous: bool);
}

/// A oneshot-backed [`Continuation`] so engine-side code can await
/// completion.
///
/// The sender is consumed on first use, which is what makes double-resume
/// structurally impossible on this side of the seam.
#[derive(Debug)]
pub struct ContinuationHandle {
    tx: Mutex<Option<oneshot::Sender<bool>>>,
}

impl ContinuationHandle {
    /// Create a handle and the receiver that resolves with the `synchronous`
    /// flag when the exchange completes.
    pub fn channel() -> (Arc<Self>, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (
            Arc::new(Self {
                tx: Mutex::new(Some(tx)),
            }),
            rx,
        )
    }
}

impl Continuation for ContinuationHandle {
    fn done(&self, synchronous: bool) {
        if let Some(tx) = self.tx.lock().take() {
            // Receiver may have been dropped; completion is best-effort.
            let _ = tx.send(synchronous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exchange_ids_are_unique() {
        let a = Exchange::new();
        let b = Exchange::new();
        assert_ne!(a.id(), b.id());
        // A clone is a handle, not a new exchange.
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn test_clone_shares_state() {
        let exchange = Exchange::new();
        let handle = exchange.clone();

        handle.set_property("k", json!("v"));
        assert_eq!(exchange.property("k"), Some(json!("v")));

        handle.set_error(BridgeError::MissingPayload);
        assert!(matches!(exchange.error(), Some(BridgeError::MissingPayload)));
    }

    #[test]
    fn test_in_payload_requires_payload_form() {
        let exchange = Exchange::new();
        assert!(exchange.in_payload().is_none());

        exchange.set_in_body(BodyValue::Text("not a payload".into()));
        assert!(exchange.in_payload().is_none());

        exchange.set_in_body(BodyValue::Payload(TransportMessage::new(&b"raw"[..])));
        assert_eq!(exchange.in_payload().unwrap().payload().as_ref(), b"raw");
    }

    #[test]
    fn test_continuation_handle_fires_once() {
        let (handle, rx) = ContinuationHandle::channel();
        handle.done(false);
        // Second resume is swallowed by the consumed sender.
        handle.done(true);
        assert_eq!(tokio_test::block_on(rx).unwrap(), false);
    }
}
