//! Outbound leg of the bridge: dispatches exchanges to the backend

use crate::correlator::ResponseCorrelator;
use crate::endpoint::BackendTarget;
use crate::exchange::{Continuation, Exchange};
use crate::BridgeError;
use convert::{BodyValue, ConverterRegistry, TypeTag};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use transport::{keys, TransportMessage, TransportSender};

/// Sends the outbound leg of an exchange to the backend over the async
/// transport.
///
/// The backend target is resolved once at construction from the declared
/// endpoint address and never changes; this is the only state the producer
/// shares across exchanges.
pub struct OutboundProducer {
    target: BackendTarget,
    sender: Arc<dyn TransportSender>,
    registry: Arc<ConverterRegistry>,
    response_form: TypeTag,
}

impl std::fmt::Debug for OutboundProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundProducer")
            .field("target", &self.target)
            .field("response_form", &self.response_form)
            .finish()
    }
}

impl OutboundProducer {
    /// Resolve the declared endpoint address and build a producer.
    ///
    /// A malformed address is a construction-time error so the host can
    /// abort startup instead of carrying a producer that can never send.
    pub fn new(
        address: &str,
        sender: Arc<dyn TransportSender>,
        registry: Arc<ConverterRegistry>,
    ) -> Result<Self, BridgeError> {
        let target = BackendTarget::resolve(address)?;
        Ok(Self {
            target,
            sender,
            registry,
            response_form: TypeTag::Payload,
        })
    }

    /// Declare the body form the response correlator should produce.
    pub fn with_response_form(mut self, form: TypeTag) -> Self {
        self.response_form = form;
        self
    }

    /// The resolved backend target.
    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    /// Dispatch the exchange's outbound leg; called once per exchange.
    ///
    /// Returns the transport layer's suspend flag unchanged: `true` means
    /// the engine must suspend this exchange awaiting the completion
    /// callback. Failures never propagate out of here; they go into the
    /// exchange's error slot and `process` returns `false`, because no
    /// message was submitted and no callback will ever fire. Suspending
    /// here would strand the exchange forever.
    pub fn process(&self, exchange: &Exchange, continuation: Arc<dyn Continuation>) -> bool {
        let mut request = match self.request_payload(exchange) {
            Ok(request) => request,
            Err(err) => {
                error!(exchange = exchange.id(), %err, "cannot dispatch exchange to backend");
                exchange.set_error(err);
                return false;
            }
        };

        self.rewrite_backend_request(&mut request, exchange);
        // The correlator reads the routed request back off the exchange when
        // the response arrives.
        exchange.set_in_body(BodyValue::Payload(request.clone()));

        debug!(
            exchange = exchange.id(),
            target = %self.target,
            "dispatching exchange to backend"
        );

        let correlator = Arc::new(ResponseCorrelator::new(
            exchange.clone(),
            continuation,
            Arc::clone(&self.registry),
            self.response_form,
        ));

        match self.sender.send(request, correlator) {
            Ok(suspend) => suspend,
            Err(err) => {
                exchange.set_error(err.into());
                false
            }
        }
    }

    /// The exchange's inbound body as a transport message, converting back
    /// from a structured form through the registry when necessary.
    fn request_payload(&self, exchange: &Exchange) -> Result<TransportMessage, BridgeError> {
        let body = exchange.in_body().ok_or(BridgeError::MissingPayload)?;
        match body {
            BodyValue::Payload(message) => Ok(message),
            other => {
                let converted =
                    self.registry
                        .convert(other.type_tag(), TypeTag::Payload, &other, exchange)?;
                match converted {
                    Some(BodyValue::Payload(message)) => Ok(message),
                    _ => Err(BridgeError::MissingPayload),
                }
            }
        }
    }

    /// Rewrite transport-level routing to the resolved backend: the request
    /// goes where the configured endpoint points, independent of where it
    /// originally arrived. Correlation handles missing from the message are
    /// restored from the exchange.
    fn rewrite_backend_request(&self, request: &mut TransportMessage, exchange: &Exchange) {
        request.set_property(keys::HOST, json!(self.target.host));
        request.set_property(keys::PORT, json!(self.target.port));
        request.set_property(keys::TO, json!(self.target.path));
        request.set_header("Host", json!(self.target.authority()));

        for key in keys::CORRELATION_KEYS {
            if request.property(key).is_none() {
                if let Some(value) = exchange.property(key) {
                    request.set_property(key, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ContinuationHandle;
    use crate::wiring::standard_registry;
    use serde_json::json;
    use transport::test_utils::MockTransport;

    fn registry() -> Arc<ConverterRegistry> {
        Arc::new(standard_registry().unwrap())
    }

    fn exchange_with_payload(payload: &'static [u8]) -> Exchange {
        let exchange = Exchange::new();
        exchange.set_in_body(BodyValue::Payload(TransportMessage::new(payload)));
        exchange
    }

    fn continuation() -> Arc<dyn Continuation> {
        let (handle, _rx) = ContinuationHandle::channel();
        handle
    }

    #[test]
    fn test_construction_rejects_malformed_address() {
        let sender = Arc::new(MockTransport::new());
        let result = OutboundProducer::new("no scheme here", sender, registry());
        assert!(matches!(result, Err(BridgeError::InvalidAddress { .. })));
    }

    #[test]
    fn test_suspend_flag_passes_through() {
        for flag in [true, false] {
            let sender = Arc::new(MockTransport::new().will_suspend(flag));
            let producer =
                OutboundProducer::new("http://backend:8080/svc", sender, registry()).unwrap();
            let exchange = exchange_with_payload(b"req");

            assert_eq!(producer.process(&exchange, continuation()), flag);
            assert!(exchange.error().is_none());
        }
    }

    #[test]
    fn test_request_headers_rewritten_to_backend() {
        let sender = Arc::new(MockTransport::new());
        let producer =
            OutboundProducer::new("http://payload-svc/api/orders", sender.clone(), registry())
                .unwrap();
        let exchange = exchange_with_payload(b"req");

        producer.process(&exchange, continuation());

        let sent = sender.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].property(keys::HOST), Some(&json!("payload-svc")));
        assert_eq!(sent[0].property(keys::PORT), Some(&json!(80)));
        assert_eq!(sent[0].property(keys::TO), Some(&json!("/api/orders")));
        assert_eq!(
            sent[0].headers().unwrap().get("Host"),
            Some(&json!("payload-svc:80"))
        );

        // The routed request is also what the exchange now carries.
        let routed = exchange.in_payload().unwrap();
        assert_eq!(routed.property(keys::HOST), Some(&json!("payload-svc")));
    }

    #[test]
    fn test_send_failure_goes_to_error_slot_without_suspending() {
        let sender = Arc::new(MockTransport::new());
        sender.fail_next_send();
        let producer =
            OutboundProducer::new("http://backend:8080/svc", sender.clone(), registry()).unwrap();
        let exchange = exchange_with_payload(b"req");

        let suspend = producer.process(&exchange, continuation());

        // Nothing was submitted, so no callback will ever fire; the engine
        // must not be told to wait for one.
        assert!(!suspend);
        assert!(matches!(exchange.error(), Some(BridgeError::Send(_))));
        assert_eq!(sender.send_count(), 0);
        assert_eq!(sender.pending_count(), 0);
    }

    #[test]
    fn test_missing_inbound_body_goes_to_error_slot_without_suspending() {
        let sender = Arc::new(MockTransport::new());
        let producer =
            OutboundProducer::new("http://backend:8080/svc", sender.clone(), registry()).unwrap();
        let exchange = Exchange::new();

        let suspend = producer.process(&exchange, continuation());

        assert!(!suspend);
        assert!(matches!(exchange.error(), Some(BridgeError::MissingPayload)));
        assert_eq!(sender.send_count(), 0);
        assert_eq!(sender.pending_count(), 0);
    }

    #[test]
    fn test_structured_body_converted_for_dispatch() {
        let sender = Arc::new(MockTransport::new());
        let producer =
            OutboundProducer::new("http://backend:8080/svc", sender.clone(), registry()).unwrap();
        let exchange = Exchange::new();
        exchange.set_property(keys::SRC_HANDLER, json!("h1"));
        exchange.set_in_body(BodyValue::Text("structured request".into()));

        producer.process(&exchange, continuation());

        let sent = sender.sent_messages();
        assert_eq!(sent[0].payload().as_ref(), b"structured request");
        // Correlation identity restored from the exchange.
        assert_eq!(sent[0].property(keys::SRC_HANDLER), Some(&json!("h1")));
    }
}
