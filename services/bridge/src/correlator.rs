//! Completion callback that correlates backend responses to exchanges

use crate::exchange::{Continuation, EngineMessage, Exchange, RESPONSE_STATUS};
use convert::{BodyValue, ConverterRegistry, TypeTag};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};
use transport::{keys, ResponseCallback, TransportMessage};

struct Pending {
    exchange: Exchange,
    continuation: Arc<dyn Continuation>,
    registry: Arc<ConverterRegistry>,
    response_form: TypeTag,
}

/// One-shot completion handler bound to a single submitted exchange.
///
/// The transport layer invokes [`ResponseCallback::done`] on a thread of its
/// own choosing. The pending state is taken on first invocation, so a
/// duplicate completion is a logged no-op and the engine continuation fires
/// exactly once per exchange, on every branch including the "no response"
/// and "degenerate response" ones. An exchange is never left hanging here.
pub struct ResponseCorrelator {
    pending: Mutex<Option<Pending>>,
}

impl ResponseCorrelator {
    pub fn new(
        exchange: Exchange,
        continuation: Arc<dyn Continuation>,
        registry: Arc<ConverterRegistry>,
        response_form: TypeTag,
    ) -> Self {
        Self {
            pending: Mutex::new(Some(Pending {
                exchange,
                continuation,
                registry,
                response_form,
            })),
        }
    }

    fn correlate(pending: &Pending, mut response: TransportMessage) {
        let exchange = &pending.exchange;

        if response.headers().is_none() {
            warn!(
                exchange = exchange.id(),
                "backend response carried no transport headers"
            );
            return;
        }

        // Publish the backend's status code under the engine's canonical
        // response-status header.
        let status = response
            .property(keys::HTTP_STATUS_CODE)
            .cloned()
            .unwrap_or(Value::Null);
        response.set_header(RESPONSE_STATUS, status);

        // The response must carry the same correlation identity as the
        // request it answers, whether or not the backend echoed it.
        if let Some(request) = exchange.in_payload() {
            response.copy_correlation_from(&request);
        } else {
            for key in keys::CORRELATION_KEYS {
                if let Some(value) = exchange.property(key) {
                    response.set_property(key, value);
                }
            }
        }

        let headers: HashMap<String, Value> = response
            .headers()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let body = Self::convert_response(pending, response);

        let mut out = EngineMessage::new();
        out.headers = headers;
        out.body = body;
        exchange.set_out_message(out);
    }

    /// Response-side body conversion; failure leaves the body unset without
    /// failing the exchange.
    fn convert_response(pending: &Pending, response: TransportMessage) -> Option<BodyValue> {
        if pending.response_form == TypeTag::Payload {
            return Some(BodyValue::Payload(response));
        }

        let value = BodyValue::Payload(response);
        match pending.registry.convert(
            TypeTag::Payload,
            pending.response_form,
            &value,
            &pending.exchange,
        ) {
            Ok(Some(converted)) => Some(converted),
            Ok(None) => {
                warn!(
                    exchange = pending.exchange.id(),
                    form = pending.response_form.name(),
                    "response body conversion produced no result"
                );
                None
            }
            Err(err) => {
                error!(
                    exchange = pending.exchange.id(),
                    form = pending.response_form.name(),
                    %err,
                    "response body conversion failed"
                );
                None
            }
        }
    }
}

impl ResponseCallback for ResponseCorrelator {
    fn done(&self, response: Option<TransportMessage>) {
        let Some(pending) = self.pending.lock().take() else {
            warn!("duplicate completion for an already-finished exchange ignored");
            return;
        };

        match response {
            Some(response) => Self::correlate(&pending, response),
            None => {
                warn!(
                    exchange = pending.exchange.id(),
                    "backend response not received for request"
                );
            }
        }

        // Exactly once, on every path: the engine decides what missing data
        // means, but it must be resumed to decide anything at all.
        pending.continuation.done(false);
    }
}
