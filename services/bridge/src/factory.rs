//! Materializes engine-native exchanges from inbound transport messages

use crate::exchange::{EngineMessage, Exchange};
use convert::{BodyValue, ConverterRegistry, TypeTag};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};
use transport::{keys, TransportMessage};

/// Builds an [`Exchange`] from an inbound transport message plus header
/// metadata, performing the inbound body conversion and seeding exchange
/// headers. No other side effects.
#[derive(Debug)]
pub struct ExchangeFactory {
    registry: Arc<ConverterRegistry>,
    inbound_form: TypeTag,
}

impl ExchangeFactory {
    /// Factory that carries the inbound body in payload form.
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            registry,
            inbound_form: TypeTag::Payload,
        }
    }

    /// Declare the body form engine-side processors expect; non-payload
    /// forms go through the converter registry.
    pub fn with_inbound_form(mut self, form: TypeTag) -> Self {
        self.inbound_form = form;
        self
    }

    /// Materialize an exchange.
    ///
    /// Conversion failure is logged and leaves the inbound body unset; the
    /// exchange is still returned, not rejected. Downstream processing must
    /// treat a missing inbound body as its own condition.
    pub fn create_exchange(
        &self,
        headers: &HashMap<String, Value>,
        message: TransportMessage,
    ) -> Exchange {
        let exchange = Exchange::new();

        // Correlation handles ride along as exchange properties so backend
        // routing can restore them whatever body form is in use.
        for key in keys::CORRELATION_KEYS {
            if let Some(value) = message.property(key) {
                exchange.set_property(key, value.clone());
            }
        }

        let body = self.convert_inbound(message, &exchange);

        let mut in_message = EngineMessage::new();
        in_message.headers = headers.clone();
        in_message.body = body;
        exchange.set_in_message(in_message);

        exchange
    }

    fn convert_inbound(&self, message: TransportMessage, exchange: &Exchange) -> Option<BodyValue> {
        if self.inbound_form == TypeTag::Payload {
            return Some(BodyValue::Payload(message));
        }

        let value = BodyValue::Payload(message);
        match self
            .registry
            .convert(TypeTag::Payload, self.inbound_form, &value, exchange)
        {
            Ok(Some(converted)) => Some(converted),
            Ok(None) => {
                warn!(
                    exchange = exchange.id(),
                    form = self.inbound_form.name(),
                    "inbound body conversion produced no result"
                );
                None
            }
            Err(err) => {
                error!(
                    exchange = exchange.id(),
                    form = self.inbound_form.name(),
                    %err,
                    "inbound body conversion failed"
                );
                None
            }
        }
    }
}
