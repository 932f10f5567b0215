//! Explicit construction of the bridge and its converter registry
//!
//! The hosting environment builds everything here during startup and hands
//! the pieces to the engine; there is no ambient global registration.

use crate::config::BridgeConfig;
use crate::factory::ExchangeFactory;
use crate::producer::OutboundProducer;
use crate::BridgeError;
use convert::{
    BytesToPayload, ChunksToPayload, ConvertError, ConverterRegistry, DocumentToPayload,
    PayloadToText, TextToPayload, TypeTag,
};
use std::sync::Arc;
use transport::TransportSender;

/// The standard converter set: every engine-side form down to transport
/// payload, and payload back to plain text.
pub fn standard_registry() -> Result<ConverterRegistry, ConvertError> {
    let mut registry = ConverterRegistry::new();
    registry.register(TypeTag::Text, TypeTag::Payload, TextToPayload)?;
    registry.register(TypeTag::Bytes, TypeTag::Payload, BytesToPayload)?;
    registry.register(TypeTag::Document, TypeTag::Payload, DocumentToPayload)?;
    registry.register(TypeTag::Chunks, TypeTag::Payload, ChunksToPayload)?;
    registry.register(TypeTag::Payload, TypeTag::Text, PayloadToText)?;
    Ok(registry)
}

/// A fully wired bridge: exchange factory for the inbound boundary and
/// outbound producer for the backend leg, sharing one converter registry.
#[derive(Debug)]
pub struct Bridge {
    factory: ExchangeFactory,
    producer: OutboundProducer,
}

impl Bridge {
    /// Validate the config and construct the bridge against the given
    /// transport sender. Fails fast on a malformed endpoint address.
    pub fn from_config(
        config: &BridgeConfig,
        sender: Arc<dyn TransportSender>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;

        let registry = Arc::new(standard_registry()?);
        let factory =
            ExchangeFactory::new(Arc::clone(&registry)).with_inbound_form(config.inbound_form());
        let producer = OutboundProducer::new(&config.endpoint, sender, registry)?
            .with_response_form(config.response_form());

        Ok(Self { factory, producer })
    }

    pub fn factory(&self) -> &ExchangeFactory {
        &self.factory
    }

    pub fn producer(&self) -> &OutboundProducer {
        &self.producer
    }
}
