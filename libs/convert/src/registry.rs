//! Ordered type-pair keyed converter lookup
//!
//! Lookup is by the exact `(source, target)` pair. The registry is populated
//! once by the wiring layer and shared read-only afterwards.

use crate::{BodyValue, ConvertError, TypeTag};
use serde_json::Value;
use std::collections::HashMap;

/// Read-only view of the exchange a conversion runs inside. Converters may
/// consult exchange properties; most ignore the context entirely.
pub trait ConvertContext {
    /// Identity of the owning exchange, for diagnostics.
    fn exchange_id(&self) -> u64;

    /// Look up an exchange-scoped property.
    fn property(&self, key: &str) -> Option<Value>;
}

/// A single body conversion.
///
/// `Ok(Some(_))` is a converted value, `Err` is a real conversion failure,
/// and `Ok(None)` means "convertible, null result": the caller's fallback
/// chain may keep trying other converters.
pub trait BodyConverter: Send + Sync {
    fn convert(
        &self,
        value: &BodyValue,
        context: &dyn ConvertContext,
    ) -> Result<Option<BodyValue>, ConvertError>;
}

/// Registry of converters keyed by ordered `(source, target)` pairs.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: HashMap<(TypeTag, TypeTag), Box<dyn BodyConverter>>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pairs: Vec<String> = self
            .converters
            .keys()
            .map(|(s, t)| format!("{}->{}", s.name(), t.name()))
            .collect();
        pairs.sort();
        f.debug_struct("ConverterRegistry")
            .field("pairs", &pairs)
            .finish()
    }
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for the ordered pair. At most one converter per
    /// pair; a second registration is rejected.
    pub fn register(
        &mut self,
        source: TypeTag,
        target: TypeTag,
        converter: impl BodyConverter + 'static,
    ) -> Result<(), ConvertError> {
        use std::collections::hash_map::Entry;
        match self.converters.entry((source, target)) {
            Entry::Occupied(_) => Err(ConvertError::DuplicateConverter {
                from: source,
                target,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(converter));
                Ok(())
            }
        }
    }

    /// Check whether a pair has a registered converter.
    pub fn contains(&self, source: TypeTag, target: TypeTag) -> bool {
        self.converters.contains_key(&(source, target))
    }

    /// Number of registered pairs.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Convert `value` from `source` to `target` form. An unregistered pair
    /// yields [`ConvertError::NoConverter`]; a registered converter may still
    /// return `Ok(None)` (null result) or its own failure.
    pub fn convert(
        &self,
        source: TypeTag,
        target: TypeTag,
        value: &BodyValue,
        context: &dyn ConvertContext,
    ) -> Result<Option<BodyValue>, ConvertError> {
        let converter = self
            .converters
            .get(&(source, target))
            .ok_or(ConvertError::NoConverter {
                from: source,
                target,
            })?;
        converter.convert(value, context)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::NullContext;
    use super::*;
    use crate::converters::{PayloadToText, TextToPayload};

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ConverterRegistry::new();
        assert!(registry.is_empty());

        registry
            .register(TypeTag::Text, TypeTag::Payload, TextToPayload)
            .unwrap();
        assert!(registry.contains(TypeTag::Text, TypeTag::Payload));
        // Ordered pairs: the reverse direction is a different key.
        assert!(!registry.contains(TypeTag::Payload, TypeTag::Text));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ConverterRegistry::new();
        registry
            .register(TypeTag::Text, TypeTag::Payload, TextToPayload)
            .unwrap();

        let err = registry
            .register(TypeTag::Text, TypeTag::Payload, TextToPayload)
            .unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateConverter { .. }));
    }

    #[test]
    fn test_unregistered_pair_is_distinct_outcome() {
        let registry = ConverterRegistry::new();
        let err = registry
            .convert(
                TypeTag::Payload,
                TypeTag::Document,
                &BodyValue::Text("x".into()),
                &NullContext,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::NoConverter {
                from: TypeTag::Payload,
                target: TypeTag::Document,
            }
        ));
    }

    #[test]
    fn test_convert_dispatches_to_registered_converter() {
        let mut registry = ConverterRegistry::new();
        registry
            .register(TypeTag::Payload, TypeTag::Text, PayloadToText)
            .unwrap();

        let payload = BodyValue::Payload(transport::TransportMessage::new(&b"hi"[..]));
        let converted = registry
            .convert(TypeTag::Payload, TypeTag::Text, &payload, &NullContext)
            .unwrap();
        assert_eq!(converted, Some(BodyValue::Text("hi".into())));
    }
}
