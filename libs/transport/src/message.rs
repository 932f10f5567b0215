use crate::keys;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Addressable byte payload container used by the async transport layer.
///
/// A message is a byte buffer plus a property bag of string- or
/// object-valued entries. Transport-level headers are one property
/// ([`keys::TRANSPORT_HEADERS`]) holding a JSON object, mirroring how the
/// transport layer ships them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportMessage {
    payload: Bytes,
    properties: HashMap<String, Value>,
}

impl TransportMessage {
    /// Create a message with the given payload and no properties.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            properties: HashMap::new(),
        }
    }

    /// Create an empty message.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The raw payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload size in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Replace the payload.
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    /// Look up a property by key.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a property, returning the previous value if any.
    pub fn set_property(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.properties.insert(key.into(), value)
    }

    /// Remove a property.
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// All properties.
    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_property(key, value);
        self
    }

    /// The transport-level header map, if the message carries one.
    ///
    /// Returns `None` both when the property is absent and when it holds
    /// something other than a JSON object (a degenerate message).
    pub fn headers(&self) -> Option<&Map<String, Value>> {
        self.properties
            .get(keys::TRANSPORT_HEADERS)
            .and_then(Value::as_object)
    }

    /// Mutable access to the transport-level header map, creating it when
    /// absent.
    pub fn headers_mut(&mut self) -> &mut Map<String, Value> {
        let entry = self
            .properties
            .entry(keys::TRANSPORT_HEADERS.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        entry.as_object_mut().unwrap()
    }

    /// Set a single transport-level header.
    pub fn set_header(&mut self, name: impl Into<String>, value: Value) {
        self.headers_mut().insert(name.into(), value);
    }

    /// Copy the three correlation properties from `request` onto this
    /// message, unconditionally overwriting any existing values.
    ///
    /// A response must carry the same correlation identity as the request it
    /// answers; the transport layer relies on these opaque handles to route
    /// the reply to the original caller. Keys absent on the request are
    /// removed here so the copy is verbatim in both directions.
    pub fn copy_correlation_from(&mut self, request: &TransportMessage) {
        for key in keys::CORRELATION_KEYS {
            match request.property(key) {
                Some(value) => {
                    self.properties.insert(key.to_string(), value.clone());
                }
                None => {
                    self.properties.remove(key);
                }
            }
        }
    }
}
