use bytes::Bytes;
use serde::{Deserialize, Serialize};
use transport::TransportMessage;

/// Tag naming one body representation; ordered pairs of these key the
/// converter registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// The transport's byte-oriented form: a full [`TransportMessage`].
    Payload,
    /// Plain UTF-8 text.
    Text,
    /// A raw byte buffer detached from any message.
    Bytes,
    /// The engine's structured-document form.
    Document,
    /// A drained streaming/pull source, one frame per chunk.
    Chunks,
}

impl TypeTag {
    /// Human-readable name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Payload => "payload",
            TypeTag::Text => "text",
            TypeTag::Bytes => "bytes",
            TypeTag::Document => "document",
            TypeTag::Chunks => "chunks",
        }
    }
}

/// A message body in one of the representations the engine or transport
/// understands.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    Payload(TransportMessage),
    Text(String),
    Bytes(Bytes),
    Document(serde_json::Value),
    Chunks(Vec<Bytes>),
}

impl BodyValue {
    /// The tag describing this representation.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            BodyValue::Payload(_) => TypeTag::Payload,
            BodyValue::Text(_) => TypeTag::Text,
            BodyValue::Bytes(_) => TypeTag::Bytes,
            BodyValue::Document(_) => TypeTag::Document,
            BodyValue::Chunks(_) => TypeTag::Chunks,
        }
    }

    /// Borrow the transport message, if that is what this body holds.
    pub fn as_payload(&self) -> Option<&TransportMessage> {
        match self {
            BodyValue::Payload(msg) => Some(msg),
            _ => None,
        }
    }

    /// Borrow the text, if that is what this body holds.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BodyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Consume into a transport message, if that is what this body holds.
    pub fn into_payload(self) -> Option<TransportMessage> {
        match self {
            BodyValue::Payload(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_match_variants() {
        assert_eq!(
            BodyValue::Payload(TransportMessage::empty()).type_tag(),
            TypeTag::Payload
        );
        assert_eq!(BodyValue::Text(String::new()).type_tag(), TypeTag::Text);
        assert_eq!(BodyValue::Bytes(Bytes::new()).type_tag(), TypeTag::Bytes);
        assert_eq!(
            BodyValue::Document(serde_json::Value::Null).type_tag(),
            TypeTag::Document
        );
        assert_eq!(BodyValue::Chunks(Vec::new()).type_tag(), TypeTag::Chunks);
    }

    #[test]
    fn test_tag_serde_names() {
        assert_eq!(serde_json::to_string(&TypeTag::Payload).unwrap(), "\"payload\"");
        let tag: TypeTag = serde_json::from_str("\"document\"").unwrap();
        assert_eq!(tag, TypeTag::Document);
    }
}
