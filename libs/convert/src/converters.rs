//! Built-in converters registered by the wiring layer
//!
//! Four forward conversions produce a transport payload from an engine-side
//! form; the reverse conversion decodes a payload back to plain text.

use crate::{BodyConverter, BodyValue, ConvertContext, ConvertError, TypeTag};
use bytes::{Bytes, BytesMut};
use transport::TransportMessage;

/// Plain text to transport payload, as UTF-8 bytes.
///
/// Any input that is not plain text yields a null result rather than an
/// error, so a generic fallback chain keeps trying other converters.
pub struct TextToPayload;

impl BodyConverter for TextToPayload {
    fn convert(
        &self,
        value: &BodyValue,
        _context: &dyn ConvertContext,
    ) -> Result<Option<BodyValue>, ConvertError> {
        match value {
            BodyValue::Text(text) => Ok(Some(BodyValue::Payload(TransportMessage::new(
                Bytes::copy_from_slice(text.as_bytes()),
            )))),
            _ => Ok(None),
        }
    }
}

/// Detached byte buffer to transport payload.
pub struct BytesToPayload;

impl BodyConverter for BytesToPayload {
    fn convert(
        &self,
        value: &BodyValue,
        _context: &dyn ConvertContext,
    ) -> Result<Option<BodyValue>, ConvertError> {
        match value {
            BodyValue::Bytes(bytes) => {
                Ok(Some(BodyValue::Payload(TransportMessage::new(bytes.clone()))))
            }
            other => Err(ConvertError::type_mismatch(
                TypeTag::Bytes,
                other.type_tag(),
            )),
        }
    }
}

/// Structured document to transport payload, serialized compactly.
pub struct DocumentToPayload;

impl BodyConverter for DocumentToPayload {
    fn convert(
        &self,
        value: &BodyValue,
        _context: &dyn ConvertContext,
    ) -> Result<Option<BodyValue>, ConvertError> {
        match value {
            BodyValue::Document(doc) => {
                let bytes = serde_json::to_vec(doc)
                    .map_err(|e| ConvertError::Serialize(e.to_string()))?;
                Ok(Some(BodyValue::Payload(TransportMessage::new(bytes))))
            }
            other => Err(ConvertError::type_mismatch(
                TypeTag::Document,
                other.type_tag(),
            )),
        }
    }
}

/// Drained streaming source to transport payload, frames concatenated in
/// order.
pub struct ChunksToPayload;

impl BodyConverter for ChunksToPayload {
    fn convert(
        &self,
        value: &BodyValue,
        _context: &dyn ConvertContext,
    ) -> Result<Option<BodyValue>, ConvertError> {
        match value {
            BodyValue::Chunks(chunks) => {
                let mut buf = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
                for chunk in chunks {
                    buf.extend_from_slice(chunk);
                }
                Ok(Some(BodyValue::Payload(TransportMessage::new(buf.freeze()))))
            }
            other => Err(ConvertError::type_mismatch(
                TypeTag::Chunks,
                other.type_tag(),
            )),
        }
    }
}

/// Transport payload back to plain text; the payload must be valid UTF-8.
pub struct PayloadToText;

impl BodyConverter for PayloadToText {
    fn convert(
        &self,
        value: &BodyValue,
        _context: &dyn ConvertContext,
    ) -> Result<Option<BodyValue>, ConvertError> {
        match value {
            BodyValue::Payload(msg) => {
                let text = std::str::from_utf8(msg.payload())
                    .map_err(|e| ConvertError::InvalidUtf8(e.to_string()))?;
                Ok(Some(BodyValue::Text(text.to_string())))
            }
            other => Err(ConvertError::type_mismatch(
                TypeTag::Payload,
                other.type_tag(),
            )),
        }
    }
}
