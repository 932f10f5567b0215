//! Body conversion between transport and engine-side representations
//!
//! Engine-side content processors work on structured forms (text, structured
//! documents, streamed chunks) while the transport layer ships raw byte
//! payloads. This crate holds the pluggable converters that move a body
//! between those representations, keyed by the exact ordered
//! `(source, target)` type pair; there is no inheritance-style fallback
//! matching.
//!
//! The registry is an explicit object built once at wiring time and passed by
//! handle into the bridge components; there is no ambient global lookup.

pub mod converters;
pub mod error;
pub mod registry;
pub mod value;

pub use converters::{
    BytesToPayload, ChunksToPayload, DocumentToPayload, PayloadToText, TextToPayload,
};
pub use error::ConvertError;
pub use registry::{BodyConverter, ConvertContext, ConverterRegistry};
pub use value::{BodyValue, TypeTag};
