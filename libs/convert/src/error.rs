use crate::TypeTag;

/// Errors raised by the converter registry and its converters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConvertError {
    /// No converter registered for the ordered pair. Distinct outcome, not a
    /// crash; the caller decides whether a missing conversion matters.
    #[error("No converter registered for {} -> {}", from.name(), target.name())]
    NoConverter { from: TypeTag, target: TypeTag },

    /// Registration attempted for a pair that already has a converter; the
    /// registry holds at most one per ordered pair.
    #[error("Converter already registered for {} -> {}", from.name(), target.name())]
    DuplicateConverter { from: TypeTag, target: TypeTag },

    /// The input value was not in the representation the converter declares
    /// as its input form.
    #[error("Expected {} input, got {}", expected.name(), actual.name())]
    TypeMismatch { expected: TypeTag, actual: TypeTag },

    /// Payload bytes were not valid UTF-8.
    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Structured document could not be serialized.
    #[error("Document serialization failed: {0}")]
    Serialize(String),
}

impl ConvertError {
    pub fn no_converter(from: TypeTag, target: TypeTag) -> Self {
        ConvertError::NoConverter { from, target }
    }

    pub fn type_mismatch(expected: TypeTag, actual: TypeTag) -> Self {
        ConvertError::TypeMismatch { expected, actual }
    }
}
