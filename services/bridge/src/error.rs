//! Error types for the bridge

use convert::ConvertError;
use thiserror::Error;
use transport::TransportError;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for bridge operations.
///
/// Cloneable so an error can live in an exchange's error slot while the
/// engine's failover logic inspects it. Nothing here is fatal to the process;
/// the worst outcome is an exchange completing with missing data.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// Declared endpoint address could not be resolved at construction.
    #[error("Invalid endpoint address '{address}': {reason}")]
    InvalidAddress {
        /// The address as declared.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The exchange's inbound message carries no transport payload to send.
    #[error("Inbound message has no transport payload")]
    MissingPayload,

    /// The transport layer failed while submitting the request.
    #[error("Transport send failed: {0}")]
    Send(#[from] TransportError),

    /// A body conversion failed or no converter was registered.
    #[error("Body conversion failed: {0}")]
    Convert(#[from] ConvertError),

    /// Configuration could not be parsed or validated.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Create an invalid address error.
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        BridgeError::Config(msg.into())
    }

    /// Whether the engine's failover logic may sensibly retry the exchange.
    pub fn is_recoverable(&self) -> bool {
        match self {
            BridgeError::Send(err) => err.is_recoverable(),
            BridgeError::MissingPayload | BridgeError::Convert(_) => false,
            BridgeError::InvalidAddress { .. } | BridgeError::Config(_) => false,
        }
    }
}
