//! TOML-based bridge configuration

use crate::endpoint::BackendTarget;
use crate::BridgeError;
use convert::TypeTag;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one bridge instance.
///
/// ```toml
/// endpoint = "http://payload-svc/api/orders"
/// inbound_form = "text"
/// response_form = "text"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Declared backend endpoint address, `scheme://host[:port]/path`.
    pub endpoint: String,

    /// Body form the exchange factory materializes for inbound messages.
    /// Defaults to raw payload form.
    pub inbound_form: Option<TypeTag>,

    /// Body form the response correlator attaches for backend responses.
    /// Defaults to raw payload form.
    pub response_form: Option<TypeTag>,
}

impl BridgeConfig {
    /// Create from TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, BridgeError> {
        toml::from_str(toml_str)
            .map_err(|e| BridgeError::config(format!("Failed to parse TOML: {}", e)))
    }

    /// Create from file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BridgeError::config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Validate the configuration; resolves the endpoint so a malformed
    /// address fails at startup rather than on the first exchange.
    pub fn validate(&self) -> Result<(), BridgeError> {
        BackendTarget::resolve(&self.endpoint)?;
        Ok(())
    }

    /// Inbound body form, defaulted.
    pub fn inbound_form(&self) -> TypeTag {
        self.inbound_form.unwrap_or(TypeTag::Payload)
    }

    /// Response body form, defaulted.
    pub fn response_form(&self) -> TypeTag {
        self.response_form.unwrap_or(TypeTag::Payload)
    }
}
