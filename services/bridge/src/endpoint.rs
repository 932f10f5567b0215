//! Backend target resolution from the declared endpoint address

use crate::BridgeError;
use url::Url;

/// Fallback when neither the address nor the scheme supplies a port.
const DEFAULT_PORT: u16 = 80;

/// Resolved backend location, derived once from the declared endpoint
/// address and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl BackendTarget {
    /// Resolve an address of the form `scheme://host[:port]/path`.
    ///
    /// A missing port defaults to the scheme's standard port (80 for the
    /// HTTP case). Malformed addresses and addresses without a host are
    /// rejected with a typed error so callers can abort startup instead of
    /// carrying an unusable producer.
    pub fn resolve(address: &str) -> Result<Self, BridgeError> {
        let url = Url::parse(address)
            .map_err(|e| BridgeError::invalid_address(address, e.to_string()))?;

        let host = url
            .host_str()
            .ok_or_else(|| BridgeError::invalid_address(address, "missing host"))?
            .to_string();

        let port = url.port_or_known_default().unwrap_or(DEFAULT_PORT);

        Ok(Self {
            host,
            port,
            path: url.path().to_string(),
        })
    }

    /// `host:port` form for the transport-level `Host` header.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}{}", self.host, self.port, self.path)
    }
}
