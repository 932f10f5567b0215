/// Context attached to send failures to aid debugging.
#[derive(Debug, Clone, Default)]
pub struct SendContext {
    /// Size of the message payload in bytes.
    pub message_size: usize,
    /// Target endpoint, if known.
    pub target: Option<String>,
}

impl SendContext {
    pub fn new(message_size: usize) -> Self {
        Self {
            message_size,
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Errors raised by a [`crate::TransportSender`] while submitting a message.
///
/// These describe submission failures only; a backend that never answers is
/// not an error here but an absent response delivered to the callback.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Send failed: {error} (size: {size}B, target: {target:?})",
            size = context.message_size,
            target = context.target)]
    SendFailed { error: String, context: SendContext },

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Transport closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(String),
}

impl TransportError {
    /// Create a send failed error with context.
    pub fn send_failed_with_context(msg: impl Into<String>, context: SendContext) -> Self {
        TransportError::SendFailed {
            error: msg.into(),
            context,
        }
    }

    /// Create a send failed error with minimal context.
    pub fn send_failed(msg: impl Into<String>) -> Self {
        TransportError::SendFailed {
            error: msg.into(),
            context: SendContext::default(),
        }
    }

    /// Create a connection lost error.
    pub fn connection_lost(msg: impl Into<String>) -> Self {
        TransportError::ConnectionLost(msg.into())
    }

    /// Check if this error is worth a retry at a higher layer.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectionLost(_) | TransportError::SendFailed { .. }
        )
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(TransportError::send_failed("boom").is_recoverable());
        assert!(TransportError::connection_lost("gone").is_recoverable());
        assert!(!TransportError::Closed.is_recoverable());
    }

    #[test]
    fn test_send_context_in_display() {
        let err = TransportError::send_failed_with_context(
            "refused",
            SendContext::new(42).with_target("payload-svc:80"),
        );
        let text = err.to_string();
        assert!(text.contains("refused"));
        assert!(text.contains("42"));
        assert!(text.contains("payload-svc"));
    }
}
