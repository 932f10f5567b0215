use crate::{TransportError, TransportMessage};
use std::sync::Arc;

/// Completion callback for one submitted request.
///
/// The transport layer invokes `done` at most once, on whatever thread it
/// chooses, once the backend reply is known. `None` means the transport gave
/// up without a message (timeout, disconnect); what that means for the
/// exchange is the caller's decision, not the transport's.
pub trait ResponseCallback: Send + Sync {
    fn done(&self, response: Option<TransportMessage>);
}

/// The async send primitive, and the only operation the bridge invokes on
/// the transport layer.
///
/// Returns `true` when the caller must suspend the current unit of work
/// pending the callback, `false` when the call can be treated as already
/// complete. An `Err` means the message was never submitted and the callback
/// will not fire.
pub trait TransportSender: Send + Sync {
    fn send(
        &self,
        message: TransportMessage,
        callback: Arc<dyn ResponseCallback>,
    ) -> Result<bool, TransportError>;
}
