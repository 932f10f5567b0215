//! Transport message model and the async send seam
//!
//! The transport layer delivers and accepts addressable, header-bearing byte
//! payloads. Sending is callback-based: [`TransportSender::send`] hands the
//! message off together with a [`ResponseCallback`] that the transport layer
//! invokes at most once, on a thread of its own choosing, when the backend
//! reply (or the lack of one) is known. The boolean returned by `send` tells
//! the caller whether it must suspend awaiting that callback.
//!
//! Nothing in this crate performs I/O; concrete transports implement
//! [`TransportSender`] behind the trait.

pub mod error;
pub mod keys;
pub mod message;
pub mod sender;
pub mod test_utils;

pub use error::{SendContext, TransportError};
pub use message::TransportMessage;
pub use sender::{ResponseCallback, TransportSender};
