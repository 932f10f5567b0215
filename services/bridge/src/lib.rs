//! Exchange bridge between a mediation engine and an async transport layer
//!
//! The bridge lets a store-and-forward mediation engine drive
//! request/response exchanges over a callback-based transport without
//! blocking a transport thread. Four parts cooperate:
//!
//! - [`ExchangeFactory`] materializes an engine-native [`Exchange`] from an
//!   inbound transport message and seeds its headers.
//! - [`OutboundProducer`] rewrites the request's routing headers to the
//!   resolved [`BackendTarget`] and submits it to the transport layer,
//!   reporting whether the engine must suspend the exchange.
//! - [`ResponseCorrelator`] is the completion callback: it correlates the
//!   eventual backend reply to the original exchange, preserves the
//!   correlation identity, and resumes the engine's [`Continuation`] exactly
//!   once on every path.
//! - The converter registry (from the `convert` crate) translates bodies
//!   between transport and engine representations at both boundaries.
//!
//! The bridge owns no routing logic, no retries, no connection pooling, and
//! no timeouts. If the transport layer never completes a request the exchange
//! stays suspended until the engine's own timeout policy intervenes. The only
//! state shared across exchanges is the immutable backend target; everything
//! per-exchange lives on the [`Exchange`] handle that is moved into the
//! correlator.

pub mod config;
pub mod correlator;
pub mod endpoint;
pub mod error;
pub mod exchange;
pub mod factory;
pub mod producer;
pub mod wiring;

pub use config::BridgeConfig;
pub use correlator::ResponseCorrelator;
pub use endpoint::BackendTarget;
pub use error::{BridgeError, Result};
pub use exchange::{
    Continuation, ContinuationHandle, EngineMessage, Exchange, RESPONSE_STATUS,
};
pub use factory::ExchangeFactory;
pub use producer::OutboundProducer;
pub use wiring::{standard_registry, Bridge};
