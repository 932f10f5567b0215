//! Canonical property keys shared between the request and response paths
//!
//! The bridge and the transport layer agree on these names; they are part of
//! the wire contract, not implementation detail, so they live in one place.

/// Property holding the transport-level header map as a JSON object.
pub const TRANSPORT_HEADERS: &str = "transport.headers";

/// Property holding the backend's HTTP status code on a response message.
pub const HTTP_STATUS_CODE: &str = "transport.http.status";

/// Correlation: identity of the source handler that accepted the request.
pub const SRC_HANDLER: &str = "transport.correlation.src-handler";

/// Correlation: identity of the dispatch queue the request arrived on.
pub const DISPATCH_QUEUE: &str = "transport.correlation.dispatch-queue";

/// Correlation: identity of the originating channel context.
pub const CHANNEL_CONTEXT: &str = "transport.correlation.channel-context";

/// Backend routing: target host.
pub const HOST: &str = "transport.route.host";

/// Backend routing: target port.
pub const PORT: &str = "transport.route.port";

/// Backend routing: target path.
pub const TO: &str = "transport.route.to";

/// The three opaque handles that must survive request-to-response copy
/// verbatim. The transport layer needs them to route the final reply back to
/// the original caller.
pub const CORRELATION_KEYS: [&str; 3] = [SRC_HANDLER, DISPATCH_QUEUE, CHANNEL_CONTEXT];
