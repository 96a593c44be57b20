// Agent runtime modules
//
// This module hosts the event pipeline between the logical agents:
// the connection registry, the router that advances each incident
// through its stages, and the report prompt.

pub mod errors;
pub mod prompts;
pub mod registry;
pub mod router;

// Re-export main types
pub use errors::{RouterError, RouterResult};
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
pub use router::EventRouter;
