//! HTTP plumbing shared by every hook: request description, transport seam and
//! the backend's error envelope.

pub mod envelope;
pub mod request;
pub mod transport;

pub use envelope::{ErrorEnvelope, StatusClass};
pub use request::{ApiRequest, Method};
pub use transport::{ApiResponse, ReqwestTransport, Transport, TransportError};
