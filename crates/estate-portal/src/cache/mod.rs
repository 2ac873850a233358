//! Query cache owned by the application context and injected into the client.

mod key;
mod store;

pub use key::{KeyPart, QueryKey};
pub use store::{QueryCache, DEFAULT_MAX_ENTRIES};
