//! Data layer for the estate brokerage portal.
//!
//! [`client::PortalClient`] wraps every backend endpoint in the same hook contract:
//! failures become a toast plus `None`, successes come back typed and mutations
//! invalidate the query cache. Local notification read state and UI preferences
//! live in [`storage`].

pub mod api;
pub mod cache;
pub mod calendar;
pub mod client;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod pagination;
pub mod socket;
pub mod storage;
pub mod telemetry;
pub mod toast;

pub use cache::{QueryCache, QueryKey};
pub use client::{HookError, MutationAck, PortalClient};
pub use config::PortalConfig;
pub use error::PortalError;
pub use toast::{Notifier, Toast, ToastLevel};
