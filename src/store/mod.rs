//! Hosted email store access.
//!
//! Emails are fetched through a server-side proxy that holds the store
//! credentials; this crate only ever sees the proxy URL and an optional
//! bearer token taken from the environment.

pub mod client;
pub mod inbox;

pub use client::{EmailStoreClient, StoreConfig};
pub use inbox::*;

use thiserror::Error;

/// Errors raised while querying the email store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email store URL is not configured")]
    NotConfigured,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to email store at {0}")]
    Connect(String),

    #[error("email store error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode email store response: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}
