//! Bukload HTTP client
//!
//! Talks to the Bukload travel-planning backend: attaches the stored access
//! token to every request, recovers from expired tokens with a single
//! coordinated refresh, and decodes the `{success, data, message}` envelope
//! into typed results.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod types;
pub mod validation;

pub use client::{
    ApiOutcome, ApiResponse, BukloadClient, BukloadClientBuilder, ClientError, Credentials,
    FileTokenStore, MemoryTokenStore, RequestOptions, TokenStore,
};
pub use config::ClientConfig;
