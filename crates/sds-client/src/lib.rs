//! SDS client - Sequential Data Store facade
//!
//! Exposes the types, streams and stream views operations the stream type
//! change workflow consumes, behind the [`SdsClient`] trait:
//! - [`HttpSdsClient`] talks to a hosted tenant over HTTPS with OAuth2
//!   client-credentials authentication
//! - `InMemorySds` (feature `memory`) keeps a namespace in process for tests
//! - `MockSdsClient` (feature `mock`) is generated by mockall
//!
//! # Example
//!
//! ```rust,no_run
//! use sds_client::{ConnectionSettings, Credentials, HttpSdsClient, SdsClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpSdsClient::new(ConnectionSettings {
//!     resource: "https://uswe.datahub.connect.aveva.com".to_string(),
//!     api_version: "v1".to_string(),
//!     tenant_id: "tenant".to_string(),
//!     credentials: Credentials {
//!         client_id: "id".to_string(),
//!         client_secret: "secret".to_string(),
//!     },
//!     timeout: Duration::from_secs(30),
//! })?;
//!
//! let streams = client.list_streams("default", "pump*").await?;
//! println!("{} streams", streams.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
#[cfg(feature = "memory")]
pub mod memory;
pub mod models;

pub use auth::{Credentials, TokenProvider};
pub use client::SdsClient;
#[cfg(feature = "mock")]
pub use client::MockSdsClient;
pub use error::{ClientError, ResourceKind, Result};
pub use http::{ConnectionSettings, HttpSdsClient};
#[cfg(feature = "memory")]
pub use memory::{CallStats, InMemorySds, SearchQuery};
pub use models::{SdsStream, SdsStreamView, SdsStreamViewProperty, SdsType, SdsTypeCode, SdsTypeProperty};
