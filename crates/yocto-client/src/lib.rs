//! # yocto-client
//!
//! Client for the Yoctoprint printer host API.
//!
//! This crate provides:
//! - [`ServerAddress`] - Where the host lives; derives the API and console URLs
//! - [`ApiClient`] - `fetch_api` / `send_api_cmd` plus typed printer commands
//! - [`StatusPoller`] - Self-refreshing status value with subscriptions
//! - [`RefreshHandle`] - Lets commands trigger an immediate status refresh
//!
//! ## Example
//!
//! ```no_run
//! use yocto_client::{ApiClient, PollerConfig, ServerAddress, StatusPoller};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ApiClient::new(ServerAddress::new("localhost"));
//!     let poller = StatusPoller::new(client, PollerConfig::default());
//!
//!     let mut updates = poller.subscribe();
//!     while let Some(status) = updates.next().await {
//!         println!("{status}");
//!     }
//! }
//! ```

pub mod address;
pub mod api;
pub mod error;
pub mod poller;

// Re-export main types
pub use address::{API_PORT, ServerAddress};
pub use api::{ApiClient, parse_method};
pub use error::{ClientError, Result};
pub use poller::{PollerConfig, RefreshHandle, StatusPoller, StatusSource, StatusSubscription};

// Commands hand back the raw HTTP response
pub use reqwest::Response;
