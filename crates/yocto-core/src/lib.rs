//! # yocto-core
//!
//! Core types, errors, and logging for the Yoctoprint client.
//!
//! This crate provides:
//! - [`YoctoError`] - Errors for configuration, logging and filesystem access
//! - [`logging`] - Tracing setup and log directory helpers
//! - [`status`] - [`StatusSnapshot`], the host status as seen by the client
//! - [`types`] - Bodies of the host's command endpoints
//!
//! ## Example
//!
//! ```no_run
//! use yocto_core::{StatusSnapshot, logging};
//!
//! fn main() -> yocto_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let status = StatusSnapshot::default_status();
//!     tracing::info!(%status, "initial status");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod status;
pub mod types;

// Re-export main types for convenience
pub use error::{Result, YoctoError};
pub use logging::{LogGuard, init_logging};
pub use status::StatusSnapshot;
pub use types::{GcodeFileList, RelativeMove};
