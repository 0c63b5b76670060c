//! REST client for the FogBase naming service.
//!
//! This crate provides [`HttpNamingService`], an implementation of the
//! [`NamingService`](fogbase_naming::NamingService) and
//! [`NodeRegistry`](fogbase_naming::NodeRegistry) traits over the REST
//! interface a FogBase node exposes.
//!
//! # Quick Start
//!
//! ```no_run
//! use fogbase_naming::{ClientId, NamingService};
//! use fogbase_naming_http::{HttpNamingConfig, HttpNamingService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpNamingConfig::builder().base_url("http://localhost:8081").build()?;
//!     let service = HttpNamingService::new(config)?;
//!
//!     let keygroup = "smarthome/lights/floor1".parse()?;
//!     service.add_client(&keygroup, &ClientId::new("C1")).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Transport failures are reported as [`HttpNamingError`] internally and
//! surface through the traits as [`NamingError`](fogbase_naming::NamingError);
//! see [`error`] for the status mapping.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with [`MockNamingServer`](testutil::MockNamingServer),
//!   a local HTTP server backed by an in-memory naming service.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod wire;

pub use client::HttpNamingService;
pub use config::HttpNamingConfig;
pub use error::{HttpNamingError, Result};
