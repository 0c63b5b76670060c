//! Client-side model of the FogBase naming service.
//!
//! The naming service is the authority on keygroups: which clients may use a
//! keygroup, which nodes replicate its data and which nodes are notified of
//! changes. This crate defines the vocabulary for talking to it, the
//! [`NamingService`] abstraction, and an in-memory implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  fogbase-membership                         │
//! │       (keygroup membership reconciliation)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  fogbase-naming                             │
//! │          NamingService / NodeRegistry traits                │
//! │   (get, create, add/delete client, add/delete node)         │
//! ├─────────────────────────┬───────────────────────────────────┤
//! │  MemoryNamingService    │   HttpNamingService               │
//! │      (testing)          │  (in `fogbase-naming-http`)       │
//! └─────────────────────────┴───────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use fogbase_naming::{
//!     ClientConfig, ClientId, EncryptionAlgorithm, KeygroupConfig, KeygroupId,
//!     MemoryNamingService, NamingService, NodeRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MemoryNamingService::new();
//!     service.create_client_config(&ClientConfig::new(ClientId::new("C1"))).await?;
//!
//!     let id: KeygroupId = "smarthome/lights/floor1".parse()?;
//!     service
//!         .create_keygroup(&KeygroupConfig::new(id.clone(), "secret", EncryptionAlgorithm::Aes))
//!         .await?;
//!     service.add_client(&id, &ClientId::new("C1")).await?;
//!
//!     let config = service.get_keygroup_config(&id).await?;
//!     assert!(config.is_some_and(|c| c.contains_client(&ClientId::new("C1"))));
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with fixtures, a failure-injecting service
//!   wrapper and assertion macros. Enable this in `[dev-dependencies]` for integration tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod model;
pub mod service;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;
pub mod types;

// Re-export primary types at crate root for convenience
pub use error::{BoxError, NamingError, NamingResult};
pub use memory::{MemoryNamingService, NamingCall};
pub use model::{ClientConfig, KeygroupConfig, NodeConfig, ReplicaNodeConfig, TriggerNodeConfig};
pub use service::{NamingService, NodeRegistry};
pub use types::{
    ClientId, EncryptionAlgorithm, KEYGROUP_SEPARATOR, KeygroupId, KeygroupIdError, NodeId,
    TimeToLive, UNBOUNDED_TTL,
};
