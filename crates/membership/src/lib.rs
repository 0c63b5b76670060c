//! Keygroup membership reconciliation for FogBase.
//!
//! A keygroup has three membership facets: authorized clients, replica
//! nodes (each with a lease) and trigger nodes. This crate brings a
//! keygroup's membership in line with a caller's request by applying only
//! the changes the naming service does not already reflect.
//!
//! # Flow
//!
//! ```text
//! add_members / remove_members
//!   │
//!   ├─ parse_keygroup_id     reject malformed ids before any call
//!   ├─ fetch_keygroup        one read of the authoritative configuration
//!   ├─ provision_keygroup    add only: create the keygroup if missing
//!   └─ reconcile ×3          clients → replica nodes → trigger nodes
//!        ├─ plan             skip members whose state already matches
//!        └─ apply            one add/delete call per remaining member
//! ```
//!
//! Only the first three steps can abort an operation. A failed call for one
//! member is recorded in the [`MembershipReport`] and the others proceed.
//!
//! # Quick Start
//!
//! ```
//! use fogbase_membership::{KeygroupMembership, MemberAdditions};
//! use fogbase_naming::{ClientConfig, ClientId, MemoryNamingService, NodeRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MemoryNamingService::new();
//!     service.create_client_config(&ClientConfig::new(ClientId::new("C1"))).await?;
//!
//!     let membership = KeygroupMembership::new(service);
//!     let additions = MemberAdditions::builder().clients(vec!["C1".into()]).build();
//!
//!     let first = membership.add_members("smarthome/lights/floor1", &additions).await?;
//!     assert_eq!(first.applied().count(), 1);
//!
//!     let second = membership.add_members("smarthome/lights/floor1", &additions).await?;
//!     assert_eq!(second.skipped().count(), 1);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod identifier;
pub mod member;
mod membership;
pub mod provision;
pub mod reconcile;
pub mod report;

pub use config::MembershipConfig;
pub use error::{MembershipError, Phase, Result};
pub use fetch::fetch_keygroup;
pub use identifier::parse_keygroup_id;
pub use member::{Direction, Member, MemberCategory};
pub use membership::{KeygroupMembership, MemberAdditions, MemberRemovals};
pub use provision::provision_keygroup;
pub use reconcile::{Action, plan, reconcile};
pub use report::{MemberOutcome, MemberStatus, MembershipReport};
