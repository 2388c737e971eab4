//! # Warden Subjects
//!
//! The write side of Warden: changesets, persistence providers, group
//! membership and permission mutations, bound together by the [`Warden`]
//! service.
//!
//! ## Overview
//!
//! - **Changesets**: whitelisted, type-checked attribute writes
//! - **Providers**: the pluggable store behind every write
//! - **Membership**: add/remove groups (sorted, deduplicated on add)
//! - **Mutations**: absolute, additive and subtractive permission writes,
//!   superuser toggling
//!
//! ## Architecture
//!
//! ```text
//! can / authorize          -> warden_rbac::Authorizer (pure, no I/O)
//! add_group / remove_group -> RecordValidator -> PersistenceProvider
//! set_permissions          -> PermissionValue -> bounds -> RecordValidator -> PersistenceProvider
//! set_superuser            -> RecordValidator -> PersistenceProvider
//! ```
//!
//! Each write issues one changeset build and one provider update. Failures
//! are returned as-is; nothing is retried.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warden_rbac::{RbacConfig, Subject};
//! use warden_subjects::{MemoryProvider, Warden};
//!
//! # async fn run() -> Result<(), warden_subjects::WardenError> {
//! let warden = Warden::new(RbacConfig::from_env(), Arc::new(MemoryProvider::new()));
//!
//! let subject = Subject::new();
//! let subject = warden.set_permissions(&subject, "post", "rc").await?;
//! let subject = warden.add_group(&subject, ["editor", "reviewer"]).await?;
//!
//! if warden.can(Some(&subject), 'r', "post")? {
//!     // ...
//! }
//! # Ok(())
//! # }
//! ```

pub mod changeset;
pub mod error;
pub mod membership;
pub mod mutations;
pub mod provider;
pub mod service;

// Re-export main types
pub use changeset::{Changeset, Field, RecordValidator, SchemaValidator, SubjectChanges};
pub use error::{ValidationError, ValidationResult, WardenError, WardenResult};
pub use provider::{MemoryProvider, PersistenceProvider};
pub use service::Warden;
