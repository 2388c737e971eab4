//! # Warden RBAC
//!
//! The permission algebra behind Warden: symbolic action codes, integer
//! bitmasks, group floors and the `can` decision. Everything in this crate is
//! a synchronous, pure function of an immutable [`Subject`] snapshot and a
//! read-only [`RbacConfig`].
//!
//! ## Overview
//!
//! - **Actions**: a flag table binding action codes to disjoint powers of two
//! - **Codec**: `"rc"` ⇄ `3` conversion in canonical (highest flag first) order
//! - **Subjects**: superuser flag, groups, and element → bitmask snapshots
//! - **Groups**: per-group floor bitmasks and the elevation pass
//! - **Evaluator**: superuser bypass, elevation and the containment check
//! - **Permissions**: absolute, additive and subtractive write values
//!
//! ## Usage
//!
//! ```rust
//! use warden_rbac::{Authorizer, GroupPermissions, RbacConfig, Subject};
//!
//! let config = RbacConfig::default().with_group_permissions(
//!     GroupPermissions::new().with_floor("editor", "post", 6),
//! );
//! let authorizer = Authorizer::new(&config);
//!
//! let alice = Subject::new().with_groups(["editor"]);
//! assert!(authorizer.can(Some(&alice), 'u', "post").unwrap());
//! assert!(!authorizer.can(Some(&alice), 'd', "post").unwrap());
//!
//! assert_eq!(config.permission_map.encode(6).unwrap(), "ur");
//! assert_eq!(config.permission_map.decode("ru").unwrap(), 6);
//! ```
//!
//! Persistence, group membership writes and permission mutations live in the
//! `warden-subjects` crate.

pub mod actions;
pub mod codec;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod groups;
pub mod permissions;
pub mod subject;

// Re-export main types for convenience
pub use actions::PermissionMap;
pub use codec::ActionRef;
pub use config::RbacConfig;
pub use error::{ConfigError, ConfigResult, RbacError, RbacResult};
pub use evaluator::Authorizer;
pub use groups::{elevate, is_member, upgrade_to_group, FloorMap, GroupPermissions, GroupSelector};
pub use permissions::PermissionValue;
pub use subject::{Element, Subject};
