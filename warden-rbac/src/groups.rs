//! # Groups
//!
//! Static group permission floors and the elevation pass that applies them to
//! a subject snapshot before evaluation.
//!
//! ## Elevation
//!
//! ```text
//! for group in subject.groups (stored order):
//!     if group has floors:
//!         for (element, floor) in floors:
//!             if permissions[element] >= floor: keep
//!             else:                             permissions[element] = floor
//! ```
//!
//! A floor replaces the held bitmask instead of merging with it. A subject
//! holding `c` (1) on `post` in a group with floor `ur` (6) ends up with
//! exactly `ur`: the `c` bit is gone for the duration of the check. Every
//! element the group names is updated, not only the one being queried.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::subject::{Element, Subject};

/// Element name to floor bitmask for one group.
pub type FloorMap = BTreeMap<String, i64>;

/// Group name to per-element floors.
///
/// # Example
///
/// ```
/// use warden_rbac::GroupPermissions;
///
/// let groups = GroupPermissions::new()
///     .with_floor("editor", "post", 6)
///     .with_floor("editor", "comment", 2);
///
/// assert_eq!(groups.floors("editor").unwrap().get("post"), Some(&6));
/// assert!(groups.floors("viewer").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, FloorMap>",
    into = "BTreeMap<String, FloorMap>"
)]
pub struct GroupPermissions {
    groups: BTreeMap<String, FloorMap>,
}

impl GroupPermissions {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the floor a group grants on an element.
    pub fn with_floor(
        mut self,
        group: impl Into<String>,
        element: impl Element,
        floor: i64,
    ) -> Self {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(element.element_name(), floor);
        self
    }

    /// Get the floors configured for a group.
    pub fn floors(&self, group: &str) -> Option<&FloorMap> {
        self.groups.get(group)
    }

    /// Names of every configured group.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of configured groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no groups are configured.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl TryFrom<BTreeMap<String, FloorMap>> for GroupPermissions {
    type Error = ConfigError;

    fn try_from(groups: BTreeMap<String, FloorMap>) -> Result<Self, Self::Error> {
        for (group, floors) in &groups {
            if let Some((element, &value)) = floors.iter().find(|(_, v)| **v < 0) {
                return Err(ConfigError::InvalidFloor {
                    group: group.clone(),
                    element: element.clone(),
                    value,
                });
            }
        }
        Ok(Self { groups })
    }
}

impl From<GroupPermissions> for BTreeMap<String, FloorMap> {
    fn from(table: GroupPermissions) -> Self {
        table.groups
    }
}

/// One group name or a list of them.
///
/// Every public group operation accepts `impl Into<GroupSelector>`; strings,
/// slices, vectors, arrays and integer identifiers all convert, the latter
/// through their decimal string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelector {
    /// A single group name
    Single(String),
    /// Several group names, processed left to right
    Many(Vec<String>),
}

impl GroupSelector {
    /// The selected names in order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            GroupSelector::Single(name) => vec![name.as_str()],
            GroupSelector::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Consume the selector into its names.
    pub fn into_names(self) -> Vec<String> {
        match self {
            GroupSelector::Single(name) => vec![name],
            GroupSelector::Many(names) => names,
        }
    }
}

impl From<&str> for GroupSelector {
    fn from(name: &str) -> Self {
        GroupSelector::Single(name.to_string())
    }
}

impl From<String> for GroupSelector {
    fn from(name: String) -> Self {
        GroupSelector::Single(name)
    }
}

impl From<&String> for GroupSelector {
    fn from(name: &String) -> Self {
        GroupSelector::Single(name.clone())
    }
}

impl From<Vec<String>> for GroupSelector {
    fn from(names: Vec<String>) -> Self {
        GroupSelector::Many(names)
    }
}

impl From<Vec<&str>> for GroupSelector {
    fn from(names: Vec<&str>) -> Self {
        GroupSelector::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for GroupSelector {
    fn from(names: &[&str]) -> Self {
        GroupSelector::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<&[String]> for GroupSelector {
    fn from(names: &[String]) -> Self {
        GroupSelector::Many(names.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for GroupSelector {
    fn from(names: [&str; N]) -> Self {
        GroupSelector::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

macro_rules! integer_group {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for GroupSelector {
                fn from(id: $ty) -> Self {
                    GroupSelector::Single(id.to_string())
                }
            }

            impl From<Vec<$ty>> for GroupSelector {
                fn from(ids: Vec<$ty>) -> Self {
                    GroupSelector::Many(ids.iter().map(|id| id.to_string()).collect())
                }
            }
        )*
    };
}

integer_group!(u32, u64, i32, i64, usize);

/// Check group membership.
///
/// A single name checks direct membership. A list requires the subject to be
/// in **every** listed group; an empty list is trivially satisfied.
///
/// # Example
///
/// ```
/// use warden_rbac::{groups::is_member, Subject};
///
/// let subject = Subject::new().with_groups(["a", "b"]);
/// assert!(is_member(&subject, "a"));
/// assert!(is_member(&subject, ["a", "b"]));
/// assert!(!is_member(&subject, ["a", "b", "c"]));
/// ```
pub fn is_member(subject: &Subject, groups: impl Into<GroupSelector>) -> bool {
    match groups.into() {
        GroupSelector::Single(name) => subject.has_group(&name),
        GroupSelector::Many(names) => names.iter().all(|name| subject.has_group(name)),
    }
}

/// Raise a permission map to a group's floors.
///
/// Entries already at or above their floor (integer comparison) are kept;
/// every other named element is set to the floor, replacing whatever bits it
/// held.
pub fn upgrade_to_group(mut permissions: FloorMap, floors: &FloorMap) -> FloorMap {
    for (element, &floor) in floors {
        match permissions.get(element) {
            Some(&held) if held >= floor => {}
            _ => {
                permissions.insert(element.clone(), floor);
            }
        }
    }
    permissions
}

/// Produce a transient snapshot with every group floor applied.
///
/// Groups are folded in the subject's stored order. The result is never
/// persisted.
pub fn elevate(subject: &Subject, table: &GroupPermissions) -> Subject {
    let permissions = subject
        .groups
        .iter()
        .fold(subject.permissions.clone(), |permissions, group| {
            match table.floors(group) {
                Some(floors) if subject.has_group(group) => {
                    upgrade_to_group(permissions, floors)
                }
                _ => permissions,
            }
        });

    Subject {
        permissions,
        ..subject.clone()
    }
}
