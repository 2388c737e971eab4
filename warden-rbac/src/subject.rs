//! Subject snapshots
//!
//! A [`Subject`] is an immutable snapshot of the authorized entity as loaded by
//! the persistence layer. This module also provides the permission store
//! accessor: element lookups that treat a missing entry as "no permissions".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A user-like record carrying superuser status, group memberships and
/// per-element permission bitmasks.
///
/// # Examples
///
/// ```
/// use warden_rbac::Subject;
///
/// let subject = Subject::new()
///     .with_groups(["editor"])
///     .with_permission("post", 3);
///
/// assert_eq!(subject.permission("post"), 3);
/// assert_eq!(subject.permission("comment"), 0);
/// assert!(!subject.is_superuser());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject ID
    pub id: Uuid,

    /// Superuser flag; `None` when the record has no such attribute
    #[serde(default)]
    pub superuser: Option<bool>,

    /// Group names, in stored order
    #[serde(default)]
    pub groups: Vec<String>,

    /// Element name to permission bitmask
    #[serde(default)]
    pub permissions: BTreeMap<String, i64>,

    /// Last time the persistence layer wrote this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subject {
    /// Creates a subject with a new UUID v7, `superuser: Some(false)`, no
    /// groups and no permissions.
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7())
    }

    /// Creates an empty subject with a known ID.
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            superuser: Some(false),
            groups: Vec::new(),
            permissions: BTreeMap::new(),
            updated_at: None,
        }
    }

    /// Set the superuser flag.
    pub fn with_superuser(mut self, superuser: bool) -> Self {
        self.superuser = Some(superuser);
        self
    }

    /// Replace the group list.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set the bitmask held on one element.
    pub fn with_permission(mut self, element: impl Element, mask: i64) -> Self {
        self.permissions.insert(element.element_name(), mask);
        self
    }

    /// Check if this subject bypasses all permission checks.
    pub fn is_superuser(&self) -> bool {
        self.superuser == Some(true)
    }

    /// Get the bitmask held on an element, or 0 when absent.
    ///
    /// # Arguments
    ///
    /// * `element` - The element name (strings, chars and integer ids are
    ///   normalized to the same string key)
    pub fn permission(&self, element: impl Element) -> i64 {
        self.permissions
            .get(&element.element_name())
            .copied()
            .unwrap_or(0)
    }

    /// Check direct membership in a single group.
    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that names an element.
///
/// Every accepted input shape is normalized to one string key before lookup,
/// so `"post"`, `String::from("post")` and a custom enum whose
/// `element_name` returns `"post"` address the same entry.
pub trait Element {
    /// The normalized element key.
    fn element_name(&self) -> String;
}

impl Element for str {
    fn element_name(&self) -> String {
        self.to_string()
    }
}

impl Element for String {
    fn element_name(&self) -> String {
        self.clone()
    }
}

impl Element for char {
    fn element_name(&self) -> String {
        self.to_string()
    }
}

macro_rules! integer_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                fn element_name(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_element!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<T: Element + ?Sized> Element for &T {
    fn element_name(&self) -> String {
        (**self).element_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_is_zero() {
        let subject = Subject::new();
        assert_eq!(subject.permission("post"), 0);
    }

    #[test]
    fn test_element_normalization() {
        let subject = Subject::new().with_permission("42", 4).with_permission('x', 1);
        assert_eq!(subject.permission(42u32), 4);
        assert_eq!(subject.permission(String::from("42")), 4);
        assert_eq!(subject.permission("x"), 1);
        assert_eq!(subject.permission(&String::from("x")), 1);
    }

    #[test]
    fn test_superuser_attribute() {
        assert!(!Subject::new().is_superuser());
        assert!(Subject::new().with_superuser(true).is_superuser());

        let bare = Subject {
            superuser: None,
            ..Subject::new()
        };
        assert!(!bare.is_superuser());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let id = Uuid::now_v7();
        let json = serde_json::json!({ "id": id, "groups": ["a"] });
        let subject: Subject = serde_json::from_value(json).unwrap();
        assert_eq!(subject.superuser, None);
        assert_eq!(subject.groups, vec!["a".to_string()]);
        assert!(subject.permissions.is_empty());
    }
}
