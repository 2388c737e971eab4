//! Changesets
//!
//! A changeset pairs a subject snapshot with the attribute changes requested
//! for it. Record validators build changesets from loosely typed attributes,
//! restricted to the three writable fields; persistence providers apply them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use warden_rbac::Subject;

use crate::error::{ValidationError, ValidationResult};

/// Writable subject fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The superuser flag
    Superuser,
    /// The group list
    Groups,
    /// The element to bitmask map
    Permissions,
}

impl Field {
    /// Every writable field.
    pub const ALL: [Field; 3] = [Field::Superuser, Field::Groups, Field::Permissions];

    /// Get the attribute name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Superuser => "superuser",
            Field::Groups => "groups",
            Field::Permissions => "permissions",
        }
    }

    /// Parse a field from its attribute name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "superuser" => Some(Field::Superuser),
            "groups" => Some(Field::Groups),
            "permissions" => Some(Field::Permissions),
            _ => None,
        }
    }
}

/// Requested field values; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectChanges {
    /// New superuser flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superuser: Option<bool>,

    /// New group list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,

    /// New permission map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, i64>>,
}

impl SubjectChanges {
    /// Check if no field is changed.
    pub fn is_empty(&self) -> bool {
        self.superuser.is_none() && self.groups.is_none() && self.permissions.is_none()
    }
}

/// A subject plus the changes to write to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
    /// The snapshot the changes were computed against
    pub subject: Subject,

    /// The field changes
    pub changes: SubjectChanges,
}

impl Changeset {
    /// Create a changeset.
    pub fn new(subject: Subject, changes: SubjectChanges) -> Self {
        Self { subject, changes }
    }

    /// The desired-state snapshot: the original subject with every change
    /// applied and nothing else touched.
    pub fn apply(&self) -> Subject {
        let mut subject = self.subject.clone();
        if let Some(superuser) = self.changes.superuser {
            subject.superuser = Some(superuser);
        }
        if let Some(ref groups) = self.changes.groups {
            subject.groups = groups.clone();
        }
        if let Some(ref permissions) = self.changes.permissions {
            subject.permissions = permissions.clone();
        }
        subject
    }
}

/// Builds changesets from raw attributes.
pub trait RecordValidator: Send + Sync {
    /// Build a changeset that writes only `allowed` fields.
    ///
    /// # Arguments
    ///
    /// * `subject` - The snapshot being changed
    /// * `attrs` - Attribute name to raw value
    /// * `allowed` - The fields that may be written
    fn build_changeset(
        &self,
        subject: &Subject,
        attrs: Map<String, Value>,
        allowed: &[Field],
    ) -> ValidationResult<Changeset>;
}

/// The default validator: strict field whitelist plus type checks.
///
/// Attributes outside `allowed` are rejected rather than dropped.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use warden_rbac::Subject;
/// use warden_subjects::changeset::{Field, RecordValidator, SchemaValidator};
///
/// let subject = Subject::new();
/// let attrs = json!({ "groups": ["editor"] }).as_object().unwrap().clone();
///
/// let changeset = SchemaValidator
///     .build_changeset(&subject, attrs, &Field::ALL)
///     .unwrap();
/// assert_eq!(changeset.apply().groups, vec!["editor".to_string()]);
///
/// let attrs = json!({ "email": "a@b.c" }).as_object().unwrap().clone();
/// assert!(SchemaValidator.build_changeset(&subject, attrs, &Field::ALL).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl RecordValidator for SchemaValidator {
    fn build_changeset(
        &self,
        subject: &Subject,
        attrs: Map<String, Value>,
        allowed: &[Field],
    ) -> ValidationResult<Changeset> {
        let mut changes = SubjectChanges::default();

        for (key, value) in attrs {
            let field = match Field::parse(&key) {
                Some(field) if allowed.contains(&field) => field,
                _ => return Err(ValidationError::FieldNotPermitted(key)),
            };

            match field {
                Field::Superuser => {
                    let superuser = value.as_bool().ok_or(ValidationError::InvalidType {
                        field: "superuser",
                        expected: "boolean",
                    })?;
                    changes.superuser = Some(superuser);
                }
                Field::Groups => {
                    let groups = serde_json::from_value(value).map_err(|_| {
                        ValidationError::InvalidType {
                            field: "groups",
                            expected: "array of strings",
                        }
                    })?;
                    changes.groups = Some(groups);
                }
                Field::Permissions => {
                    let permissions = serde_json::from_value(value).map_err(|_| {
                        ValidationError::InvalidType {
                            field: "permissions",
                            expected: "map of element to integer",
                        }
                    })?;
                    changes.permissions = Some(permissions);
                }
            }
        }

        Ok(Changeset::new(subject.clone(), changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_builds_all_fields() {
        let subject = Subject::new();
        let changeset = SchemaValidator
            .build_changeset(
                &subject,
                attrs(json!({
                    "superuser": true,
                    "groups": ["a", "b"],
                    "permissions": { "post": 3 }
                })),
                &Field::ALL,
            )
            .unwrap();

        let desired = changeset.apply();
        assert!(desired.is_superuser());
        assert_eq!(desired.groups, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(desired.permission("post"), 3);
        assert_eq!(desired.id, subject.id);
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = SchemaValidator
            .build_changeset(&Subject::new(), attrs(json!({ "name": "x" })), &Field::ALL)
            .unwrap_err();
        assert_eq!(err, ValidationError::FieldNotPermitted("name".to_string()));
    }

    #[test]
    fn test_rejects_field_outside_allowed_list() {
        let err = SchemaValidator
            .build_changeset(
                &Subject::new(),
                attrs(json!({ "superuser": true })),
                &[Field::Groups],
            )
            .unwrap_err();
        assert_eq!(err, ValidationError::FieldNotPermitted("superuser".to_string()));
    }

    #[test]
    fn test_rejects_wrong_types() {
        let subject = Subject::new();
        for bad in [
            json!({ "superuser": "yes" }),
            json!({ "groups": [1, 2] }),
            json!({ "permissions": { "post": "rc" } }),
        ] {
            let err = SchemaValidator
                .build_changeset(&subject, attrs(bad), &Field::ALL)
                .unwrap_err();
            assert!(matches!(err, ValidationError::InvalidType { .. }));
        }
    }

    #[test]
    fn test_apply_touches_only_changed_fields() {
        let subject = Subject::new()
            .with_groups(["a"])
            .with_permission("post", 2);
        let changeset = Changeset::new(
            subject.clone(),
            SubjectChanges {
                superuser: Some(true),
                ..Default::default()
            },
        );

        let desired = changeset.apply();
        assert_eq!(desired.groups, subject.groups);
        assert_eq!(desired.permissions, subject.permissions);
        assert!(desired.is_superuser());
        assert!(!changeset.changes.is_empty());
    }

    #[test]
    fn test_field_names() {
        for field in Field::ALL {
            assert_eq!(Field::parse(field.as_str()), Some(field));
        }
        assert_eq!(Field::parse("email"), None);
    }
}
