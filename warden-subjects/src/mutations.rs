//! Permission and superuser writes
//!
//! These write straight through the provider; group floors play no part.

use serde_json::json;
use tracing::instrument;
use warden_rbac::{Element, PermissionValue, RbacError, Subject};

use crate::changeset::Field;
use crate::error::WardenResult;
use crate::service::Warden;

impl Warden {
    /// Set the subject's bitmask on an element.
    ///
    /// `value` may be an absolute bitmask, a symbolic replacement (`"rc"`), a
    /// grant (`"+u"`) or a revoke (`"-d"`); see [`PermissionValue`]. Every form
    /// is resolved to an integer and must land in `0..=sum_of_all_flags()`.
    ///
    /// # Errors
    ///
    /// - `RbacError::UnknownAction` when a symbolic form holds an unknown code
    /// - `RbacError::PermissionOutOfRange` when the result is out of bounds
    /// - whatever the validator or provider reports, unchanged
    #[instrument(skip_all, fields(subject_id = %subject.id))]
    pub async fn set_permissions(
        &self,
        subject: &Subject,
        element: impl Element,
        value: impl Into<PermissionValue>,
    ) -> WardenResult<Subject> {
        let element = element.element_name();
        let map = &self.config().permission_map;

        let value = value
            .into()
            .resolve(subject.permission(&element), map)
            .and_then(|v| map.check_bounds(v))
            .map_err(|e| {
                tracing::warn!(element = %element, error = %e, "Permission write rejected");
                e
            })?;

        let mut permissions = subject.permissions.clone();
        permissions.insert(element, value);

        self.persist(subject, Field::Permissions, json!(permissions))
            .await
    }

    /// Set the superuser flag.
    ///
    /// The subject record must already carry a superuser attribute.
    #[instrument(skip_all, fields(subject_id = %subject.id, superuser = superuser))]
    pub async fn set_superuser(&self, subject: &Subject, superuser: bool) -> WardenResult<Subject> {
        if subject.superuser.is_none() {
            return Err(RbacError::MissingAttribute("superuser").into());
        }

        self.persist(subject, Field::Superuser, json!(superuser)).await
    }
}
