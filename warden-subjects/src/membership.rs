//! Group membership writes
//!
//! Adding and removing groups on a subject. Both operations compute the new
//! group list from the snapshot passed in and persist it with a single
//! provider update.

use serde_json::json;
use std::collections::HashSet;
use tracing::instrument;
use warden_rbac::{GroupSelector, Subject};

use crate::changeset::Field;
use crate::error::WardenResult;
use crate::service::Warden;

impl Warden {
    /// Add one or more groups.
    ///
    /// Names are appended left to right, then the whole list is deduplicated
    /// and sorted before it is persisted.
    ///
    /// # Returns
    ///
    /// The subject as stored by the provider.
    #[instrument(skip_all, fields(subject_id = %subject.id))]
    pub async fn add_group(
        &self,
        subject: &Subject,
        groups: impl Into<GroupSelector>,
    ) -> WardenResult<Subject> {
        let mut updated = subject.groups.clone();
        for group in groups.into().into_names() {
            updated.push(group);
        }
        updated.sort();
        updated.dedup();

        self.persist(subject, Field::Groups, json!(updated)).await
    }

    /// Remove one or more groups.
    ///
    /// Every occurrence of each name is removed. Names the subject does not
    /// hold are ignored; the (possibly unchanged) list is still persisted.
    /// Remaining names keep their order, and repeats already in the snapshot
    /// are collapsed to their first occurrence.
    #[instrument(skip_all, fields(subject_id = %subject.id))]
    pub async fn remove_group(
        &self,
        subject: &Subject,
        groups: impl Into<GroupSelector>,
    ) -> WardenResult<Subject> {
        let mut updated = subject.groups.clone();
        for group in groups.into().into_names() {
            updated.retain(|g| *g != group);
        }
        let mut seen = HashSet::new();
        updated.retain(|g| seen.insert(g.clone()));

        self.persist(subject, Field::Groups, json!(updated)).await
    }
}
