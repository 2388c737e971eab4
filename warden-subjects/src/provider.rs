//! Persistence providers
//!
//! Warden never stores subjects itself. Every write goes through a
//! [`PersistenceProvider`], which owns the record and its transaction
//! discipline. [`MemoryProvider`] is a map-backed implementation for
//! single-process use and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use warden_rbac::Subject;

use crate::changeset::Changeset;
use crate::error::ValidationResult;

/// Stores subjects.
#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    /// Apply exactly the fields in the changeset and return the stored record.
    ///
    /// Repeating an identical update must be safe.
    async fn update(&self, changeset: Changeset) -> ValidationResult<Subject>;
}

/// In-memory subject store.
///
/// Updates upsert: a changeset for an unknown subject inserts its desired
/// state.
///
/// # Example
///
/// ```
/// use warden_rbac::Subject;
/// use warden_subjects::changeset::{Changeset, SubjectChanges};
/// use warden_subjects::provider::{MemoryProvider, PersistenceProvider};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = MemoryProvider::new();
/// let subject = Subject::new();
/// let changes = SubjectChanges { superuser: Some(true), ..Default::default() };
///
/// let stored = provider.update(Changeset::new(subject.clone(), changes)).await.unwrap();
/// assert!(stored.is_superuser());
/// assert!(provider.get(subject.id).await.unwrap().is_superuser());
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemoryProvider {
    subjects: Arc<RwLock<HashMap<Uuid, Subject>>>,
}

impl std::fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProvider").finish_non_exhaustive()
    }
}

impl MemoryProvider {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, replacing any existing one with the same ID.
    pub async fn insert(&self, subject: Subject) {
        self.subjects.write().await.insert(subject.id, subject);
    }

    /// Load a record.
    pub async fn get(&self, id: Uuid) -> Option<Subject> {
        self.subjects.read().await.get(&id).cloned()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.subjects.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.subjects.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceProvider for MemoryProvider {
    async fn update(&self, changeset: Changeset) -> ValidationResult<Subject> {
        let mut subjects = self.subjects.write().await;

        // Changes land on the stored record, not on the caller's snapshot.
        let base = subjects
            .get(&changeset.subject.id)
            .cloned()
            .unwrap_or_else(|| changeset.subject.clone());
        let mut stored = Changeset::new(base, changeset.changes).apply();
        stored.updated_at = Some(Utc::now());

        subjects.insert(stored.id, stored.clone());
        tracing::debug!(subject_id = %stored.id, "Subject updated");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::SubjectChanges;

    #[tokio::test]
    async fn test_update_inserts_unknown_subject() {
        let provider = MemoryProvider::new();
        let subject = Subject::new();
        let stored = provider
            .update(Changeset::new(subject.clone(), SubjectChanges::default()))
            .await
            .unwrap();

        assert_eq!(stored.id, subject.id);
        assert!(stored.updated_at.is_some());
        assert_eq!(provider.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_applies_only_changed_fields() {
        let provider = MemoryProvider::new();
        let subject = Subject::new().with_permission("post", 2);
        provider.insert(subject.clone()).await;

        // stale snapshot: the stored permissions must survive a groups write
        let stale = Subject::with_id(subject.id);
        let changes = SubjectChanges {
            groups: Some(vec!["a".to_string()]),
            ..Default::default()
        };
        let stored = provider.update(Changeset::new(stale, changes)).await.unwrap();

        assert_eq!(stored.permission("post"), 2);
        assert_eq!(stored.groups, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_repeated_update_is_stable() {
        let provider = MemoryProvider::new();
        let subject = Subject::new();
        let changes = SubjectChanges {
            superuser: Some(true),
            ..Default::default()
        };

        let first = provider
            .update(Changeset::new(subject.clone(), changes.clone()))
            .await
            .unwrap();
        let second = provider
            .update(Changeset::new(subject, changes))
            .await
            .unwrap();

        assert_eq!(first.superuser, second.superuser);
        assert_eq!(first.groups, second.groups);
        assert_eq!(first.permissions, second.permissions);
        assert_eq!(provider.len().await, 1);
    }
}
