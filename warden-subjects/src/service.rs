//! The Warden service
//!
//! [`Warden`] binds a configuration, a persistence provider and a record
//! validator into one value exposing every public operation. Read operations
//! delegate to [`Authorizer`]; write operations live in
//! [`membership`](crate::membership) and [`mutations`](crate::mutations).

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use warden_rbac::{
    is_member, ActionRef, Authorizer, Element, GroupSelector, RbacConfig, RbacResult, Subject,
};

use crate::changeset::{Field, RecordValidator, SchemaValidator};
use crate::error::WardenResult;
use crate::provider::PersistenceProvider;

/// Permission service for one integrating application.
///
/// Cloning is cheap; clones share the configuration, provider and validator.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_rbac::{GroupPermissions, RbacConfig, Subject};
/// use warden_subjects::{MemoryProvider, Warden};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = RbacConfig::default()
///     .with_group_permissions(GroupPermissions::new().with_floor("editor", "post", 6));
/// let warden = Warden::new(config, Arc::new(MemoryProvider::new()));
///
/// let alice = Subject::new();
/// assert!(!warden.can(Some(&alice), 'r', "post").unwrap());
///
/// let alice = warden.add_group(&alice, "editor").await.unwrap();
/// assert!(warden.can(Some(&alice), 'r', "post").unwrap());
///
/// let alice = warden.set_permissions(&alice, "comment", "+rc").await.unwrap();
/// assert_eq!(alice.permission("comment"), 3);
/// # }
/// ```
#[derive(Clone)]
pub struct Warden {
    config: Arc<RbacConfig>,
    provider: Arc<dyn PersistenceProvider>,
    validator: Arc<dyn RecordValidator>,
}

impl std::fmt::Debug for Warden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Warden {
    /// Create a service using the default [`SchemaValidator`].
    ///
    /// # Arguments
    ///
    /// * `config` - Flag table and group table, fixed for the service's life
    /// * `provider` - Where subject writes are persisted
    pub fn new(config: RbacConfig, provider: Arc<dyn PersistenceProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            validator: Arc::new(SchemaValidator),
        }
    }

    /// Replace the record validator.
    pub fn with_validator(mut self, validator: Arc<dyn RecordValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &RbacConfig {
        &self.config
    }

    /// An evaluator over this service's configuration.
    pub fn authorizer(&self) -> Authorizer<'_> {
        Authorizer::new(&self.config)
    }

    /// Check if `subject` may perform `permission` on `element`.
    ///
    /// See [`Authorizer::can`].
    pub fn can<A, E>(&self, subject: Option<&Subject>, permission: A, element: E) -> RbacResult<bool>
    where
        A: ActionRef,
        E: Element,
    {
        self.authorizer().can(subject, permission, element)
    }

    /// Like [`can`](Self::can), but a denial is `Err(RbacError::Forbidden)`.
    pub fn authorize<A, E>(&self, subject: Option<&Subject>, permission: A, element: E) -> RbacResult<()>
    where
        A: ActionRef,
        E: Element,
    {
        self.authorizer().authorize(subject, permission, element)
    }

    /// The permission map a check would see for this subject.
    pub fn effective_permissions(&self, subject: &Subject) -> BTreeMap<String, i64> {
        self.authorizer().effective_permissions(subject)
    }

    /// Canonical symbolic form of the subject's effective bitmask on an element.
    pub fn permissions_for<E: Element>(&self, subject: &Subject, element: E) -> RbacResult<String> {
        self.authorizer().permissions_for(subject, element)
    }

    /// Check group membership; a list requires every group.
    pub fn is_member(&self, subject: &Subject, groups: impl Into<GroupSelector>) -> bool {
        is_member(subject, groups)
    }

    /// Validate one field write and hand it to the provider.
    pub(crate) async fn persist(
        &self,
        subject: &Subject,
        field: Field,
        value: Value,
    ) -> WardenResult<Subject> {
        let mut attrs = Map::new();
        attrs.insert(field.as_str().to_string(), value);

        let changeset = self
            .validator
            .build_changeset(subject, attrs, &Field::ALL)
            .map_err(|e| {
                tracing::warn!(subject_id = %subject.id, field = field.as_str(), error = %e, "Changeset rejected");
                e
            })?;
        let stored = self.provider.update(changeset).await.map_err(|e| {
            tracing::warn!(subject_id = %subject.id, field = field.as_str(), error = %e, "Update failed");
            e
        })?;

        tracing::info!(subject_id = %stored.id, field = field.as_str(), "Subject updated");
        Ok(stored)
    }
}
