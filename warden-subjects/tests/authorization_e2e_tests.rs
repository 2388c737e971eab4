//! End-to-end tests for the Warden service.
//!
//! Subjects are written through `MemoryProvider` (or a failing provider) and
//! read back through `can`, exercising:
//! 1. superuser bypass and absent subjects
//! 2. group floor elevation (replace, not merge)
//! 3. AND-semantics membership checks
//! 4. additive, subtractive and absolute permission writes
//! 5. provider and validator failures surfacing unchanged

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warden_rbac::{GroupPermissions, PermissionMap, RbacConfig, RbacError, Subject};
use warden_subjects::{
    Changeset, Field, MemoryProvider, PersistenceProvider, RecordValidator, SchemaValidator,
    ValidationError, ValidationResult, Warden, WardenError,
};

/// Provider that refuses every write and counts attempts.
#[derive(Default)]
struct RejectingProvider {
    attempts: AtomicUsize,
}

#[async_trait]
impl PersistenceProvider for RejectingProvider {
    async fn update(&self, _changeset: Changeset) -> ValidationResult<Subject> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ValidationError::Rejected("read-only replica".to_string()))
    }
}

/// Validator that only lets group writes through.
struct GroupsOnlyValidator;

impl RecordValidator for GroupsOnlyValidator {
    fn build_changeset(
        &self,
        subject: &Subject,
        attrs: Map<String, Value>,
        _allowed: &[Field],
    ) -> ValidationResult<Changeset> {
        SchemaValidator.build_changeset(subject, attrs, &[Field::Groups])
    }
}

fn editor_config() -> RbacConfig {
    RbacConfig::default().with_group_permissions(
        GroupPermissions::new()
            .with_floor("editor", "post", 6)
            .with_floor("editor", "comment", 2),
    )
}

fn memory_warden(config: RbacConfig) -> (Warden, MemoryProvider) {
    let provider = MemoryProvider::new();
    let warden = Warden::new(config, Arc::new(provider.clone()));
    (warden, provider)
}

#[test]
fn test_superuser_can_do_anything() {
    let (warden, _) = memory_warden(editor_config());
    let root = Subject::new().with_superuser(true);

    for action in ["c", "r", "u", "d"] {
        for element in ["post", "comment", "never-configured"] {
            assert!(warden.can(Some(&root), action, element).unwrap());
        }
    }
}

#[test]
fn test_absent_subject_is_false_not_error() {
    let (warden, _) = memory_warden(editor_config());
    assert_eq!(warden.can(None, "r", "post"), Ok(false));
}

#[test]
fn test_group_floor_elevation_replaces_bits() {
    let (warden, _) = memory_warden(editor_config());
    let subject = Subject::new()
        .with_groups(["editor"])
        .with_permission("post", 1);

    assert_eq!(warden.effective_permissions(&subject).get("post"), Some(&6));
    assert!(warden.can(Some(&subject), "r", "post").unwrap());
    assert!(warden.can(Some(&subject), "u", "post").unwrap());
    // held c bit is discarded by the floor for the duration of the check
    assert!(!warden.can(Some(&subject), "c", "post").unwrap());

    // elevation also reached an element that was never asked about
    assert!(warden.can(Some(&subject), "r", "comment").unwrap());
    // and nothing of it was written back
    assert_eq!(subject.permission("post"), 1);
}

#[test]
fn test_membership_is_and_semantics() {
    let (warden, _) = memory_warden(RbacConfig::default());
    let subject = Subject::new().with_groups(["a", "b"]);

    assert!(!warden.is_member(&subject, ["a", "b", "c"]));
    assert!(warden.is_member(&subject, ["a", "b"]));
    assert!(warden.is_member(&subject, "b"));
}

#[test]
fn test_non_representable_bitmask_is_distinct_from_denial() {
    let (warden, _) = memory_warden(RbacConfig::default());
    let subject = Subject::new().with_permission("post", 16);

    let err = warden.can(Some(&subject), "r", "post").unwrap_err();
    assert_eq!(err, RbacError::NonRepresentableBitmask(16));
    assert!(!err.is_denial());

    let err = warden.authorize(Some(&subject), "r", "post").unwrap_err();
    assert!(!err.is_denial());
}

#[tokio::test]
async fn test_additive_write_is_arithmetic_sum() {
    let (warden, provider) = memory_warden(RbacConfig::default());
    let subject = Subject::new().with_permission("post", 2);
    provider.insert(subject.clone()).await;

    let stored = warden.set_permissions(&subject, "post", "+r").await.unwrap();
    assert_eq!(stored.permission("post"), 4);
    assert_eq!(provider.get(subject.id).await.unwrap().permission("post"), 4);

    // the doubled r bit turned into u
    assert!(!warden.can(Some(&stored), "r", "post").unwrap());
    assert!(warden.can(Some(&stored), "u", "post").unwrap());
}

#[tokio::test]
async fn test_absolute_write_out_of_range_is_rejected_before_persisting() {
    let provider = Arc::new(RejectingProvider::default());
    let warden = Warden::new(RbacConfig::default(), provider.clone());

    let err = warden
        .set_permissions(&Subject::new(), "post", 99)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WardenError::Rbac(RbacError::PermissionOutOfRange { value: 99, max: 15 })
    );
    assert_eq!(provider.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_custom_flag_table_bounds() {
    let map = PermissionMap::new([('r', 1), ('w', 2), ('x', 4), ('a', 8), ('s', 16)]).unwrap();
    let (warden, _) = memory_warden(RbacConfig::default().with_permission_map(map));

    let stored = warden.set_permissions(&Subject::new(), "repo", 31).await.unwrap();
    assert_eq!(warden.permissions_for(&stored, "repo").unwrap(), "saxwr");
    assert!(warden.set_permissions(&stored, "repo", 32).await.is_err());
}

#[tokio::test]
async fn test_group_lifecycle_changes_decisions() {
    let (warden, provider) = memory_warden(editor_config());
    let subject = Subject::new();
    provider.insert(subject.clone()).await;

    assert!(!warden.can(Some(&subject), "u", "post").unwrap());

    let subject = warden.add_group(&subject, ["editor", "alpha"]).await.unwrap();
    assert_eq!(subject.groups, vec!["alpha", "editor"]);
    assert!(warden.can(Some(&subject), "u", "post").unwrap());

    let subject = warden.remove_group(&subject, "editor").await.unwrap();
    assert_eq!(subject.groups, vec!["alpha"]);
    assert!(!warden.can(Some(&subject), "u", "post").unwrap());

    let stored = provider.get(subject.id).await.unwrap();
    assert_eq!(stored.groups, vec!["alpha"]);
}

#[tokio::test]
async fn test_superuser_toggle_round_trip() {
    let (warden, _) = memory_warden(RbacConfig::default());
    let subject = Subject::new();

    assert!(!warden.can(Some(&subject), "d", "post").unwrap());
    let subject = warden.set_superuser(&subject, true).await.unwrap();
    assert!(warden.can(Some(&subject), "d", "post").unwrap());
    let subject = warden.set_superuser(&subject, false).await.unwrap();
    assert!(!warden.can(Some(&subject), "d", "post").unwrap());
}

#[tokio::test]
async fn test_provider_failure_surfaces_verbatim_without_retry() {
    let provider = Arc::new(RejectingProvider::default());
    let warden = Warden::new(RbacConfig::default(), provider.clone());

    let err = warden.add_group(&Subject::new(), "editor").await.unwrap_err();
    assert_eq!(
        err,
        WardenError::Validation(ValidationError::Rejected("read-only replica".to_string()))
    );
    assert_eq!(provider.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validator_failure_surfaces_verbatim() {
    let (warden, provider) = memory_warden(RbacConfig::default());
    let warden = warden.with_validator(Arc::new(GroupsOnlyValidator));
    let subject = Subject::new();

    let err = warden.set_superuser(&subject, true).await.unwrap_err();
    assert_eq!(
        err,
        WardenError::Validation(ValidationError::FieldNotPermitted("superuser".to_string()))
    );
    assert!(provider.is_empty().await);

    assert!(warden.add_group(&subject, "a").await.is_ok());
}
