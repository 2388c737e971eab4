//! # Authorization Evaluator
//!
//! Answers "may this subject perform this action on this element?".
//!
//! ## Decision order
//!
//! ```text
//! subject absent            -> false
//! subject.superuser == true -> true   (no group logic runs)
//! otherwise:
//!     elevated = elevate(subject, group table)
//!     mask     = elevated.permissions[element] or 0
//!     symbolic = encode(mask)          (error if bits are unknown)
//!     symbolic contains requested action
//! ```
//!
//! The last step is a substring check against the canonical string, so the
//! requested action should be a single action code. Passing `"ur"` matches a
//! holder of `"dur"` but passing `"ru"` does not.

use std::collections::BTreeMap;

use crate::codec::ActionRef;
use crate::config::RbacConfig;
use crate::error::{RbacError, RbacResult};
use crate::groups::elevate;
use crate::subject::{Element, Subject};

/// Evaluates permissions against a configuration.
///
/// # Example
///
/// ```
/// use warden_rbac::{Authorizer, GroupPermissions, RbacConfig, Subject};
///
/// let config = RbacConfig::default()
///     .with_group_permissions(GroupPermissions::new().with_floor("editor", "post", 6));
/// let authorizer = Authorizer::new(&config);
///
/// let subject = Subject::new().with_groups(["editor"]).with_permission("post", 1);
/// assert!(authorizer.can(Some(&subject), 'r', "post").unwrap());
/// assert!(!authorizer.can(Some(&subject), 'c', "post").unwrap());
/// assert!(!authorizer.can(None, 'r', "post").unwrap());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Authorizer<'a> {
    config: &'a RbacConfig,
}

impl<'a> Authorizer<'a> {
    /// Create an evaluator over a configuration.
    pub fn new(config: &'a RbacConfig) -> Self {
        Self { config }
    }

    /// The configuration this evaluator reads.
    pub fn config(&self) -> &'a RbacConfig {
        self.config
    }

    /// Check if `subject` may perform `permission` on `element`.
    ///
    /// # Arguments
    ///
    /// * `subject` - The subject snapshot, or `None` when there is no subject
    /// * `permission` - A single action code
    /// * `element` - The element name
    ///
    /// # Returns
    ///
    /// `Ok(true)`/`Ok(false)` for a decision, or
    /// `Err(RbacError::NonRepresentableBitmask)` when the subject's effective
    /// bitmask holds bits the flag table does not define. That error is never
    /// folded into `false`.
    pub fn can<A, E>(&self, subject: Option<&Subject>, permission: A, element: E) -> RbacResult<bool>
    where
        A: ActionRef,
        E: Element,
    {
        let Some(subject) = subject else {
            return Ok(false);
        };
        let permission = permission.to_symbolic();
        let element = element.element_name();

        if subject.is_superuser() {
            tracing::debug!(
                subject_id = %subject.id,
                action = %permission,
                element = %element,
                "Superuser bypass"
            );
            return Ok(true);
        }

        let elevated = elevate(subject, &self.config.group_permissions);
        let mask = elevated.permission(&element);
        let symbolic = self.config.permission_map.encode(mask).map_err(|e| {
            tracing::warn!(
                subject_id = %subject.id,
                element = %element,
                mask = mask,
                "Effective bitmask is not representable"
            );
            e
        })?;

        let allowed = symbolic.contains(permission.as_str());
        tracing::debug!(
            subject_id = %subject.id,
            action = %permission,
            element = %element,
            held = %symbolic,
            allowed = allowed,
            "Permission evaluated"
        );
        Ok(allowed)
    }

    /// Like [`can`](Self::can), but a denial is an error.
    ///
    /// # Returns
    ///
    /// `Ok(())` when allowed, `Err(RbacError::Forbidden)` when denied (an
    /// absent subject included), or the codec error from `can`.
    pub fn authorize<A, E>(&self, subject: Option<&Subject>, permission: A, element: E) -> RbacResult<()>
    where
        A: ActionRef,
        E: Element,
    {
        let action = permission.to_symbolic();
        let element = element.element_name();
        if self.can(subject, action.as_str(), element.as_str())? {
            Ok(())
        } else {
            Err(RbacError::Forbidden { action, element })
        }
    }

    /// The permission map a check would see for this subject.
    ///
    /// Group floors are applied. A superuser holds every configured flag on
    /// every element named by their own permissions or their groups' floors.
    pub fn effective_permissions(&self, subject: &Subject) -> BTreeMap<String, i64> {
        let elevated = elevate(subject, &self.config.group_permissions);
        if !subject.is_superuser() {
            return elevated.permissions;
        }

        let all = self.config.permission_map.sum_of_all_flags();
        elevated
            .permissions
            .into_keys()
            .map(|element| (element, all))
            .collect()
    }

    /// Canonical symbolic form of the subject's effective bitmask on an element.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_rbac::{Authorizer, RbacConfig, Subject};
    ///
    /// let config = RbacConfig::default();
    /// let authorizer = Authorizer::new(&config);
    /// let subject = Subject::new().with_permission("post", 3);
    ///
    /// assert_eq!(authorizer.permissions_for(&subject, "post").unwrap(), "rc");
    /// assert_eq!(authorizer.permissions_for(&subject, "page").unwrap(), "");
    /// ```
    pub fn permissions_for<E: Element>(&self, subject: &Subject, element: E) -> RbacResult<String> {
        let map = &self.config.permission_map;
        if subject.is_superuser() {
            return map.encode(map.sum_of_all_flags());
        }
        let elevated = elevate(subject, &self.config.group_permissions);
        map.encode(elevated.permission(element))
    }
}
