//! # Permission writes
//!
//! The value forms accepted when setting a subject's permission on an element,
//! and the arithmetic that turns each form into an absolute bitmask.

use crate::actions::PermissionMap;
use crate::error::{RbacError, RbacResult};

/// A requested permission write.
///
/// Strings convert by prefix:
/// - `"+rc"` grants: current value **plus** `decode("rc")`
/// - `"-r"` revokes: current value **minus** `decode("r")`
/// - anything else replaces: `decode(value)`
///
/// Grants and revokes are integer addition and subtraction, not bitwise
/// OR/AND-NOT. Granting an action that is already held adds its flag a second
/// time, and revoking one that is not held can go below zero; the bounds check
/// rejects the latter.
///
/// # Example
///
/// ```
/// use warden_rbac::{PermissionMap, PermissionValue};
///
/// let map = PermissionMap::default();
/// assert_eq!(PermissionValue::from("+r").resolve(1, &map).unwrap(), 3);
/// assert_eq!(PermissionValue::from("+r").resolve(2, &map).unwrap(), 4);
/// assert_eq!(PermissionValue::from("-c").resolve(3, &map).unwrap(), 2);
/// assert_eq!(PermissionValue::from("ud").resolve(3, &map).unwrap(), 12);
/// assert_eq!(PermissionValue::from(7).resolve(0, &map).unwrap(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionValue {
    /// An absolute bitmask
    Absolute(i64),
    /// Add the decoded actions to the current value
    Grant(String),
    /// Subtract the decoded actions from the current value
    Revoke(String),
    /// Replace the current value with the decoded actions
    Replace(String),
}

impl PermissionValue {
    /// Parse a symbolic write by its `+`/`-` prefix.
    pub fn parse(value: &str) -> Self {
        if let Some(rest) = value.strip_prefix('+') {
            PermissionValue::Grant(rest.to_string())
        } else if let Some(rest) = value.strip_prefix('-') {
            PermissionValue::Revoke(rest.to_string())
        } else {
            PermissionValue::Replace(value.to_string())
        }
    }

    /// Compute the absolute bitmask this write produces.
    ///
    /// The result is not bounds-checked; see [`PermissionMap::check_bounds`].
    ///
    /// # Arguments
    ///
    /// * `current` - The stored bitmask on the element (0 when absent)
    /// * `map` - The action flag table used to decode symbolic forms
    pub fn resolve(&self, current: i64, map: &PermissionMap) -> RbacResult<i64> {
        match self {
            PermissionValue::Absolute(value) => Ok(*value),
            PermissionValue::Grant(actions) => {
                let delta = map.decode(actions)?;
                current
                    .checked_add(delta)
                    .ok_or_else(|| out_of_range(current, map))
            }
            PermissionValue::Revoke(actions) => {
                let delta = map.decode(actions)?;
                current
                    .checked_sub(delta)
                    .ok_or_else(|| out_of_range(current, map))
            }
            PermissionValue::Replace(actions) => map.decode(actions),
        }
    }
}

// A stored value so far out of range that the arithmetic itself overflows.
fn out_of_range(current: i64, map: &PermissionMap) -> RbacError {
    RbacError::PermissionOutOfRange {
        value: current,
        max: map.sum_of_all_flags(),
    }
}

impl From<i64> for PermissionValue {
    fn from(value: i64) -> Self {
        PermissionValue::Absolute(value)
    }
}

impl From<i32> for PermissionValue {
    fn from(value: i32) -> Self {
        PermissionValue::Absolute(value.into())
    }
}

impl From<u32> for PermissionValue {
    fn from(value: u32) -> Self {
        PermissionValue::Absolute(value.into())
    }
}

impl From<&str> for PermissionValue {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for PermissionValue {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<char> for PermissionValue {
    fn from(value: char) -> Self {
        Self::parse(&value.to_string())
    }
}

impl PermissionMap {
    /// Validate an absolute bitmask write.
    ///
    /// # Returns
    ///
    /// The value when `0 <= value <= sum_of_all_flags()`, otherwise
    /// `Err(RbacError::PermissionOutOfRange)`.
    pub fn check_bounds(&self, value: i64) -> RbacResult<i64> {
        let max = self.sum_of_all_flags();
        if (0..=max).contains(&value) {
            Ok(value)
        } else {
            Err(RbacError::PermissionOutOfRange { value, max })
        }
    }
}
