//! # Permission Codec
//!
//! Conversion between symbolic permission strings (`"rc"`, `"dur"`) and
//! integer bitmasks, driven by a [`PermissionMap`].

use crate::actions::PermissionMap;
use crate::error::{RbacError, RbacResult};

impl PermissionMap {
    /// Decode a symbolic permission string into a bitmask.
    ///
    /// Each character is an action code; duplicates count once.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_rbac::actions::PermissionMap;
    ///
    /// let map = PermissionMap::default();
    /// assert_eq!(map.decode("rc").unwrap(), 3);
    /// assert_eq!(map.decode("rrr").unwrap(), 2);
    /// assert_eq!(map.decode("").unwrap(), 0);
    /// assert!(map.decode("rx").is_err());
    /// ```
    pub fn decode(&self, symbolic: &str) -> RbacResult<i64> {
        let mut seen: Vec<char> = Vec::with_capacity(symbolic.len());
        let mut mask = 0;
        for code in symbolic.chars() {
            if seen.contains(&code) {
                continue;
            }
            seen.push(code);
            mask += self.flag(code).ok_or(RbacError::UnknownAction(code))?;
        }
        Ok(mask)
    }

    /// Encode a bitmask into its canonical symbolic string.
    ///
    /// Codes are emitted highest flag first. Any remainder that the configured
    /// flags cannot account for is an error rather than silently dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_rbac::actions::PermissionMap;
    ///
    /// let map = PermissionMap::default();
    /// assert_eq!(map.encode(3).unwrap(), "rc");
    /// assert_eq!(map.encode(15).unwrap(), "durc");
    /// assert_eq!(map.encode(0).unwrap(), "");
    /// assert!(map.encode(16).is_err());
    /// ```
    pub fn encode(&self, mask: i64) -> RbacResult<String> {
        let mut remaining = mask;
        let mut symbolic = String::with_capacity(self.len());
        for &(code, flag) in self.entries() {
            if remaining >= flag {
                remaining -= flag;
                symbolic.push(code);
            }
        }
        if remaining == 0 {
            Ok(symbolic)
        } else {
            Err(RbacError::NonRepresentableBitmask(mask))
        }
    }

    /// Rewrite a symbolic string into canonical order with duplicates removed.
    pub fn canonicalize(&self, symbolic: &str) -> RbacResult<String> {
        self.encode(self.decode(symbolic)?)
    }
}

/// A requested action, normalized to its symbolic string form.
///
/// Implemented for single action codes (`char`) and for strings, so callers can
/// write `can(subject, 'r', "post")` or `can(subject, "r", "post")`.
pub trait ActionRef {
    /// The symbolic form used for the containment check.
    fn to_symbolic(&self) -> String;
}

impl ActionRef for char {
    fn to_symbolic(&self) -> String {
        self.to_string()
    }
}

impl ActionRef for str {
    fn to_symbolic(&self) -> String {
        self.to_string()
    }
}

impl ActionRef for String {
    fn to_symbolic(&self) -> String {
        self.clone()
    }
}

impl<T: ActionRef + ?Sized> ActionRef for &T {
    fn to_symbolic(&self) -> String {
        (**self).to_symbolic()
    }
}
