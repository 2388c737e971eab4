//! # Actions
//!
//! The action flag table: every symbolic action code is bound to a distinct
//! power-of-two flag, and a permission bitmask is a sum of such flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};

/// Mapping from single-character action codes to disjoint power-of-two flags.
///
/// Entries are kept ordered by descending flag value, which is the order the
/// codec emits canonical strings in.
///
/// # Example
///
/// ```
/// use warden_rbac::actions::PermissionMap;
///
/// let map = PermissionMap::default();
/// assert_eq!(map.flag('r'), Some(2));
/// assert_eq!(map.sum_of_all_flags(), 15);
/// assert_eq!(map.codes_by_descending_flag(), vec!['d', 'u', 'r', 'c']);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>", into = "BTreeMap<String, i64>")]
pub struct PermissionMap {
    entries: Vec<(char, i64)>,
}

impl PermissionMap {
    /// Build a flag table, validating that every flag is a distinct positive
    /// power of two.
    ///
    /// # Arguments
    ///
    /// * `pairs` - `(action code, flag)` pairs in any order
    ///
    /// # Example
    ///
    /// ```
    /// use warden_rbac::actions::PermissionMap;
    ///
    /// let map = PermissionMap::new([('r', 1), ('w', 2), ('x', 4)]).unwrap();
    /// assert_eq!(map.sum_of_all_flags(), 7);
    ///
    /// assert!(PermissionMap::new([('r', 3)]).is_err());
    /// assert!(PermissionMap::new([('r', 2), ('w', 2)]).is_err());
    /// ```
    pub fn new<I>(pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (char, i64)>,
    {
        let mut entries: Vec<(char, i64)> = Vec::new();
        for (code, value) in pairs {
            if value <= 0 || value & (value - 1) != 0 {
                return Err(ConfigError::InvalidFlag { code, value });
            }
            if let Some(&(first, _)) = entries.iter().find(|(_, v)| *v == value) {
                return Err(ConfigError::DuplicateFlag {
                    first,
                    second: code,
                    value,
                });
            }
            // A repeated code keeps its last flag.
            entries.retain(|(c, _)| *c != code);
            entries.push((code, value));
        }
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(Self { entries })
    }

    /// The conventional create/read/update/delete table `{c:1, r:2, u:4, d:8}`.
    pub fn crud() -> Self {
        Self {
            entries: vec![('d', 8), ('u', 4), ('r', 2), ('c', 1)],
        }
    }

    /// Get the flag bound to an action code.
    pub fn flag(&self, code: char) -> Option<i64> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, v)| *v)
    }

    /// Check if an action code is configured.
    pub fn contains(&self, code: char) -> bool {
        self.flag(code).is_some()
    }

    /// Action codes ordered by descending flag value.
    pub fn codes_by_descending_flag(&self) -> Vec<char> {
        self.entries.iter().map(|(c, _)| *c).collect()
    }

    /// `(code, flag)` pairs ordered by descending flag value.
    pub fn entries(&self) -> &[(char, i64)] {
        &self.entries
    }

    /// Sum of every configured flag.
    ///
    /// This is the upper bound for valid absolute bitmask writes.
    pub fn sum_of_all_flags(&self) -> i64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Number of configured actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no actions are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PermissionMap {
    fn default() -> Self {
        Self::crud()
    }
}

impl TryFrom<BTreeMap<String, i64>> for PermissionMap {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, i64>) -> Result<Self, Self::Error> {
        let mut pairs = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(code), None) => pairs.push((code, value)),
                _ => return Err(ConfigError::InvalidActionCode(key)),
            }
        }
        Self::new(pairs)
    }
}

impl From<PermissionMap> for BTreeMap<String, i64> {
    fn from(map: PermissionMap) -> Self {
        map.entries
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .collect()
    }
}
