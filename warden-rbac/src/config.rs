//! Process-wide permission configuration.
//!
//! Holds the action flag table and the group permission table. Both are
//! loaded once at startup and treated as read-only for the life of the
//! process. Configuration can be built in code, parsed from JSON, or read from
//! environment variables with defaults suitable for a CRUD application.

use serde::{Deserialize, Serialize};

use crate::actions::PermissionMap;
use crate::error::{ConfigError, ConfigResult};
use crate::groups::GroupPermissions;

/// Environment variable holding the action flag table as a JSON object.
pub const PERMISSION_MAP_ENV: &str = "WARDEN_PERMISSION_MAP";

/// Environment variable holding the group permission table as a JSON object.
pub const GROUP_PERMISSIONS_ENV: &str = "WARDEN_GROUP_PERMISSIONS";

/// Permission configuration for an integrating application.
///
/// # Example
///
/// ```
/// use warden_rbac::RbacConfig;
///
/// let config = RbacConfig::from_json(
///     r#"{ "group_permissions": { "editor": { "post": 6 } } }"#,
/// ).unwrap();
///
/// // the flag table falls back to {c:1, r:2, u:4, d:8}
/// assert_eq!(config.permission_map.sum_of_all_flags(), 15);
/// assert!(config.group_permissions.floors("editor").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Action code to flag table.
    #[serde(default)]
    pub permission_map: PermissionMap,

    /// Group name to per-element floors.
    #[serde(default)]
    pub group_permissions: GroupPermissions,
}

impl RbacConfig {
    /// Create a configuration from explicit tables.
    pub fn new(permission_map: PermissionMap, group_permissions: GroupPermissions) -> Self {
        Self {
            permission_map,
            group_permissions,
        }
    }

    /// Replace the group permission table.
    pub fn with_group_permissions(mut self, group_permissions: GroupPermissions) -> Self {
        self.group_permissions = group_permissions;
        self
    }

    /// Replace the action flag table.
    pub fn with_permission_map(mut self, permission_map: PermissionMap) -> Self {
        self.permission_map = permission_map;
        self
    }

    /// Parse a configuration document.
    ///
    /// Both keys are optional and fall back to their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            key: "config".to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `WARDEN_PERMISSION_MAP`: flag table JSON (default: `{"c":1,"r":2,"u":4,"d":8}`)
    /// - `WARDEN_GROUP_PERMISSIONS`: group table JSON (default: `{}`)
    ///
    /// Values that fail to parse are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from environment variables, surfacing parse errors.
    pub fn try_from_env() -> ConfigResult<Self> {
        Self::try_from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            permission_map: parse_or_default(PERMISSION_MAP_ENV, &lookup, default.permission_map),
            group_permissions: parse_or_default(
                GROUP_PERMISSIONS_ENV,
                &lookup,
                default.group_permissions,
            ),
        }
    }

    fn try_from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Ok(Self {
            permission_map: match lookup(PERMISSION_MAP_ENV) {
                Some(raw) => parse_var(PERMISSION_MAP_ENV, &raw)?,
                None => default.permission_map,
            },
            group_permissions: match lookup(GROUP_PERMISSIONS_ENV) {
                Some(raw) => parse_var(GROUP_PERMISSIONS_ENV, &raw)?,
                None => default.group_permissions,
            },
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> ConfigResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_str(raw).map_err(|e| ConfigError::Parse {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_or_default<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: for<'de> Deserialize<'de>,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_var(key, &raw).unwrap_or_else(|e| {
            tracing::warn!(key = key, error = %e, "Ignoring invalid configuration value");
            default
        }),
        None => default,
    }
}
