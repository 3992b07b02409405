use blockspace_kernel::OrientationPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::HostError;

/// Host settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Applied to every entity the host places or loads.
    pub orientation_policy: OrientationPolicy,
    /// zstd level for region files.
    pub compression_level: i32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            orientation_policy: OrientationPolicy::Reject,
            compression_level: 3,
        }
    }
}

impl HostConfig {
    /// Parse a JSON config string.
    pub fn from_json_str(json: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reject_bad_orientation() {
        let config = HostConfig::default();
        assert_eq!(config.orientation_policy, OrientationPolicy::Reject);
        assert_eq!(config.compression_level, 3);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = HostConfig::from_json_str(r#"{ "orientation_policy": "ignore" }"#).unwrap();
        assert_eq!(config.orientation_policy, OrientationPolicy::Ignore);
        assert_eq!(config.compression_level, 3);
    }

    #[test]
    fn unknown_policy_is_error() {
        assert!(matches!(
            HostConfig::from_json_str(r#"{ "orientation_policy": "clamp" }"#),
            Err(HostError::Json(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{ "compression_level": 9 }"#).unwrap();
        let config = HostConfig::load(tmp.path()).unwrap();
        assert_eq!(config.compression_level, 9);
    }
}
