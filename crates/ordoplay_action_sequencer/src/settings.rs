// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime settings for action dispatch.
//!
//! Settings are stored as RON, e.g.:
//!
//! ```ron
//! ActionSettings(
//!     end_time_tolerance: 0.00001,
//!     scope_suffix: "Action",
//!     placeholder_marker_name: "Action Marker",
//!     log_filter: "info",
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "actions.ron";

/// Error loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid settings
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Tunables for registries, clip playables and logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSettings {
    /// Tolerance for "clip time equals clip duration"
    pub end_time_tolerance: f64,
    /// Suffix stripped from behaviour type names to form the default scope
    pub scope_suffix: String,
    /// Name given to freshly created markers; such markers are not offered as jump targets
    pub placeholder_marker_name: String,
    /// Log filter directive used by binaries
    pub log_filter: String,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            end_time_tolerance: 1e-5,
            scope_suffix: "Action".to_string(),
            placeholder_marker_name: "Action Marker".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ActionSettings {
    /// Parse settings from RON
    pub fn from_ron(s: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(s)?)
    }

    /// Serialize settings to RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::info!("Loaded action settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ActionSettings::default();
        assert_eq!(settings.scope_suffix, "Action");
        assert_eq!(settings.placeholder_marker_name, "Action Marker");
        assert!(settings.end_time_tolerance > 0.0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings = ActionSettings::from_ron("(scope_suffix: \"Behaviour\")").unwrap();
        assert_eq!(settings.scope_suffix, "Behaviour");
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_serialization() {
        let settings = ActionSettings {
            log_filter: "debug".into(),
            ..Default::default()
        };
        let loaded = ActionSettings::from_ron(&settings.to_ron().unwrap()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = Path::new("definitely/not/here/actions.ron");
        assert_eq!(ActionSettings::load(path).unwrap(), ActionSettings::default());
    }

    #[test]
    fn test_invalid_file_reports_parse_error() {
        assert!(matches!(
            ActionSettings::from_ron("(end_time_tolerance: \"soon\")"),
            Err(SettingsError::Parse(_))
        ));
    }
}
