//! Operator configuration for tfboot
//!
//! The config file is a small YAML document living in the Terraform working
//! directory:
//!
//! ```yaml
//! name: demo
//! folderId: b1g0000000000000000
//! ```

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name looked up inside the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Validated provisioning inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningConfig {
    /// Prefix for every provisioned resource name
    #[serde(default)]
    pub name: String,

    /// Cloud folder the resources are created in
    #[serde(default)]
    pub folder_id: String,
}

impl ProvisioningConfig {
    pub fn new(name: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder_id: folder_id.into(),
        }
    }

    /// Read, parse and validate the config file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate YAML content
    pub fn parse(content: &str) -> Result<Self> {
        // An empty document is a valid mapping with every field missing
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field and report all problems together
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(r#""name" field in a config can't be empty"#.to_string());
        }
        if self.folder_id.trim().is_empty() {
            errors.push(r#""folderId" field in a config can't be empty"#.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_valid_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "name: demo\nfolderId: fld-1\n").unwrap();

        let config = ProvisioningConfig::load(&path).unwrap();
        assert_eq!(config, ProvisioningConfig::new("demo", "fld-1"));
    }

    #[test]
    fn test_missing_name() {
        let err = ProvisioningConfig::parse("folderId: fld-1\n").unwrap_err();
        assert_eq!(
            err.validation_messages(),
            [r#""name" field in a config can't be empty"#]
        );
    }

    #[test]
    fn test_missing_folder_id() {
        let err = ProvisioningConfig::parse("name: demo\n").unwrap_err();
        assert_eq!(
            err.validation_messages(),
            [r#""folderId" field in a config can't be empty"#]
        );
    }

    #[test]
    fn test_all_fields_reported_together() {
        let err = ProvisioningConfig::parse("name: \"\"\nfolderId: \"\"\n").unwrap_err();
        let messages = err.validation_messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains(r#""name""#));
        assert!(messages[1].contains(r#""folderId""#));

        let rendered = err.to_string();
        assert!(rendered.contains("name"));
        assert!(rendered.contains("folderId"));
    }

    #[test]
    fn test_empty_document_reports_both_fields() {
        let err = ProvisioningConfig::parse("").unwrap_err();
        assert_eq!(err.validation_messages().len(), 2);
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = ProvisioningConfig::parse("name: [unclosed\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.validation_messages().is_empty());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = ProvisioningConfig::load(temp_dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_whitespace_only_name_is_rejected() {
        let config = ProvisioningConfig::new("   ", "fld-1");
        assert!(config.validate().is_err());
    }
}
