//! Runtime configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config.
//! Environment variables override values loaded from a file.

use std::fs;
use std::path::{Path, PathBuf};

use agrismart_core::{FieldError, SoilField, UploadedImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides `upload.dir`.
pub const ENV_UPLOAD_DIR: &str = "AGRISMART_UPLOAD_DIR";

/// Overrides `forecast.seed`.
pub const ENV_FORECAST_SEED: &str = "AGRISMART_FORECAST_SEED";

/// 16 MiB, the largest upload accepted by default.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Upload handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploads are written to. Must exist before requests arrive.
    pub dir: PathBuf,

    /// Largest accepted upload, in bytes
    pub max_bytes: u64,

    /// Accepted filename extensions, lowercase
    pub allowed_extensions: Vec<String>,

    /// Keep stored uploads after classification (audit/debug)
    pub retain: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: vec!["jpeg".to_string(), "jpg".to_string(), "png".to_string()],
            retain: true,
        }
    }
}

impl UploadConfig {
    /// Check an upload against the extension and size limits.
    pub fn check(&self, image: &UploadedImage) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let allowed = image
            .extension()
            .is_some_and(|ext| self.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)));
        if !allowed {
            errors.push(FieldError::new(SoilField::Image, "Images only!"));
        }

        if image.bytes.len() as u64 > self.max_bytes {
            errors.push(FieldError::new(
                SoilField::Image,
                format!("Image exceeds {} bytes", self.max_bytes),
            ));
        }

        errors
    }
}

/// Mock forecast settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Seed for the mock generator; unseeded when absent
    pub seed: Option<u64>,
}

/// Configuration for the advice runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub upload: UploadConfig,
    pub forecast: ForecastConfig,
}

impl RuntimeConfig {
    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = if yaml.trim().is_empty() {
            RuntimeConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = lookup(ENV_UPLOAD_DIR).filter(|d| !d.trim().is_empty()) {
            self.upload.dir = PathBuf::from(dir);
        }

        if let Some(seed) = lookup(ENV_FORECAST_SEED) {
            let seed = seed.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} must be an unsigned integer, got '{}'",
                    ENV_FORECAST_SEED, seed
                ))
            })?;
            self.forecast.seed = Some(seed);
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("upload.dir must not be empty".to_string()));
        }

        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Invalid(
                "upload.max_bytes must be greater than zero".to_string(),
            ));
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "upload.allowed_extensions must list at least one extension".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.upload.dir, PathBuf::from("uploads"));
        assert_eq!(config.upload.max_bytes, 16 * 1024 * 1024);
        assert_eq!(config.upload.allowed_extensions, vec!["jpeg", "jpg", "png"]);
        assert!(config.upload.retain);
        assert_eq!(config.forecast.seed, None);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(RuntimeConfig::from_yaml("").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = RuntimeConfig::from_yaml(
            r#"
upload:
  dir: /var/lib/agrismart/uploads
  retain: false
forecast:
  seed: 42
"#,
        )
        .unwrap();

        assert_eq!(config.upload.dir, PathBuf::from("/var/lib/agrismart/uploads"));
        assert!(!config.upload.retain);
        assert_eq!(config.upload.max_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.forecast.seed, Some(42));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            RuntimeConfig::from_yaml("upload:\n  max_bytes: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_yaml("upload:\n  allowed_extensions: []\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RuntimeConfig::default();
        config
            .apply_env(|key| match key {
                ENV_UPLOAD_DIR => Some("/tmp/uploads".to_string()),
                ENV_FORECAST_SEED => Some(" 7 ".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.upload.dir, PathBuf::from("/tmp/uploads"));
        assert_eq!(config.forecast.seed, Some(7));
    }

    #[test]
    fn test_bad_seed_env_rejected() {
        let mut config = RuntimeConfig::default();
        let result = config.apply_env(|key| (key == ENV_FORECAST_SEED).then(|| "soon".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("agrismart.yaml");
        fs::write(&path, "upload:\n  dir: shared/uploads\n").unwrap();

        let config = RuntimeConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.upload.dir, PathBuf::from("shared/uploads"));
    }

    #[test]
    fn test_upload_check() {
        let upload = UploadConfig {
            max_bytes: 4,
            ..UploadConfig::default()
        };

        assert!(upload.check(&UploadedImage::new("leaf.PNG", vec![0; 4])).is_empty());

        let errors = upload.check(&UploadedImage::new("leaf.gif", vec![0; 5]));
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["Images only!", "Image exceeds 4 bytes"]);
        assert!(errors.iter().all(|e| e.field == SoilField::Image));
    }
}
