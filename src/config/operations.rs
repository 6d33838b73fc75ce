//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::StoreBackend;
use crate::error::{JoblockError, Result};
use crate::key::DeriverRegistry;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the joblock.yaml file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(JoblockError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            JoblockError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path` if the file exists, defaults otherwise.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| JoblockError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            JoblockError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `namespace` must be non-empty
    /// - `lock_stale_minutes` must be positive
    /// - `store.dir` must be non-empty for the file backend
    /// - a job override cannot set both `constant` and `key_args`
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(JoblockError::UserError(
                "config validation failed: namespace must not be empty".to_string(),
            ));
        }

        if self.lock_stale_minutes == 0 {
            return Err(JoblockError::UserError(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        if self.store.backend == StoreBackend::File && self.store.dir.trim().is_empty() {
            return Err(JoblockError::UserError(
                "config validation failed: store.dir must not be empty for the file backend"
                    .to_string(),
            ));
        }

        for (job_type, key_config) in &self.jobs {
            if key_config.constant && key_config.key_args.is_some() {
                return Err(JoblockError::UserError(format!(
                    "config validation failed: job '{}' sets both `constant` and `key_args`; pick one",
                    job_type
                )));
            }
        }

        Ok(())
    }

    /// Key derivers for this config: the namespace default plus every job override.
    pub fn deriver_registry(&self) -> DeriverRegistry {
        let mut registry = DeriverRegistry::new(self.namespace.as_str());
        for (job_type, key_config) in &self.jobs {
            key_config.apply(job_type, &mut registry);
        }
        registry
    }
}
