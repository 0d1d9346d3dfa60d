//! Configuration types for background removal operations

use crate::error::{BgRemovalError, Result};
use std::path::PathBuf;

/// Name of the model looked up in the model directory when none is configured
pub const DEFAULT_MODEL_NAME: &str = "u2net";

/// Configuration for the model-backed background remover
///
/// None of these settings are exposed on the command line; the CLI always
/// runs with [`RemovalConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalConfig {
    /// Model name, resolved to `<model_dir>/<model_name>.onnx`
    pub model_name: String,

    /// Directory holding installed models (`None` = default model directory)
    pub model_dir: Option<PathBuf>,

    /// Explicit model file, bypassing directory lookup entirely
    pub model_path: Option<PathBuf>,

    /// RGB color used to pad the letterboxed model input
    pub padding_color: [u8; 3],
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_dir: None,
            model_path: None,
            padding_color: [255, 255, 255],
        }
    }
}

impl RemovalConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use bgremove::RemovalConfig;
    ///
    /// let config = RemovalConfig::builder()
    ///     .model_dir("/opt/models")
    ///     .model_name("u2netp")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.model_name, "u2netp");
    /// ```
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    /// - Empty model name
    /// - Model name containing path separators (use `model_path` instead)
    pub fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(BgRemovalError::config_value_error(
                "model name",
                "<empty>",
                "a non-empty file stem such as 'u2net'",
            ));
        }

        if self.model_name.contains(['/', '\\']) {
            return Err(BgRemovalError::config_value_error(
                "model name",
                &self.model_name,
                "a bare file stem; set model_path for explicit paths",
            ));
        }

        Ok(())
    }
}

/// Builder for `RemovalConfig`
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    config: RemovalConfig,
}

impl RemovalConfigBuilder {
    /// Set the model name
    #[must_use]
    pub fn model_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.model_name = name.into();
        self
    }

    /// Set the directory models are looked up in
    #[must_use]
    pub fn model_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.model_dir = Some(dir.into());
        self
    }

    /// Use an explicit model file
    #[must_use]
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.model_path = Some(path.into());
        self
    }

    /// Set the letterbox padding color
    #[must_use]
    pub fn padding_color(mut self, color: [u8; 3]) -> Self {
        self.config.padding_color = color;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Validation failures, see [`RemovalConfig::validate`]
    pub fn build(self) -> Result<RemovalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
