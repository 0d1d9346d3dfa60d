//! Model lookup and metadata for the segmentation backends
//!
//! Models are never downloaded. A model is an ONNX file installed in the model
//! directory (`BGREMOVE_MODEL_DIR`, or `<user cache dir>/bgremove/models`),
//! optionally accompanied by a `<stem>.json` sidecar describing its input
//! preprocessing. Without a sidecar the U²-Net defaults apply.

use crate::config::RemovalConfig;
use crate::error::{BgRemovalError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the model directory
pub const MODEL_DIR_ENV: &str = "BGREMOVE_MODEL_DIR";

/// Input preprocessing parameters of a segmentation model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Model input size as `[width, height]`
    pub target_size: [u32; 2],
    /// Per-channel mean subtracted after scaling pixels to 0-1
    pub normalization_mean: [f32; 3],
    /// Per-channel standard deviation divided out after mean subtraction
    pub normalization_std: [f32; 3],
}

impl Default for PreprocessingConfig {
    /// U²-Net input: 320x320, `ImageNet` statistics
    fn default() -> Self {
        Self {
            target_size: [320, 320],
            normalization_mean: [0.485, 0.456, 0.406],
            normalization_std: [0.229, 0.224, 0.225],
        }
    }
}

impl PreprocessingConfig {
    /// Check that the parameters can produce a usable tensor
    ///
    /// # Errors
    /// - Zero-sized target dimensions
    /// - Non-positive or non-finite standard deviation
    pub fn validate(&self) -> Result<()> {
        let [width, height] = self.target_size;
        if width == 0 || height == 0 {
            return Err(BgRemovalError::config_value_error(
                "target size",
                format!("{width}x{height}"),
                "non-zero dimensions",
            ));
        }

        if let Some(value) = self
            .normalization_std
            .iter()
            .find(|value| !value.is_finite() || **value <= 0.0)
        {
            return Err(BgRemovalError::config_value_error(
                "normalization std",
                value,
                "finite values greater than zero",
            ));
        }

        Ok(())
    }

    /// Read a sidecar JSON file
    ///
    /// # Errors
    /// - Unreadable file
    /// - Malformed JSON or missing fields
    /// - Parameters rejected by [`PreprocessingConfig::validate`]
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| BgRemovalError::file_io_error("read preprocessing config", path, &e))?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            BgRemovalError::invalid_config(format!(
                "Failed to parse preprocessing config '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Model information and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub size_bytes: usize,
    pub input_shape: (usize, usize, usize, usize), // NCHW format
    pub output_shape: (usize, usize, usize, usize),
}

/// Resolves model files on disk
#[derive(Debug, Clone)]
pub struct ModelLocator {
    model_dir: PathBuf,
}

impl ModelLocator {
    /// Locator rooted at an explicit directory
    #[must_use]
    pub fn with_dir<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    /// Locator rooted at the configured or default model directory
    ///
    /// # Errors
    /// - No model directory configured and no user cache directory available
    pub fn from_config(config: &RemovalConfig) -> Result<Self> {
        match &config.model_dir {
            Some(dir) => Ok(Self::with_dir(dir)),
            None => Ok(Self::with_dir(Self::default_model_dir()?)),
        }
    }

    /// Default model directory
    ///
    /// - `$BGREMOVE_MODEL_DIR` when set and non-empty
    /// - Linux: `~/.cache/bgremove/models/`
    /// - macOS: `~/Library/Caches/bgremove/models/`
    /// - Windows: `%LOCALAPPDATA%/bgremove/models/`
    ///
    /// # Errors
    /// - The user cache directory cannot be determined
    pub fn default_model_dir() -> Result<PathBuf> {
        Self::model_dir_from(std::env::var_os(MODEL_DIR_ENV))
    }

    fn model_dir_from(override_dir: Option<OsString>) -> Result<PathBuf> {
        if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        Ok(dirs::cache_dir()
            .ok_or_else(|| {
                BgRemovalError::invalid_config(format!(
                    "Failed to determine cache directory. Set the {MODEL_DIR_ENV} environment variable."
                ))
            })?
            .join("bgremove")
            .join("models"))
    }

    /// Directory this locator searches
    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Path of the ONNX file for a model name
    #[must_use]
    pub fn model_file(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(format!("{model_name}.onnx"))
    }

    /// Sidecar preprocessing config for a model file
    #[must_use]
    pub fn sidecar_for(model_path: &Path) -> PathBuf {
        model_path.with_extension("json")
    }
}

/// A resolved, existing model file plus its preprocessing parameters
#[derive(Debug, Clone)]
pub struct ModelManager {
    model_path: PathBuf,
    preprocessing: PreprocessingConfig,
}

impl ModelManager {
    /// Resolve the model described by `config`
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Model file missing or not a regular file
    /// - Malformed sidecar preprocessing config
    pub fn from_config(config: &RemovalConfig) -> Result<Self> {
        config.validate()?;

        let model_path = match &config.model_path {
            Some(path) => path.clone(),
            None => {
                let locator = ModelLocator::from_config(config)?;
                tracing::debug!(
                    model_dir = %locator.model_dir().display(),
                    model = %config.model_name,
                    "Resolving model in model directory"
                );
                locator.model_file(&config.model_name)
            },
        };

        Self::from_path(model_path)
    }

    /// Use an explicit model file
    ///
    /// # Errors
    /// - Model file missing or not a regular file
    /// - Malformed sidecar preprocessing config
    pub fn from_path<P: Into<PathBuf>>(model_path: P) -> Result<Self> {
        let model_path = model_path.into();

        if !model_path.is_file() {
            let env_hint = format!("point {MODEL_DIR_ENV} at the directory containing it");
            return Err(BgRemovalError::model_error_with_context(
                "locate",
                &model_path,
                "file not found",
                &["install the ONNX model file at this path", env_hint.as_str()],
            ));
        }

        let sidecar = ModelLocator::sidecar_for(&model_path);
        let preprocessing = if sidecar.is_file() {
            tracing::debug!(sidecar = %sidecar.display(), "Using sidecar preprocessing config");
            PreprocessingConfig::from_json_file(&sidecar)?
        } else {
            PreprocessingConfig::default()
        };

        Ok(Self {
            model_path,
            preprocessing,
        })
    }

    /// Read the model file
    ///
    /// # Errors
    /// - File I/O errors when reading model data
    pub fn load_model(&self) -> Result<Vec<u8>> {
        fs::read(&self.model_path)
            .map_err(|e| BgRemovalError::file_io_error("read model file", &self.model_path, &e))
    }

    /// Model metadata derived from the file and its preprocessing config
    ///
    /// # Errors
    /// - Model file metadata unavailable
    pub fn get_info(&self) -> Result<ModelInfo> {
        let metadata = fs::metadata(&self.model_path)
            .map_err(|e| BgRemovalError::file_io_error("inspect model file", &self.model_path, &e))?;
        let [width, height] = self.preprocessing.target_size;

        Ok(ModelInfo {
            name: self
                .model_path
                .file_stem()
                .map_or_else(|| "unknown".to_string(), |s| s.to_string_lossy().into_owned()),
            size_bytes: usize::try_from(metadata.len()).unwrap_or(usize::MAX),
            input_shape: (1, 3, height as usize, width as usize),
            output_shape: (1, 1, height as usize, width as usize),
        })
    }

    /// Preprocessing parameters for this model
    #[must_use]
    pub fn get_preprocessing_config(&self) -> &PreprocessingConfig {
        &self.preprocessing
    }

    /// Path of the model file
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}
