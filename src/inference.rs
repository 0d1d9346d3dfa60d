//! Inference backend abstraction

use crate::{config::RemovalConfig, error::Result, models::PreprocessingConfig};
use ndarray::Array4;
use std::time::Duration;

/// Trait for segmentation inference backends
///
/// A backend turns a normalized NCHW image tensor into a single-channel
/// foreground probability tensor.
pub trait InferenceBackend {
    /// Initialize the backend with the given configuration
    ///
    /// Returns the model loading time, or `None` when nothing was loaded.
    ///
    /// # Errors
    /// - Backend initialization failures
    /// - Model loading or validation errors
    fn initialize(&mut self, config: &RemovalConfig) -> Result<Option<Duration>>;

    /// Run inference on the input tensor
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Model inference failures
    /// - Unexpected output tensor layout
    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Preprocessing parameters the model expects
    ///
    /// # Errors
    /// - Backend not initialized
    fn get_preprocessing_config(&self) -> Result<PreprocessingConfig>;

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;
}
