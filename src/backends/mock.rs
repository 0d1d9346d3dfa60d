//! Mock backend implementation for testing

use crate::config::RemovalConfig;
use crate::error::{BgRemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::PreprocessingConfig;
use ndarray::Array4;
use std::time::Duration;

/// Model-free backend predicting a centered elliptical foreground
///
/// Useful for exercising the full pipeline without model files: the
/// ellipse spans 80% of the model input in each direction, so the center of
/// any image stays opaque and its corners become transparent.
#[derive(Debug)]
pub struct MockBackend {
    preprocessing: PreprocessingConfig,
    initialized: bool,
    inference_count: usize,
    failure: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend with a 64x64 model input
    #[must_use]
    pub fn new() -> Self {
        Self::with_preprocessing(PreprocessingConfig {
            target_size: [64, 64],
            ..PreprocessingConfig::default()
        })
    }

    /// Create a mock backend with custom preprocessing parameters
    #[must_use]
    pub fn with_preprocessing(preprocessing: PreprocessingConfig) -> Self {
        Self {
            preprocessing,
            initialized: false,
            inference_count: 0,
            failure: None,
        }
    }

    /// Create a mock backend whose inference always fails with `message`
    #[must_use]
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Number of inference calls, failed ones included
    #[must_use]
    pub fn inference_count(&self) -> usize {
        self.inference_count
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for MockBackend {
    fn initialize(&mut self, _config: &RemovalConfig) -> Result<Option<Duration>> {
        self.preprocessing.validate()?;
        self.initialized = true;
        Ok(None)
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        if !self.initialized {
            return Err(BgRemovalError::inference("Mock backend not initialized"));
        }

        self.inference_count += 1;
        if let Some(message) = &self.failure {
            return Err(BgRemovalError::inference(message.clone()));
        }

        let (n, _c, h, w) = input.dim();
        let center_x = (w as f32 - 1.0) / 2.0;
        let center_y = (h as f32 - 1.0) / 2.0;
        let radius_x = w as f32 * 0.4;
        let radius_y = h as f32 * 0.4;

        let output = Array4::from_shape_fn((n, 1, h, w), |(_, _, y, x)| {
            let dx = (x as f32 - center_x) / radius_x;
            let dy = (y as f32 - center_y) / radius_y;
            if dx * dx + dy * dy <= 1.0 {
                1.0
            } else {
                0.0
            }
        });

        Ok(output)
    }

    fn get_preprocessing_config(&self) -> Result<PreprocessingConfig> {
        Ok(self.preprocessing.clone())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_requires_initialization() {
        let mut backend = MockBackend::new();
        assert!(!backend.is_initialized());

        let input = Array4::<f32>::zeros((1, 3, 64, 64));
        assert!(backend.infer(&input).is_err());

        assert!(backend.initialize(&RemovalConfig::default()).unwrap().is_none());
        assert!(backend.is_initialized());
        assert!(backend.infer(&input).is_ok());
        assert_eq!(backend.inference_count(), 1);
    }

    #[test]
    fn test_mock_mask_shape_and_pattern() {
        let mut backend = MockBackend::new();
        backend.initialize(&RemovalConfig::default()).unwrap();

        let output = backend.infer(&Array4::<f32>::zeros((1, 3, 64, 64))).unwrap();
        assert_eq!(output.shape(), &[1, 1, 64, 64]);
        assert_eq!(output[[0, 0, 32, 32]], 1.0);
        assert_eq!(output[[0, 0, 0, 0]], 0.0);
        assert_eq!(output[[0, 0, 63, 63]], 0.0);
    }

    #[test]
    fn test_failing_mock() {
        let mut backend = MockBackend::failing("model exploded");
        backend.initialize(&RemovalConfig::default()).unwrap();

        let err = backend.infer(&Array4::<f32>::zeros((1, 3, 64, 64))).unwrap_err();
        assert_eq!(err.to_string(), "Inference error: model exploded");
        assert_eq!(backend.inference_count(), 1);
    }

    #[test]
    fn test_mock_rejects_invalid_preprocessing() {
        let mut backend = MockBackend::with_preprocessing(PreprocessingConfig {
            target_size: [0, 0],
            ..PreprocessingConfig::default()
        });
        assert!(backend.initialize(&RemovalConfig::default()).is_err());
    }
}
