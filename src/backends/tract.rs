//! Tract backend implementation for background removal models
//!
//! Runs ONNX segmentation models with Tract, a pure Rust inference engine, so
//! the binary needs no native runtime libraries. The model input is pinned to
//! `[1, 3, H, W]` from the preprocessing config before optimization.

use crate::config::RemovalConfig;
use crate::error::{BgRemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::{ModelManager, PreprocessingConfig};
use ndarray::Array4;
use std::time::{Duration, Instant};
use tract_onnx::prelude::*;

/// Type alias for the optimized, runnable Tract model
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Tract backend for running background removal models using pure Rust inference
#[derive(Debug, Default)]
pub struct TractBackend {
    model: Option<TractModel>,
    model_manager: Option<ModelManager>,
}

impl TractBackend {
    /// Create a new uninitialized Tract backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and optimize the model
    fn load_model(model_manager: &ModelManager) -> Result<TractModel> {
        let model_info = model_manager.get_info()?;
        let _span = crate::tracing_config::spans::model_loading(&model_info.name, "tract:cpu").entered();

        tracing::info!(
            model = %model_info.name,
            path = %model_manager.model_path().display(),
            size_mb = model_info.size_bytes as f64 / (1024.0 * 1024.0),
            input_shape = ?model_info.input_shape,
            expected_output_shape = ?model_info.output_shape,
            "Loading segmentation model"
        );

        let model_data = model_manager.load_model()?;
        let (batch, channels, height, width) = model_info.input_shape;
        let input_fact: InferenceFact = f32::fact([batch, channels, height, width]).into();

        let model_path = model_manager.model_path();
        onnx()
            .model_for_read(&mut std::io::Cursor::new(model_data))
            .map_err(|e| {
                BgRemovalError::model_error_with_context("parse", model_path, &e.to_string(), &[])
            })?
            .with_input_fact(0, input_fact)
            .map_err(|e| {
                BgRemovalError::model_error_with_context(
                    "configure input of",
                    model_path,
                    &e.to_string(),
                    &["the model must take a single [1, 3, H, W] float input"],
                )
            })?
            .into_optimized()
            .map_err(|e| BgRemovalError::model(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| BgRemovalError::model(format!("Failed to create runnable model: {e}")))
    }
}

impl InferenceBackend for TractBackend {
    fn initialize(&mut self, config: &RemovalConfig) -> Result<Option<Duration>> {
        if self.model.is_some() {
            return Ok(None);
        }

        let model_load_start = Instant::now();

        if self.model_manager.is_none() {
            self.model_manager = Some(ModelManager::from_config(config)?);
        }
        let model_manager = self
            .model_manager
            .as_ref()
            .ok_or_else(|| BgRemovalError::model("No model available for Tract backend"))?;

        self.model = Some(Self::load_model(model_manager)?);

        let model_load_time = model_load_start.elapsed();
        tracing::debug!(
            load_ms = model_load_time.as_millis() as u64,
            "Tract backend initialized"
        );
        Ok(Some(model_load_time))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| BgRemovalError::inference("Tract model not initialized"))?;

        let inference_start = Instant::now();

        let input_data = input.as_slice().ok_or_else(|| {
            BgRemovalError::inference("Input tensor is not in standard layout")
        })?;
        let input_tensor = Tensor::from_shape(input.shape(), input_data)
            .map_err(|e| BgRemovalError::inference(format!("Failed to build input tensor: {e}")))?;

        let outputs = model
            .run(tvec![input_tensor.into()])
            .map_err(|e| BgRemovalError::inference(format!("Tract inference failed: {e}")))?;

        // U²-Net style models emit several side outputs; the first is the fused mask
        let output = outputs
            .first()
            .ok_or_else(|| BgRemovalError::inference("No output tensor found"))?;

        let output_shape = output.shape().to_vec();
        let [n, c, h, w] = output_shape[..] else {
            return Err(BgRemovalError::inference(format!(
                "Expected 4D output tensor, got shape {output_shape:?}"
            )));
        };

        let output_data = output
            .as_slice::<f32>()
            .map_err(|e| BgRemovalError::inference(format!("Failed to read output tensor: {e}")))?;

        let output_array = Array4::from_shape_vec((n, c, h, w), output_data.to_vec())
            .map_err(|e| BgRemovalError::inference(format!("Failed to reshape output tensor: {e}")))?;

        tracing::debug!(
            inference_ms = inference_start.elapsed().as_millis() as u64,
            output_shape = ?output_array.shape(),
            "Tract inference completed"
        );

        Ok(output_array)
    }

    fn get_preprocessing_config(&self) -> Result<PreprocessingConfig> {
        self.model_manager
            .as_ref()
            .map(|manager| manager.get_preprocessing_config().clone())
            .ok_or_else(|| BgRemovalError::model("Model manager not initialized"))
    }

    fn is_initialized(&self) -> bool {
        self.model.is_some()
    }
}
