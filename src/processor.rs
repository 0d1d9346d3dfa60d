//! Background removal processor
//!
//! Drives one image through decode, preprocessing, inference, mask
//! generation and PNG encoding on top of any [`InferenceBackend`].

use crate::{
    config::RemovalConfig,
    error::Result,
    inference::InferenceBackend,
    remover::BackgroundRemover,
    services::ImageIOService,
    types::SegmentationMask,
    utils::ImagePreprocessor,
};
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::time::Instant;
use tracing::{debug, instrument};

#[cfg(feature = "tract")]
use crate::backends::TractBackend;
use crate::backends::MockBackend;

/// Processor combining a configuration with an inference backend
///
/// The backend is initialized lazily on the first processed image, so
/// constructing a processor never touches the filesystem.
#[derive(Debug)]
pub struct BackgroundRemovalProcessor<B: InferenceBackend> {
    config: RemovalConfig,
    backend: B,
}

/// Production remover: Tract inference over an installed ONNX model
#[cfg(feature = "tract")]
pub type TractRemover = BackgroundRemovalProcessor<TractBackend>;

/// Model-free remover cutting out a centered ellipse
pub type MockRemover = BackgroundRemovalProcessor<MockBackend>;

#[cfg(feature = "tract")]
impl TractRemover {
    /// Create a Tract-backed remover; the model is loaded on first use
    #[must_use]
    pub fn tract(config: RemovalConfig) -> Self {
        Self::new(config, TractBackend::new())
    }
}

impl MockRemover {
    /// Create a remover backed by [`MockBackend`]
    #[must_use]
    pub fn mock() -> Self {
        Self::new(RemovalConfig::default(), MockBackend::new())
    }

    /// Create a remover whose inference step always fails with `message`
    #[must_use]
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self::new(RemovalConfig::default(), MockBackend::failing(message))
    }
}

impl<B: InferenceBackend> BackgroundRemovalProcessor<B> {
    /// Create a processor; nothing is loaded until the first image
    pub fn new(config: RemovalConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Validate the configuration and initialize the backend if needed
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Backend initialization failures
    pub fn initialize(&mut self) -> Result<()> {
        if self.backend.is_initialized() {
            return Ok(());
        }

        self.config.validate()?;
        if let Some(load_time) = self.backend.initialize(&self.config)? {
            debug!(load_ms = load_time.as_millis() as u64, "Backend ready");
        }
        Ok(())
    }

    /// Remove the background of a decoded image
    ///
    /// # Errors
    /// - Backend initialization or inference failures
    /// - Unexpected model output
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process_image(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        self.initialize()?;

        let preprocessing_config = self.backend.get_preprocessing_config()?;
        let (input_tensor, letterbox) =
            ImagePreprocessor::preprocess(image, &preprocessing_config, self.config.padding_color)?;

        let inference_start = Instant::now();
        let output_tensor = {
            let _span = crate::tracing_config::spans::inference(image.dimensions()).entered();
            self.backend.infer(&input_tensor)?
        };
        debug!(
            inference_ms = inference_start.elapsed().as_millis() as u64,
            "Inference finished"
        );

        let mask = {
            let _span = crate::tracing_config::spans::postprocessing("mask_generation").entered();
            SegmentationMask::from_tensor(&output_tensor, image.dimensions(), &letterbox)?
        };
        debug!(foreground_ratio = mask.foreground_ratio(), "Mask generated");

        mask.apply_to_image(image)
    }

    /// Remove the background of an encoded image, returning PNG bytes
    ///
    /// The image is decoded before the backend is initialized, so
    /// undecodable input never triggers model loading.
    ///
    /// # Errors
    /// - Undecodable input
    /// - Any error from [`Self::process_image`]
    /// - PNG encoding failures
    pub fn process_bytes(&mut self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let image = ImageIOService::load_from_bytes(image_bytes)?;
        let result = self.process_image(&image)?;
        ImageIOService::encode_png(&result)
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &RemovalConfig {
        &self.config
    }

    /// Get the inference backend
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check if the backend is initialized
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }
}

impl<B: InferenceBackend> BackgroundRemover for BackgroundRemovalProcessor<B> {
    fn remove(&mut self, image: &[u8]) -> Result<Vec<u8>> {
        self.process_bytes(image)
    }
}
