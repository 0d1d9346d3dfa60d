//! Image preprocessing for model inference
//!
//! Images are letterboxed: resized to fit the model input while keeping their
//! aspect ratio, then centered on a padded canvas. The returned
//! [`Letterbox`] records that placement so the predicted mask can be mapped
//! back onto the original pixels.

use crate::{
    error::{BgRemovalError, Result},
    models::PreprocessingConfig,
};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use ndarray::Array4;

/// Placement of the resized image inside the model input canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale factor applied to the original image
    pub scale: f32,
    /// Horizontal offset of the resized image on the canvas
    pub offset_x: u32,
    /// Vertical offset of the resized image on the canvas
    pub offset_y: u32,
    /// Width of the resized image
    pub scaled_width: u32,
    /// Height of the resized image
    pub scaled_height: u32,
    /// Canvas width (model input width)
    pub canvas_width: u32,
    /// Canvas height (model input height)
    pub canvas_height: u32,
}

impl Letterbox {
    /// Compute the letterbox placement of an image on a canvas
    ///
    /// # Errors
    /// - Zero-sized image or canvas
    pub fn fit(original: (u32, u32), canvas: (u32, u32)) -> Result<Self> {
        let (orig_width, orig_height) = original;
        let (canvas_width, canvas_height) = canvas;

        if orig_width == 0 || orig_height == 0 {
            return Err(BgRemovalError::processing(format!(
                "Cannot preprocess empty image ({orig_width}x{orig_height})"
            )));
        }
        if canvas_width == 0 || canvas_height == 0 {
            return Err(BgRemovalError::processing(format!(
                "Invalid model input size ({canvas_width}x{canvas_height})"
            )));
        }

        let scale = (canvas_width as f32 / orig_width as f32)
            .min(canvas_height as f32 / orig_height as f32);

        // Extremely thin images still occupy at least one canvas pixel
        let scaled_width = ((orig_width as f32 * scale).round() as u32).clamp(1, canvas_width);
        let scaled_height = ((orig_height as f32 * scale).round() as u32).clamp(1, canvas_height);

        Ok(Self {
            scale,
            offset_x: (canvas_width - scaled_width) / 2,
            offset_y: (canvas_height - scaled_height) / 2,
            scaled_width,
            scaled_height,
            canvas_width,
            canvas_height,
        })
    }

    /// Map an original pixel to its canvas coordinate
    ///
    /// Samples at the pixel center and clamps into the resized image area.
    #[must_use]
    pub fn to_canvas(&self, x: u32, y: u32) -> (u32, u32) {
        let scaled_x = (((x as f32 + 0.5) * self.scale) as u32).min(self.scaled_width - 1);
        let scaled_y = (((y as f32 + 0.5) * self.scale) as u32).min(self.scaled_height - 1);
        (scaled_x + self.offset_x, scaled_y + self.offset_y)
    }
}

/// Image preprocessing utilities
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Preprocess image for model inference
    ///
    /// This function handles:
    /// - RGB conversion
    /// - Aspect ratio preserving resize
    /// - Center padding to target size
    /// - Normalization to tensor format (NCHW)
    ///
    /// # Errors
    /// - Empty image or invalid target size
    pub fn preprocess(
        image: &DynamicImage,
        preprocessing_config: &PreprocessingConfig,
        padding_color: [u8; 3],
    ) -> Result<(Array4<f32>, Letterbox)> {
        let rgb_image = image.to_rgb8();
        let [target_width, target_height] = preprocessing_config.target_size;
        let letterbox = Letterbox::fit(rgb_image.dimensions(), (target_width, target_height))?;

        let _span = crate::tracing_config::spans::preprocessing(
            rgb_image.dimensions(),
            (target_width, target_height),
        )
        .entered();

        let resized = image::imageops::resize(
            &rgb_image,
            letterbox.scaled_width,
            letterbox.scaled_height,
            image::imageops::FilterType::Triangle,
        );

        let mut canvas =
            ImageBuffer::from_pixel(target_width, target_height, Rgb(padding_color));
        image::imageops::replace(
            &mut canvas,
            &resized,
            i64::from(letterbox.offset_x),
            i64::from(letterbox.offset_y),
        );

        let tensor = Self::canvas_to_tensor(&canvas, preprocessing_config);
        Ok((tensor, letterbox))
    }

    /// Convert canvas to normalized tensor
    fn canvas_to_tensor(canvas: &RgbImage, preprocessing_config: &PreprocessingConfig) -> Array4<f32> {
        let (width, height) = canvas.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
        let mean = preprocessing_config.normalization_mean;
        let std = preprocessing_config.normalization_std;

        for (x, y, pixel) in canvas.enumerate_pixels() {
            for channel in 0..3 {
                let value = (f32::from(pixel[channel]) / 255.0 - mean[channel]) / std[channel];
                if let Some(slot) = tensor.get_mut([0, channel, y as usize, x as usize]) {
                    *slot = value;
                }
            }
        }

        tensor
    }
}
