//! Core types produced by the segmentation pipeline

use crate::error::{BgRemovalError, Result};
use crate::utils::Letterbox;
use image::{DynamicImage, Rgba, RgbaImage};
use ndarray::Array4;

/// Foreground mask with one alpha value per original image pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    /// Mask data as grayscale values (0-255), row-major
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a new segmentation mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Build a mask from a model output tensor of shape `[1, 1, H, W]`
    ///
    /// Every original pixel is mapped through the letterbox placement used
    /// during preprocessing. Models whose output resolution differs from
    /// their input resolution are sampled proportionally.
    ///
    /// # Errors
    /// - Tensor is not a single-channel, single-batch mask
    pub fn from_tensor(
        tensor: &Array4<f32>,
        original_dimensions: (u32, u32),
        letterbox: &Letterbox,
    ) -> Result<Self> {
        let (batch, channels, mask_height, mask_width) = tensor.dim();
        if batch != 1 || channels != 1 || mask_height == 0 || mask_width == 0 {
            return Err(BgRemovalError::processing(format!(
                "Invalid output tensor shape: {:?}, expected [1, 1, H, W]",
                tensor.shape()
            )));
        }

        let x_ratio = mask_width as f32 / letterbox.canvas_width as f32;
        let y_ratio = mask_height as f32 / letterbox.canvas_height as f32;

        let (orig_width, orig_height) = original_dimensions;
        let mut data = Vec::with_capacity(orig_width as usize * orig_height as usize);

        for y in 0..orig_height {
            for x in 0..orig_width {
                let (canvas_x, canvas_y) = letterbox.to_canvas(x, y);
                let mask_x = ((canvas_x as f32 * x_ratio) as usize).min(mask_width - 1);
                let mask_y = ((canvas_y as f32 * y_ratio) as usize).min(mask_height - 1);

                let value = tensor.get([0, 0, mask_y, mask_x]).copied().unwrap_or(0.0);
                data.push((value.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }

        Ok(Self::new(data, original_dimensions))
    }

    /// Cut the foreground out of `image`
    ///
    /// The mask becomes the alpha channel, scaled by any alpha the source
    /// already carries. Fully transparent pixels are zeroed.
    ///
    /// # Errors
    /// - Image and mask dimensions do not match
    pub fn apply_to_image(&self, image: &DynamicImage) -> Result<RgbaImage> {
        let mut rgba = image.to_rgba8();
        if rgba.dimensions() != self.dimensions {
            return Err(BgRemovalError::processing(format!(
                "Image and mask dimensions do not match: {:?} vs {:?}",
                rgba.dimensions(),
                self.dimensions
            )));
        }

        for (pixel, &mask_value) in rgba.pixels_mut().zip(&self.data) {
            let alpha = (u16::from(mask_value) * u16::from(pixel[3]) / 255) as u8;
            *pixel = if alpha == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([pixel[0], pixel[1], pixel[2], alpha])
            };
        }

        Ok(rgba)
    }

    /// Fraction of pixels that are at least half opaque
    #[must_use]
    pub fn foreground_ratio(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let foreground = self.data.iter().filter(|&&v| v >= 128).count();
        foreground as f32 / self.data.len() as f32
    }
}
