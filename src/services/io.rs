//! Image I/O operations service
//!
//! File handles are opened and dropped inside each call, so they are released
//! on success and error paths alike.

use crate::error::{BgRemovalError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

/// Service for reading and writing image files and buffers
pub struct ImageIOService;

impl ImageIOService {
    /// Read an entire file into memory
    ///
    /// # Errors
    /// - Path missing, unreadable, or not a regular file
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgremove::services::ImageIOService;
    ///
    /// let bytes = ImageIOService::read_bytes("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path_ref = path.as_ref();

        let mut file = File::open(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("open input image", path_ref, &e))?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|e| BgRemovalError::file_io_error("read input image", path_ref, &e))?;

        tracing::debug!(path = %path_ref.display(), bytes = buffer.len(), "Read input image");
        Ok(buffer)
    }

    /// Create or truncate a file and write `bytes` to it
    ///
    /// Parent directories are not created. A failed write may leave a
    /// truncated file behind.
    ///
    /// # Errors
    /// - Destination directory missing or not writable
    /// - Write or flush failures
    pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
        let path_ref = path.as_ref();

        let file = File::create(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("create output image", path_ref, &e))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| BgRemovalError::file_io_error("write output image", path_ref, &e))?;

        tracing::debug!(path = %path_ref.display(), bytes = bytes.len(), "Wrote output image");
        Ok(())
    }

    /// Decode an image from bytes, detecting the format from content
    ///
    /// # Errors
    /// - Unknown, unsupported or corrupt image data
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    /// Encode an RGBA image as PNG
    ///
    /// # Errors
    /// - PNG encoder failures
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }
}
