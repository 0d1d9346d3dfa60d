#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # bgremove
//!
//! Single-image background removal: read an image file, segment the
//! foreground with a U²-Net style ONNX model, write a PNG whose alpha channel
//! holds the foreground mask.
//!
//! The command-line driver only sees a [`BackgroundRemover`], an opaque
//! bytes-to-bytes collaborator. [`BackgroundRemovalProcessor`] is the
//! model-backed implementation, generic over an [`InferenceBackend`].
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use bgremove::{BackgroundRemover, RemovalConfig, TractRemover};
//!
//! # fn main() -> bgremove::Result<()> {
//! let config = RemovalConfig::builder()
//!     .model_dir("/opt/models")
//!     .build()?;
//! let mut remover = TractRemover::tract(config);
//!
//! let input = std::fs::read("photo.jpg")?;
//! let png = remover.remove(&input)?;
//! std::fs::write("photo_cutout.png", png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `tract` (default): pure Rust ONNX inference backend
//! - `cli` (default): the `bgremove` binary driver and its tracing subscriber
//! - `webp-support` (default): WebP decoding
//! - `tracing-json`: JSON formatted diagnostics
//!
//! ## Model location
//!
//! The model is read from `$BGREMOVE_MODEL_DIR/u2net.onnx`, falling back to
//! the user cache directory (`~/.cache/bgremove/models` on Linux).

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod processor;
pub mod remover;
pub mod services;
pub mod tracing_config;
pub mod types;
pub mod utils;

pub use backends::MockBackend;
#[cfg(feature = "tract")]
pub use backends::TractBackend;
pub use config::{RemovalConfig, RemovalConfigBuilder};
pub use error::{BgRemovalError, Result};
pub use inference::InferenceBackend;
pub use models::{ModelInfo, ModelLocator, ModelManager, PreprocessingConfig};
pub use processor::{BackgroundRemovalProcessor, MockRemover};
#[cfg(feature = "tract")]
pub use processor::TractRemover;
pub use remover::BackgroundRemover;
pub use services::ImageIOService;
pub use types::SegmentationMask;
pub use utils::{ImagePreprocessor, Letterbox};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{spans, TracingConfig, TracingFormat};
