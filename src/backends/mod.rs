//! Inference backends for background removal
//!
//! - `tract`: pure Rust ONNX inference (default)
//! - `mock`: model-free backend for tests

pub mod mock;
#[cfg(feature = "tract")]
pub mod tract;

pub use mock::MockBackend;
#[cfg(feature = "tract")]
pub use tract::TractBackend;
