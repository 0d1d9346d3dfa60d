//! The background remover collaborator seen by the CLI

use crate::error::Result;

/// Anything that turns encoded image bytes into encoded image bytes with the
/// background removed
///
/// The output format is the implementation's choice; the model-backed
/// processors always produce PNG so the alpha channel survives.
///
/// Closures with a matching signature implement this trait, which keeps
/// stand-ins in tests short:
///
/// ```rust
/// use bgremove::{BackgroundRemover, BgRemovalError};
///
/// let mut failing = |_: &[u8]| -> bgremove::Result<Vec<u8>> {
///     Err(BgRemovalError::processing("unsupported image"))
/// };
/// assert!(failing.remove(b"bytes").is_err());
/// ```
pub trait BackgroundRemover {
    /// Remove the background from an encoded image
    ///
    /// # Errors
    /// - Undecodable input
    /// - Model loading or inference failures
    /// - Output encoding failures
    fn remove(&mut self, image: &[u8]) -> Result<Vec<u8>>;
}

impl<F> BackgroundRemover for F
where
    F: FnMut(&[u8]) -> Result<Vec<u8>>,
{
    fn remove(&mut self, image: &[u8]) -> Result<Vec<u8>> {
        self(image)
    }
}
