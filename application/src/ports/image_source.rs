//! Image source port
//!
//! Resolves the image reference stored on an answer to decoded pixels.

use crowdcontrol_domain::Raster;
use thiserror::Error;

/// Errors that can occur while loading an image
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageSourceError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image {reference} is corrupt: {reason}")]
    Corrupt { reference: String, reason: String },
}

/// Loads answer images
pub trait ImageSource: Send + Sync {
    fn load(&self, reference: &str) -> Result<Raster, ImageSourceError>;
}

/// Image source that knows no images
pub struct NoImages;

impl ImageSource for NoImages {
    fn load(&self, reference: &str) -> Result<Raster, ImageSourceError> {
        Err(ImageSourceError::NotFound(reference.to_string()))
    }
}
