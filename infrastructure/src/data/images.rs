//! In-memory image source

use crowdcontrol_application::{ImageSource, ImageSourceError};
use crowdcontrol_domain::Raster;
use std::collections::{BTreeMap, HashMap};

/// [`ImageSource`] over decoded rasters keyed by reference
///
/// Images that failed to decode are remembered with their error, so loading
/// them reports the image as corrupt rather than missing.
#[derive(Debug, Default)]
pub struct InMemoryImageSource {
    images: HashMap<String, Result<Raster, String>>,
}

impl InMemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode raw raster JSON, as found in a dataset file
    pub fn from_json(images: &BTreeMap<String, serde_json::Value>) -> Self {
        let images = images
            .iter()
            .map(|(reference, value)| {
                let decoded =
                    serde_json::from_value::<Raster>(value.clone()).map_err(|e| e.to_string());
                (reference.clone(), decoded)
            })
            .collect();
        Self { images }
    }

    pub fn with_image(mut self, reference: impl Into<String>, raster: Raster) -> Self {
        self.images.insert(reference.into(), Ok(raster));
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for InMemoryImageSource {
    fn load(&self, reference: &str) -> Result<Raster, ImageSourceError> {
        match self.images.get(reference) {
            Some(Ok(raster)) => Ok(raster.clone()),
            Some(Err(reason)) => Err(ImageSourceError::Corrupt {
                reference: reference.to_string(),
                reason: reason.clone(),
            }),
            None => Err(ImageSourceError::NotFound(reference.to_string())),
        }
    }
}
