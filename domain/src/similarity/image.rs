//! Image similarity
//!
//! Images arrive as decoded RGB rasters; decoding is a collaborator concern.
//! Two comparison methods are provided:
//!
//! - **Signature**: the image is rescaled to 300×300 and split into a 5×5
//!   grid; each block's average color forms the signature. Similarity is
//!   based on the summed color distance per block, so it reflects both
//!   color and location. More reliable, slower.
//! - **Perceptual hash**: the image is rescaled to 8×8, converted to
//!   luminance and thresholded against its mean. Cheap, but prone to false
//!   negatives for crops, and every uniformly colored image hashes to zero.

use super::simhash::Fingerprint;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Number of blocks per signature row and column
pub const SIGNATURE_GRID: usize = 5;
/// Edge length images are rescaled to before sampling the signature
pub const SIGNATURE_BASE_SIZE: u32 = 300;
const BLOCK_SIZE: u32 = SIGNATURE_BASE_SIZE / SIGNATURE_GRID as u32;
/// Edge length of the perceptual hash input
pub const HASH_SIZE: u32 = 8;

/// An RGB pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// ITU-R BT.601 luma
    pub fn luminance(self) -> f64 {
        let [r, g, b] = self.0;
        0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
    }

    /// Luminance scaled by 1000, exact
    fn luma_millis(self) -> u64 {
        let [r, g, b] = self.0;
        299 * r as u64 + 587 * g as u64 + 114 * b as u64
    }

    fn distance(self, other: Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = *a as f64 - *b as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

#[derive(Deserialize)]
struct RasterData {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl TryFrom<RasterData> for Raster {
    type Error = DomainError;

    fn try_from(data: RasterData) -> Result<Self, Self::Error> {
        Raster::new(data.width, data.height, data.pixels)
    }
}

/// A decoded image, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RasterData")]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// Create a raster, rejecting empty or inconsistent dimensions
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidImage(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(DomainError::InvalidImage(format!(
                "{}x{} image needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a raster by evaluating `f(x, y)` for every pixel
    pub fn from_fn(
        width: u32,
        height: u32,
        f: impl Fn(u32, u32) -> Rgb,
    ) -> Result<Self, DomainError> {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Nearest-neighbor rescale
    ///
    /// Target pixel `(x, y)` samples source pixel
    /// `(x · w / width, y · h / height)`, which keeps the content's spatial
    /// layout aligned with the target grid.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Raster {
        let (src_w, src_h) = (self.width as u64, self.height as u64);
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let sx = (x as u64 * src_w / width as u64) as u32;
                let sy = (y as u64 * src_h / height as u64) as u32;
                self.pixel(sx, sy)
            })
            .collect();
        Raster {
            width,
            height,
            pixels,
        }
    }

    fn rescaled_to(&self, size: u32) -> Cow<'_, Raster> {
        if self.width == size && self.height == size {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.resize_nearest(size, size))
        }
    }
}

/// Average block colors of an image on a 5×5 grid (Value Object)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSignature([[Rgb; SIGNATURE_GRID]; SIGNATURE_GRID]);

impl ImageSignature {
    /// Largest possible summed distance: every block black vs white
    pub const MAX_DISTANCE: f64 =
        441.672_955_930_063_7 * (SIGNATURE_GRID * SIGNATURE_GRID) as f64;

    pub fn of(raster: &Raster) -> Self {
        let image = raster.rescaled_to(SIGNATURE_BASE_SIZE);
        let mut grid = [[Rgb::default(); SIGNATURE_GRID]; SIGNATURE_GRID];
        for (gx, column) in grid.iter_mut().enumerate() {
            for (gy, block) in column.iter_mut().enumerate() {
                *block = block_average(&image, gx as u32, gy as u32);
            }
        }
        Self(grid)
    }

    /// Block color at grid position `(x, y)`
    pub fn block(&self, x: usize, y: usize) -> Rgb {
        self.0[x][y]
    }

    /// `1 − Σ distance(block_a, block_b) / MAX_DISTANCE`
    pub fn similarity(&self, other: &Self) -> f64 {
        let distance: f64 = self
            .0
            .iter()
            .flatten()
            .zip(other.0.iter().flatten())
            .map(|(a, b)| a.distance(*b))
            .sum();
        (1.0 - distance / Self::MAX_DISTANCE).clamp(0.0, 1.0)
    }
}

fn block_average(image: &Raster, gx: u32, gy: u32) -> Rgb {
    let mut sums = [0u64; 3];
    for x in gx * BLOCK_SIZE..(gx + 1) * BLOCK_SIZE {
        for y in gy * BLOCK_SIZE..(gy + 1) * BLOCK_SIZE {
            let pixel = image.pixel(x, y);
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += channel as u64;
            }
        }
    }
    let count = (BLOCK_SIZE * BLOCK_SIZE) as u64;
    Rgb(sums.map(|sum| (sum / count) as u8))
}

/// 64-bit perceptual hash: 8×8 luminance pixels above the mean become 1 bits
///
/// Bits are laid out row-major, most significant bit first.
pub fn perceptual_hash(raster: &Raster) -> Fingerprint {
    let small = raster.rescaled_to(HASH_SIZE);
    let luma: Vec<u64> = small.pixels.iter().map(|p| p.luma_millis()).collect();
    let total: u64 = luma.iter().sum();
    let count = luma.len() as u64;

    // l > total / count, kept in integers
    let bits = luma
        .iter()
        .enumerate()
        .filter(|(_, l)| **l * count > total)
        .fold(0u64, |acc, (i, _)| acc | (1u64 << (63 - i)));
    Fingerprint::from_bits(bits)
}

/// How image attachments are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageMethod {
    #[default]
    Signature,
    PerceptualHash,
}

impl std::str::FromStr for ImageMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "signature" => Ok(ImageMethod::Signature),
            "perceptual_hash" | "phash" => Ok(ImageMethod::PerceptualHash),
            _ => Err(format!(
                "Unknown image method: {}. Valid: signature, perceptual_hash",
                s
            )),
        }
    }
}

/// Precomputed comparison key for one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFingerprint {
    Signature(Box<ImageSignature>),
    Hash(Fingerprint),
}

impl ImageFingerprint {
    pub fn compute(raster: &Raster, method: ImageMethod) -> Self {
        match method {
            ImageMethod::Signature => Self::Signature(Box::new(ImageSignature::of(raster))),
            ImageMethod::PerceptualHash => Self::Hash(perceptual_hash(raster)),
        }
    }

    /// Similarity of two fingerprints of the same kind
    ///
    /// Returns `None` when the two were computed with different methods.
    pub fn similarity(&self, other: &Self) -> Option<f64> {
        match (self, other) {
            (Self::Signature(a), Self::Signature(b)) => Some(a.similarity(b)),
            (Self::Hash(a), Self::Hash(b)) => Some(a.similarity(*b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLACK: Rgb = Rgb::new(0, 0, 0);
    const WHITE: Rgb = Rgb::new(255, 255, 255);

    fn solid(width: u32, height: u32, color: Rgb) -> Raster {
        Raster::from_fn(width, height, |_, _| color).unwrap()
    }

    /// Left half black, right half white
    fn split(width: u32, height: u32) -> Raster {
        Raster::from_fn(width, height, |x, _| if x < width / 2 { BLACK } else { WHITE }).unwrap()
    }

    #[test]
    fn test_raster_validation() {
        assert!(Raster::new(0, 5, vec![]).is_err());
        assert!(Raster::new(2, 2, vec![RED; 3]).is_err());
        assert!(Raster::new(2, 2, vec![RED; 4]).is_ok());
    }

    #[test]
    fn test_raster_deserialize_validates() {
        let ok = r#"{"width":1,"height":1,"pixels":[[1,2,3]]}"#;
        let raster: Raster = serde_json::from_str(ok).unwrap();
        assert_eq!(raster.pixel(0, 0), Rgb::new(1, 2, 3));

        let bad = r#"{"width":2,"height":1,"pixels":[[1,2,3]]}"#;
        assert!(serde_json::from_str::<Raster>(bad).is_err());
    }

    #[test]
    fn test_resize_nearest_keeps_layout() {
        let image = split(4, 2);
        let big = image.resize_nearest(8, 4);
        assert_eq!(big.pixel(0, 0), BLACK);
        assert_eq!(big.pixel(3, 3), BLACK);
        assert_eq!(big.pixel(4, 0), WHITE);
        assert_eq!(big.pixel(7, 3), WHITE);
    }

    #[test]
    fn test_signature_identical_images() {
        let a = ImageSignature::of(&split(300, 300));
        let b = ImageSignature::of(&split(300, 300));
        assert_eq!(a.similarity(&b), 1.0);
    }

    #[test]
    fn test_signature_rescales_other_dimensions() {
        let small = ImageSignature::of(&split(10, 10));
        let large = ImageSignature::of(&split(600, 450));
        assert_eq!(small.similarity(&large), 1.0);
        assert_eq!(small.block(0, 0), BLACK);
        assert_eq!(small.block(4, 4), WHITE);
    }

    #[test]
    fn test_signature_opposite_images() {
        let black = ImageSignature::of(&solid(30, 30, BLACK));
        let white = ImageSignature::of(&solid(30, 30, WHITE));
        assert!(black.similarity(&white) < 1e-9);
        assert_eq!(black.similarity(&white), white.similarity(&black));
    }

    #[test]
    fn test_perceptual_hash() {
        let a = perceptual_hash(&split(64, 64));
        let b = perceptual_hash(&split(16, 16));
        assert_eq!(a, b);
        // right half bright: 4 high bits per row
        assert_eq!(a.bits().count_ones(), 32);
        assert_eq!(perceptual_hash(&solid(8, 8, RED)).bits(), 0);
    }

    #[test]
    fn test_image_fingerprint_kinds() {
        let image = split(20, 20);
        let sig = ImageFingerprint::compute(&image, ImageMethod::Signature);
        let hash = ImageFingerprint::compute(&image, ImageMethod::PerceptualHash);
        assert_eq!(sig.similarity(&sig), Some(1.0));
        assert_eq!(hash.similarity(&hash), Some(1.0));
        assert_eq!(sig.similarity(&hash), None);
    }

    #[test]
    fn test_parse_image_method() {
        assert_eq!(
            "perceptual-hash".parse::<ImageMethod>().ok(),
            Some(ImageMethod::PerceptualHash)
        );
        assert_eq!("signature".parse::<ImageMethod>().ok(), Some(ImageMethod::Signature));
        assert!("fft".parse::<ImageMethod>().is_err());
    }
}
