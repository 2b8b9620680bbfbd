//! Similarity engine
//!
//! Pure functions used by duplicate detection. Every similarity returned
//! here lies in `[0, 1]`, is symmetric, and is exactly `1.0` when both
//! inputs are identical under the function's own normalization.
//!
//! # Text
//!
//! ```text
//! "Cats are great"  ──normalize──►  "catsaregreat"
//!                   ──shingle(k)─►  {"cat", "ats", "tsa", ...}
//!                   ──simhash───►  64-bit Fingerprint
//! ```
//!
//! # Images
//!
//! - [`ImageSignature`]: 5×5 grid of average block colors, compared by
//!   summed euclidean RGB distance
//! - [`perceptual_hash`]: 8×8 luminance threshold hash, compared like a
//!   text fingerprint

pub mod image;
pub mod shingle;
pub mod simhash;

pub use image::{ImageFingerprint, ImageMethod, ImageSignature, Raster, Rgb, perceptual_hash};
pub use shingle::{jaccard_similarity, normalize, shingles};
pub use simhash::{Fingerprint, hamming_distance, text_similarity};
