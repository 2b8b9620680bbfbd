//! Data adapters: in-memory persistence, image storage and dataset files

mod dataset;
mod images;
mod memory;

pub use dataset::{Dataset, DatasetError};
pub use images::InMemoryImageSource;
pub use memory::InMemoryDataAccess;
