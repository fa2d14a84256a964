//! Storage value objects

pub mod blob;
pub mod location;

pub use blob::{AudioMimeType, NamedBlob, DEFAULT_CONTENT_TYPE};
pub use location::StorageLocation;
