//! Object storage adapters
//!
//! - [`ObjectStore`] - the storage primitives the pipeline consumes
//! - [`FsObjectStore`] - buckets as directories on the local filesystem
//! - [`MemoryObjectStore`] - in-process store with call recording and fault injection

pub mod filesystem;
pub mod memory;
pub mod traits;

pub use filesystem::FsObjectStore;
pub use memory::{MemoryObjectStore, StorageCall, StorageOperation};
pub use traits::{listing_includes, ObjectStore, StorageResult};
