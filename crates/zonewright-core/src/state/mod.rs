// # Resource Store Implementations
//
// Implementations of the ResourceStore trait for different persistence
// strategies.

pub mod file;
pub mod memory;

pub use file::{FileResourceStore, FileResourceStoreFactory};
pub use memory::{MemoryResourceStore, MemoryResourceStoreFactory};
