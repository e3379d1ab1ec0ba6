//! Block device traits
//!
//! The interface a filesystem driver uses to reach the storage.

pub mod block;

pub use block::{BlockDevice, BlockIoctl};
