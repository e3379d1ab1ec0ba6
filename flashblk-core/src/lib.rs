//! Board-agnostic core of the flash block device
//!
//! Makes a flash region that can only be erased and programmed in large
//! pages look like a device of small, independently writable blocks:
//!
//! - Address translation from block index to flash address
//! - Single-page write-back cache batching writes to the same page
//! - Block device façade with an explicit sync contract
//! - Mutex-guarded wrapper for multi-context use
//!
//! Flash access goes through the `flashblk-hal` traits only.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod cache;
pub mod device;
pub mod error;
pub mod region;
pub mod shared;
pub mod traits;

#[cfg(test)]
mod mock;

pub use cache::PageCache;
pub use device::{DeviceState, FlashBlockDevice};
pub use error::{Error, FlashError, FlashPhase, GeometryError, OutOfRange};
pub use region::StorageRegion;
pub use shared::SharedBlockDevice;
pub use traits::{BlockDevice, BlockIoctl};
