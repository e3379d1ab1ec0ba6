//! flashblk Hardware Abstraction Layer
//!
//! This crate defines the raw flash and cache-maintenance traits that
//! chip-specific HALs implement. The block device in `flashblk-core` is
//! written against these traits only, so the same translation and caching
//! logic runs on any flash part (and against RAM mocks on the host).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Filesystem driver (FAT, littlefs, ...) │
//! └─────────────────────────────────────────┘
//!                     │ block read/write/sync
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flashblk-core (translator + cache)     │
//! └─────────────────────────────────────────┘
//!                     │ page erase/program, block read
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flashblk-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ flashblk-hal- │       │  any NorFlash │
//! │    rp2040     │       │ implementation│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashDriver`] - Raw erase/read/program primitives
//! - [`cache::CacheMaintenance`] - CPU data-cache invalidation hook

#![no_std]
#![deny(unsafe_code)]

pub mod cache;
pub mod flash;
#[cfg(feature = "embedded-storage")]
pub mod nor;

// Re-export key traits at crate root for convenience
pub use cache::{CacheMaintenance, NoCacheMaintenance};
pub use flash::{DriverError, FlashDriver};
#[cfg(feature = "embedded-storage")]
pub use nor::NorFlashDriver;
