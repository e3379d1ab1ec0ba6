//! RP2040-specific HAL for the flash block device
//!
//! This crate provides the RP2040 implementation of the `flashblk-hal`
//! traits:
//!
//! - Flash driver over embassy-rp's blocking QSPI flash access
//! - Storage region lookup from linker symbols
//!
//! The RP2040 has no data cache in front of flash besides the XIP cache,
//! which the boot ROM flash routines already flush after every erase and
//! program, so [`flashblk_hal::NoCacheMaintenance`] is the right hook here.

#![no_std]

pub mod flash;

// Re-export shared traits from flashblk-hal for convenience
pub use flashblk_hal::{FlashDriver, NoCacheMaintenance};
