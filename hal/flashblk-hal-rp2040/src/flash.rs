//! Flash driver for RP2040
//!
//! Wraps embassy-rp's blocking flash access in the shared
//! [`NorFlashDriver`] adapter. Addresses seen by the driver are offsets
//! from the start of flash, not XIP bus addresses.

use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use flashblk_hal::NorFlashDriver;

/// Flash size on the target board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB W25Q16

/// Start of the execute-in-place window flash is mapped at
pub const XIP_BASE: u32 = 0x1000_0000;

/// RP2040 flash driver
pub type Rp2040Flash<'d> = NorFlashDriver<Flash<'d, FLASH, Blocking, FLASH_SIZE>>;

/// Create the flash driver
///
/// Blocking mode: every erase/program runs from RAM with XIP disabled, so
/// the caller stalls until the operation completes.
pub fn new_flash<'d>(flash: Peri<'d, FLASH>) -> Rp2040Flash<'d> {
    NorFlashDriver::new(Flash::new_blocking(flash))
}

extern "C" {
    static __flash_fs_start: u8;
    static __flash_fs_end: u8;
}

/// Storage region reserved by the linker script
///
/// Returns `(offset, len)` of the `FLASH_FS` memory region, with the
/// offset relative to the start of flash.
pub fn linker_region() -> (u32, u32) {
    // Only the symbol addresses are used, the bytes are never read
    #[allow(unused_unsafe)]
    let (start, end) = unsafe {
        (
            core::ptr::addr_of!(__flash_fs_start) as u32,
            core::ptr::addr_of!(__flash_fs_end) as u32,
        )
    };
    (start - XIP_BASE, end - start)
}
