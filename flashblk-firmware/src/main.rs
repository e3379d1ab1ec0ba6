//! flashblk - Flash block device firmware
//!
//! Main firmware binary for RP2040 boards. Exposes the FLASH_FS region
//! reserved by the linker script as a block device and checks it with a
//! write/sync/read-back pass at boot.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use flashblk_core::{FlashBlockDevice, SharedBlockDevice, StorageRegion};
use flashblk_hal_rp2040::flash::{linker_region, new_flash, Rp2040Flash};
use flashblk_hal_rp2040::NoCacheMaintenance;

mod storage_config {
    include!(concat!(env!("OUT_DIR"), "/storage_config.rs"));
}
mod tasks;

use storage_config::{BLOCK_SIZE, PAGE_SIZE};

/// Block device over the on-board flash
pub type Device = FlashBlockDevice<Rp2040Flash<'static>, NoCacheMaintenance, BLOCK_SIZE, PAGE_SIZE>;

/// Device shared between tasks
pub type SharedDevice = SharedBlockDevice<CriticalSectionRawMutex, Device>;

// The device lives forever so tasks can hold a reference
static DEVICE: StaticCell<SharedDevice> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("flashblk firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());

    let (offset, len) = linker_region();
    info!("Storage region: {=u32:#x} + {=u32} bytes", offset, len);

    let region = unwrap!(StorageRegion::new(
        offset,
        len,
        BLOCK_SIZE as u32,
        PAGE_SIZE as u32
    ));
    let mut device = unwrap!(Device::new(new_flash(p.FLASH), NoCacheMaintenance, region));
    unwrap!(device.init());

    let device = DEVICE.init(SharedBlockDevice::new(device));

    spawner.spawn(tasks::self_test_task(device)).unwrap();
    spawner.spawn(tasks::sync_task(device)).unwrap();

    info!("All tasks spawned");
}
