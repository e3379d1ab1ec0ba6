//! Shared access to a block device
//!
//! The page cache has a single buffer standing for at most one in-flight
//! page, so the translator and cache must be locked as one unit. This wraps
//! the whole device in one blocking mutex.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::Error;
use crate::traits::BlockDevice;

/// A block device behind one exclusive lock
pub struct SharedBlockDevice<M: RawMutex, D> {
    device: Mutex<M, RefCell<D>>,
}

impl<M: RawMutex, D> SharedBlockDevice<M, D> {
    /// Wrap a device
    pub const fn new(device: D) -> Self {
        Self {
            device: Mutex::new(RefCell::new(device)),
        }
    }

    /// Run `f` with exclusive access to the device
    ///
    /// Panics if called again from inside `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        self.device.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Release the device
    pub fn into_inner(self) -> D {
        self.device.into_inner().into_inner()
    }
}

impl<M, D> SharedBlockDevice<M, D>
where
    M: RawMutex,
    D: BlockDevice<Error = Error>,
{
    pub fn block_count(&self) -> u32 {
        self.lock(|dev| dev.block_count())
    }

    pub fn read_block(&self, block: u32, buf: &mut [u8]) -> Result<(), Error> {
        self.lock(|dev| dev.read_block(block, buf))
    }

    pub fn write_block(&self, block: u32, data: &[u8]) -> Result<(), Error> {
        self.lock(|dev| dev.write_block(block, data))
    }

    pub fn sync(&self) -> Result<(), Error> {
        self.lock(|dev| dev.sync())
    }
}
