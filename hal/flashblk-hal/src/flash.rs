//! Raw flash abstractions
//!
//! Provides the primitive erase/read/program interface that chip-specific
//! HALs implement on top of their flash controller.

/// Errors reported by a flash driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Address or length not aligned to what the operation requires
    NotAligned,
    /// Address range lies outside the flash device
    OutOfBounds,
    /// Controller busy with another operation
    Busy,
    /// Operation failed on the medium
    Failed,
}

/// Raw flash driver
///
/// Addresses are physical flash addresses. `erase` and `write` are only
/// called with page-aligned addresses and whole-page lengths; `read` may be
/// called at any block-aligned address.
///
/// Every operation blocks until the medium has completed it.
pub trait FlashDriver {
    /// Bring up the flash controller
    ///
    /// Called once by the block device when it is initialized.
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Erase `len` bytes starting at `addr`
    fn erase(&mut self, addr: u32, len: usize) -> Result<(), DriverError>;

    /// Read `buf.len()` bytes starting at `addr` into `buf`
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), DriverError>;

    /// Program `data` starting at `addr`
    ///
    /// The target range must have been erased beforehand.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), DriverError>;
}

impl<T: FlashDriver + ?Sized> FlashDriver for &mut T {
    fn init(&mut self) -> Result<(), DriverError> {
        T::init(self)
    }

    fn erase(&mut self, addr: u32, len: usize) -> Result<(), DriverError> {
        T::erase(self, addr, len)
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), DriverError> {
        T::read(self, addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), DriverError> {
        T::write(self, addr, data)
    }
}
