//! Error taxonomy for the block device

use flashblk_hal::DriverError;

/// Flash operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashPhase {
    /// Controller bring-up
    Init,
    /// Page erase
    Erase,
    /// Page program
    Program,
    /// Block or page read
    Read,
}

/// A flash driver failure, tagged with the phase it happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashError {
    pub phase: FlashPhase,
    pub cause: DriverError,
}

impl FlashError {
    pub(crate) fn tag(phase: FlashPhase) -> impl FnOnce(DriverError) -> Self {
        move |cause| {
            #[cfg(feature = "defmt")]
            defmt::warn!("flash {} failed: {}", phase, cause);
            Self { phase, cause }
        }
    }
}

/// Block index outside the storage region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    /// Requested block index
    pub block: u32,
    /// Number of blocks in the region
    pub block_count: u32,
}

/// Inconsistent storage geometry
///
/// Only produced while constructing a region or device, never by I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    /// Block size is zero
    ZeroBlockSize,
    /// Page size is not a whole multiple of the block size
    PageNotBlockMultiple,
    /// Region base is not page-aligned
    BaseNotPageAligned,
    /// Region length is not a whole number of pages
    LengthNotPageMultiple,
    /// Region end lies beyond the 32-bit address space
    AddressOverflow,
    /// Region sizes disagree with the device's compile-time sizes
    SizeMismatch,
}

/// Block device errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Block index outside the region
    OutOfRange(OutOfRange),
    /// Flash driver failure
    Flash(FlashError),
    /// Device used before `init`
    NotInitialized,
    /// Buffer is not a whole number of blocks
    BufferLength,
}

impl From<OutOfRange> for Error {
    fn from(e: OutOfRange) -> Self {
        Error::OutOfRange(e)
    }
}

impl From<FlashError> for Error {
    fn from(e: FlashError) -> Self {
        Error::Flash(e)
    }
}
