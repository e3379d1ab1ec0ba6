//! Block device trait and control operations

/// Control operations of the conventional block-device protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockIoctl {
    /// Bring up the device
    Init,
    /// Shut down the device, writing back pending data
    Deinit,
    /// Write back pending data
    Sync,
    /// Query the number of blocks
    BlockCount,
    /// Query the block size in bytes
    BlockSize,
    /// Discard a block (argument: block index)
    BlockErase(u32),
    /// Acknowledge a cache invalidation request
    IrqHandler,
}

impl BlockIoctl {
    /// Decode a numeric operation code with its argument
    ///
    /// Codes 1-6 follow the usual block-device protocol numbering; 0x100 is
    /// the cache invalidation hook.
    pub fn from_raw(op: u32, arg: u32) -> Option<Self> {
        match op {
            1 => Some(BlockIoctl::Init),
            2 => Some(BlockIoctl::Deinit),
            3 => Some(BlockIoctl::Sync),
            4 => Some(BlockIoctl::BlockCount),
            5 => Some(BlockIoctl::BlockSize),
            6 => Some(BlockIoctl::BlockErase(arg)),
            0x100 => Some(BlockIoctl::IrqHandler),
            _ => None,
        }
    }

    /// Numeric operation code
    pub fn as_raw(self) -> u32 {
        match self {
            BlockIoctl::Init => 1,
            BlockIoctl::Deinit => 2,
            BlockIoctl::Sync => 3,
            BlockIoctl::BlockCount => 4,
            BlockIoctl::BlockSize => 5,
            BlockIoctl::BlockErase(_) => 6,
            BlockIoctl::IrqHandler => 0x100,
        }
    }
}

/// Fixed-size-block storage
///
/// Writes are not guaranteed durable until [`BlockDevice::sync`] returns.
/// Callers serialize all calls; implementations hold no internal lock.
pub trait BlockDevice {
    /// Error returned by device operations
    type Error;

    /// Block size in bytes
    fn block_size(&self) -> usize;

    /// Number of blocks on the device
    fn block_count(&self) -> u32;

    /// Bring up the device; calling it again is harmless
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Make every previous write durable
    fn sync(&mut self) -> Result<(), Self::Error>;

    /// Read one block into `buf`, which must be exactly one block long
    fn read_block(&mut self, block: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write one block from `data`, which must be exactly one block long
    fn write_block(&mut self, block: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Run a control operation, returning its numeric result
    fn ioctl(&mut self, op: BlockIoctl) -> Result<u32, Self::Error> {
        match op {
            BlockIoctl::Init => self.init().map(|_| 0),
            BlockIoctl::Deinit | BlockIoctl::Sync => self.sync().map(|_| 0),
            BlockIoctl::BlockCount => Ok(self.block_count()),
            BlockIoctl::BlockSize => Ok(self.block_size() as u32),
            BlockIoctl::BlockErase(_) | BlockIoctl::IrqHandler => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ioctl_codes() {
        let ops = [
            BlockIoctl::Init,
            BlockIoctl::Deinit,
            BlockIoctl::Sync,
            BlockIoctl::BlockCount,
            BlockIoctl::BlockSize,
            BlockIoctl::BlockErase(7),
            BlockIoctl::IrqHandler,
        ];
        for op in ops {
            assert_eq!(BlockIoctl::from_raw(op.as_raw(), 7), Some(op));
        }
        assert_eq!(BlockIoctl::from_raw(0, 0), None);
        assert_eq!(BlockIoctl::from_raw(7, 0), None);
    }
}
