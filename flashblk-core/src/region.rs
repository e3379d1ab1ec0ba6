//! Storage region and block address translation
//!
//! Maps logical block indices onto physical flash addresses inside the
//! region reserved for the block device.

use crate::error::{GeometryError, OutOfRange};

/// The flash range reserved for the block device, and its geometry
///
/// Base and length are page-aligned so that erasing any page of the region
/// never touches flash outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageRegion {
    base: u32,
    len: u32,
    block_size: u32,
    page_size: u32,
}

impl StorageRegion {
    /// Describe a region, checking that its geometry is consistent
    pub fn new(base: u32, len: u32, block_size: u32, page_size: u32) -> Result<Self, GeometryError> {
        if block_size == 0 {
            return Err(GeometryError::ZeroBlockSize);
        }
        if page_size == 0 || page_size % block_size != 0 {
            return Err(GeometryError::PageNotBlockMultiple);
        }
        if base % page_size != 0 {
            return Err(GeometryError::BaseNotPageAligned);
        }
        if len % page_size != 0 {
            return Err(GeometryError::LengthNotPageMultiple);
        }
        base.checked_add(len).ok_or(GeometryError::AddressOverflow)?;

        Ok(Self {
            base,
            len,
            block_size,
            page_size,
        })
    }

    /// First physical address of the region
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Region length in bytes
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Check if the region holds no blocks
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last physical address of the region
    pub fn end(&self) -> u32 {
        // Cannot overflow, checked in `new`
        self.base + self.len
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of whole blocks in the region
    pub fn block_count(&self) -> u32 {
        self.len / self.block_size
    }

    /// Blocks per erase page
    pub fn blocks_per_page(&self) -> u32 {
        self.page_size / self.block_size
    }

    /// Translate a block index to its physical address
    ///
    /// Succeeds only if the whole block lies inside the region.
    pub fn translate(&self, block: u32) -> Result<u32, OutOfRange> {
        let out_of_range = OutOfRange {
            block,
            block_count: self.block_count(),
        };

        let offset = block
            .checked_mul(self.block_size)
            .ok_or(out_of_range)?;
        let addr = self.base.checked_add(offset).ok_or(out_of_range)?;
        match addr.checked_add(self.block_size) {
            Some(block_end) if block_end <= self.end() => Ok(addr),
            _ => Err(out_of_range),
        }
    }

    /// Check that `count` blocks starting at `start` all lie in the region
    pub fn check_span(&self, start: u32, count: u32) -> Result<(), OutOfRange> {
        if count == 0 {
            return Ok(());
        }
        let last = start.checked_add(count - 1).ok_or(OutOfRange {
            block: u32::MAX,
            block_count: self.block_count(),
        })?;
        self.translate(start)?;
        self.translate(last)?;
        Ok(())
    }

    /// Base address of the page containing `addr`
    pub fn page_base(&self, addr: u32) -> u32 {
        addr - addr % self.page_size
    }

    /// Offset of `addr` within its page
    pub fn page_offset(&self, addr: u32) -> usize {
        (addr % self.page_size) as usize
    }

    /// Check if a physical address lies inside the region
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && addr < self.end()
    }
}
