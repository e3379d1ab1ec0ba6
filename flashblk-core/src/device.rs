//! Flash block device
//!
//! Public surface consumed by the filesystem. Block indices are translated
//! into the storage region; reads go to flash (or to the cache when the
//! block's page is resident), writes go through the page cache and only
//! reach flash on eviction or [`FlashBlockDevice::sync`].

use flashblk_hal::{CacheMaintenance, FlashDriver};

use crate::cache::PageCache;
use crate::error::{Error, FlashError, FlashPhase, GeometryError, OutOfRange};
use crate::region::StorageRegion;
use crate::traits::{BlockDevice, BlockIoctl};

/// Device lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Constructed, flash driver not brought up yet
    Uninitialized,
    /// Accepting block I/O
    Ready,
}

/// Block device over a flash region with a one-page write-back cache
///
/// `BLOCK_SIZE` and `PAGE_SIZE` must match the region's geometry. Every
/// operation takes `&mut self`; share between contexts with
/// [`crate::shared::SharedBlockDevice`].
pub struct FlashBlockDevice<F, C, const BLOCK_SIZE: usize = 512, const PAGE_SIZE: usize = 4096> {
    flash: F,
    cache_ctl: C,
    region: StorageRegion,
    cache: PageCache<PAGE_SIZE>,
    state: DeviceState,
}

impl<F, C, const BLOCK_SIZE: usize, const PAGE_SIZE: usize> FlashBlockDevice<F, C, BLOCK_SIZE, PAGE_SIZE>
where
    F: FlashDriver,
    C: CacheMaintenance,
{
    /// Create an uninitialized device over `region`
    pub fn new(flash: F, cache_ctl: C, region: StorageRegion) -> Result<Self, GeometryError> {
        if region.block_size() as usize != BLOCK_SIZE || region.page_size() as usize != PAGE_SIZE {
            return Err(GeometryError::SizeMismatch);
        }

        Ok(Self {
            flash,
            cache_ctl,
            region,
            cache: PageCache::new(),
            state: DeviceState::Uninitialized,
        })
    }

    /// Bring up the flash driver
    ///
    /// The driver is only initialized once; later calls return `Ok`.
    pub fn init(&mut self) -> Result<(), FlashError> {
        if self.state == DeviceState::Ready {
            return Ok(());
        }

        self.flash.init().map_err(FlashError::tag(FlashPhase::Init))?;
        self.state = DeviceState::Ready;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "flash block device ready: {} blocks of {} bytes at {=u32:#x}",
            self.region.block_count(),
            BLOCK_SIZE,
            self.region.base()
        );
        Ok(())
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn region(&self) -> &StorageRegion {
        &self.region
    }

    /// Number of blocks, valid in any state
    pub fn block_count(&self) -> u32 {
        self.region.block_count()
    }

    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Check if writes are buffered that a sync would put on flash
    pub fn has_pending_writes(&self) -> bool {
        self.cache.is_dirty()
    }

    /// Base address of the page held in the cache
    pub fn resident_page(&self) -> Option<u32> {
        self.cache.resident_page()
    }

    /// Read one block
    ///
    /// If the block's page is resident, the buffered content is returned so
    /// a read always observes earlier writes, synced or not.
    pub fn read_block(&mut self, block: u32) -> Result<[u8; BLOCK_SIZE], Error> {
        self.ensure_ready()?;
        let mut buf = [0u8; BLOCK_SIZE];
        self.read_into(block, &mut buf)?;
        Ok(buf)
    }

    /// Write one block into the cache
    ///
    /// Not durable until the next [`sync`](Self::sync). Writing to a page
    /// other than the resident one first writes the resident page back.
    pub fn write_block(&mut self, block: u32, data: &[u8; BLOCK_SIZE]) -> Result<(), Error> {
        self.ensure_ready()?;
        self.write_from(block, data)
    }

    /// Read consecutive blocks starting at `start` into `buf`
    ///
    /// `buf` must be a whole number of blocks. The whole span is range
    /// checked before any flash access.
    pub fn read_blocks(&mut self, start: u32, buf: &mut [u8]) -> Result<(), Error> {
        self.ensure_ready()?;
        let count = self.span_len(buf.len())?;
        self.check_span(start, count)?;

        for (i, chunk) in buf.chunks_exact_mut(BLOCK_SIZE).enumerate() {
            self.read_into(start + i as u32, chunk)?;
        }
        Ok(())
    }

    /// Write consecutive blocks starting at `start` from `data`
    pub fn write_blocks(&mut self, start: u32, data: &[u8]) -> Result<(), Error> {
        self.ensure_ready()?;
        let count = self.span_len(data.len())?;
        self.check_span(start, count)?;

        for (i, chunk) in data.chunks_exact(BLOCK_SIZE).enumerate() {
            self.write_from(start + i as u32, chunk)?;
        }
        Ok(())
    }

    /// Write the cached page back to flash
    ///
    /// The only operation that makes earlier writes durable. With nothing
    /// cached no flash operation is issued. Afterwards the CPU cache is
    /// asked to drop any stale view of the flash.
    pub fn sync(&mut self) -> Result<(), FlashError> {
        self.cache.flush(&mut self.flash)?;
        self.cache_ctl.invalidate_all();
        Ok(())
    }

    /// Forward a CPU cache invalidation request
    ///
    /// Does not touch the page cache.
    pub fn handle_cache_invalidation_request(&mut self) {
        self.cache_ctl.invalidate_all();
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn cache_maintenance(&self) -> &C {
        &self.cache_ctl
    }

    /// Take back the driver and cache hooks
    ///
    /// Unsynced writes are dropped; call [`sync`](Self::sync) first.
    pub fn release(self) -> (F, C) {
        (self.flash, self.cache_ctl)
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        match self.state {
            DeviceState::Ready => Ok(()),
            DeviceState::Uninitialized => Err(Error::NotInitialized),
        }
    }

    fn translate(&self, block: u32) -> Result<u32, OutOfRange> {
        self.region.translate(block).map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("block {} out of range ({} blocks)", e.block, e.block_count);
            e
        })
    }

    fn check_span(&self, start: u32, count: u32) -> Result<(), OutOfRange> {
        self.region.check_span(start, count).map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("blocks {}+{} out of range ({} blocks)", start, count, e.block_count);
            e
        })
    }

    fn span_len(&self, len: usize) -> Result<u32, Error> {
        if len % BLOCK_SIZE != 0 {
            return Err(Error::BufferLength);
        }
        u32::try_from(len / BLOCK_SIZE).map_err(|_| Error::BufferLength)
    }

    /// `buf` is exactly one block long
    fn read_into(&mut self, block: u32, buf: &mut [u8]) -> Result<(), Error> {
        let addr = self.translate(block)?;
        let page_base = self.region.page_base(addr);
        let offset = self.region.page_offset(addr);

        if self.cache.read_span(page_base, offset, buf) {
            return Ok(());
        }

        self.flash
            .read(addr, buf)
            .map_err(FlashError::tag(FlashPhase::Read))?;
        Ok(())
    }

    /// `data` is exactly one block long
    fn write_from(&mut self, block: u32, data: &[u8]) -> Result<(), Error> {
        let addr = self.translate(block)?;
        let page_base = self.region.page_base(addr);
        let offset = self.region.page_offset(addr);

        self.cache.load_if_needed(&mut self.flash, page_base)?;
        self.cache.write_span(offset, data);
        Ok(())
    }
}

impl<F, C, const BLOCK_SIZE: usize, const PAGE_SIZE: usize> BlockDevice
    for FlashBlockDevice<F, C, BLOCK_SIZE, PAGE_SIZE>
where
    F: FlashDriver,
    C: CacheMaintenance,
{
    type Error = Error;

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn block_count(&self) -> u32 {
        self.region.block_count()
    }

    fn init(&mut self) -> Result<(), Error> {
        FlashBlockDevice::init(self).map_err(Error::from)
    }

    fn sync(&mut self) -> Result<(), Error> {
        FlashBlockDevice::sync(self).map_err(Error::from)
    }

    fn read_block(&mut self, block: u32, buf: &mut [u8]) -> Result<(), Error> {
        if buf.len() != BLOCK_SIZE {
            return Err(Error::BufferLength);
        }
        self.ensure_ready()?;
        self.read_into(block, buf)
    }

    fn write_block(&mut self, block: u32, data: &[u8]) -> Result<(), Error> {
        if data.len() != BLOCK_SIZE {
            return Err(Error::BufferLength);
        }
        self.ensure_ready()?;
        self.write_from(block, data)
    }

    fn ioctl(&mut self, op: BlockIoctl) -> Result<u32, Error> {
        match op {
            BlockIoctl::Init => BlockDevice::init(self).map(|_| 0),
            BlockIoctl::Deinit | BlockIoctl::Sync => BlockDevice::sync(self).map(|_| 0),
            BlockIoctl::BlockCount => Ok(self.region.block_count()),
            BlockIoctl::BlockSize => Ok(BLOCK_SIZE as u32),
            BlockIoctl::BlockErase(block) => {
                // Erase happens page-wise on flush; only validate the index
                self.translate(block)?;
                Ok(0)
            }
            BlockIoctl::IrqHandler => {
                self.handle_cache_invalidation_request();
                Ok(0)
            }
        }
    }
}
