//! Single-page write-back cache
//!
//! Flash can only be erased and programmed a whole page at a time, while the
//! filesystem writes single blocks. The cache holds one page in RAM, absorbs
//! every block write that lands in it, and only runs the erase+program cycle
//! when a write moves to another page or the caller syncs.
//!
//! At most one page is resident. While it is, the buffer is the authoritative
//! content of that page; flash may be stale until the next successful flush.

use flashblk_hal::FlashDriver;

use crate::error::{FlashError, FlashPhase};

/// Write-back cache for one flash page of `PAGE_SIZE` bytes
pub struct PageCache<const PAGE_SIZE: usize> {
    /// Base address of the resident page
    resident: Option<u32>,
    /// Buffer differs from flash
    dirty: bool,
    buffer: [u8; PAGE_SIZE],
}

impl<const PAGE_SIZE: usize> PageCache<PAGE_SIZE> {
    /// Create an empty cache
    pub const fn new() -> Self {
        Self {
            resident: None,
            dirty: false,
            buffer: [0; PAGE_SIZE],
        }
    }

    /// Base address of the resident page, if any
    pub fn resident_page(&self) -> Option<u32> {
        self.resident
    }

    /// Check if the resident page has writes not yet on flash
    pub fn is_dirty(&self) -> bool {
        self.resident.is_some() && self.dirty
    }

    /// Write the resident page back to flash and release it
    ///
    /// With no page resident this does nothing. A clean page is released
    /// without touching flash. If erase or program fails the page stays
    /// resident and dirty, so a later flush retries the same write-back.
    pub fn flush<F: FlashDriver>(&mut self, flash: &mut F) -> Result<(), FlashError> {
        let Some(base) = self.resident else {
            return Ok(());
        };

        if self.dirty {
            #[cfg(feature = "defmt")]
            defmt::trace!("flushing page {=u32:#x}", base);

            flash
                .erase(base, PAGE_SIZE)
                .map_err(FlashError::tag(FlashPhase::Erase))?;
            flash
                .write(base, &self.buffer)
                .map_err(FlashError::tag(FlashPhase::Program))?;
        }

        self.resident = None;
        self.dirty = false;
        Ok(())
    }

    /// Make `page_base` the resident page
    ///
    /// No-op if it already is. Otherwise the current page is flushed first
    /// and the target page is read from flash. If that read fails the cache
    /// is left empty.
    pub fn load_if_needed<F: FlashDriver>(
        &mut self,
        flash: &mut F,
        page_base: u32,
    ) -> Result<(), FlashError> {
        if self.resident == Some(page_base) {
            return Ok(());
        }

        self.flush(flash)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("loading page {=u32:#x}", page_base);

        flash
            .read(page_base, &mut self.buffer)
            .map_err(FlashError::tag(FlashPhase::Read))?;
        self.resident = Some(page_base);
        self.dirty = false;
        Ok(())
    }

    /// Copy `data` into the resident page at `offset`
    ///
    /// The page must be resident. `offset + data.len()` past `PAGE_SIZE`
    /// is a caller bug and panics.
    pub fn write_span(&mut self, offset: usize, data: &[u8]) {
        debug_assert!(self.resident.is_some(), "write_span with no resident page");
        self.buffer[offset..offset + data.len()].copy_from_slice(data);
        self.dirty = true;
    }

    /// Copy buffered bytes at `offset` of page `page_base` into `out`
    ///
    /// Returns `false` without touching `out` if that page is not resident.
    pub fn read_span(&self, page_base: u32, offset: usize, out: &mut [u8]) -> bool {
        if self.resident != Some(page_base) {
            return false;
        }
        out.copy_from_slice(&self.buffer[offset..offset + out.len()]);
        true
    }
}

impl<const PAGE_SIZE: usize> Default for PageCache<PAGE_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
