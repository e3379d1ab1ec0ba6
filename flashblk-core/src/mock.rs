//! RAM-backed flash for unit tests
//!
//! Records every driver call so tests can assert on the exact erase/program
//! traffic, and can be told to fail a given phase.

use flashblk_hal::{CacheMaintenance, DriverError, FlashDriver};
use heapless::Vec;

use crate::error::FlashPhase;

/// Simulated flash size, starting at address 0
pub const MOCK_FLASH_SIZE: usize = 0x8000;

/// Erase granularity of the simulated part
pub const MOCK_PAGE_SIZE: usize = 4096;

/// A recorded driver call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    Init,
    Erase { addr: u32, len: usize },
    Read { addr: u32, len: usize },
    Write { addr: u32, len: usize },
}

pub struct MockFlash {
    data: [u8; MOCK_FLASH_SIZE],
    ops: Vec<FlashOp, 128>,
    fail: Option<FlashPhase>,
}

impl MockFlash {
    /// Create a fully erased flash
    pub fn new() -> Self {
        Self {
            data: [0xFF; MOCK_FLASH_SIZE],
            ops: Vec::new(),
            fail: None,
        }
    }

    /// Make every call of the given phase fail until cleared
    pub fn fail_on(&mut self, phase: Option<FlashPhase>) {
        self.fail = phase;
    }

    pub fn ops(&self) -> &[FlashOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn count(&self, pred: impl Fn(&FlashOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn erase_count(&self) -> usize {
        self.count(|op| matches!(op, FlashOp::Erase { .. }))
    }

    pub fn write_count(&self) -> usize {
        self.count(|op| matches!(op, FlashOp::Write { .. }))
    }

    /// Raw flash content, bypassing the driver interface
    pub fn raw(&self, addr: u32, len: usize) -> &[u8] {
        &self.data[addr as usize..addr as usize + len]
    }

    fn record(&mut self, op: FlashOp, phase: FlashPhase) -> Result<(), DriverError> {
        // Log full means a test is looping, not a driver condition
        self.ops.push(op).expect("mock flash op log full");
        if self.fail == Some(phase) {
            return Err(DriverError::Failed);
        }
        Ok(())
    }

    fn check_page(addr: u32, len: usize) -> Result<(), DriverError> {
        if addr as usize % MOCK_PAGE_SIZE != 0 || len != MOCK_PAGE_SIZE {
            return Err(DriverError::NotAligned);
        }
        Self::check_bounds(addr, len)
    }

    fn check_bounds(addr: u32, len: usize) -> Result<(), DriverError> {
        if addr as usize + len > MOCK_FLASH_SIZE {
            return Err(DriverError::OutOfBounds);
        }
        Ok(())
    }
}

impl FlashDriver for MockFlash {
    fn init(&mut self) -> Result<(), DriverError> {
        self.record(FlashOp::Init, FlashPhase::Init)
    }

    fn erase(&mut self, addr: u32, len: usize) -> Result<(), DriverError> {
        self.record(FlashOp::Erase { addr, len }, FlashPhase::Erase)?;
        Self::check_page(addr, len)?;
        self.data[addr as usize..addr as usize + len].fill(0xFF);
        Ok(())
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), DriverError> {
        let len = buf.len();
        self.record(FlashOp::Read { addr, len }, FlashPhase::Read)?;
        Self::check_bounds(addr, len)?;
        buf.copy_from_slice(&self.data[addr as usize..addr as usize + len]);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), DriverError> {
        let len = data.len();
        self.record(FlashOp::Write { addr, len }, FlashPhase::Program)?;
        Self::check_page(addr, len)?;
        let target = &mut self.data[addr as usize..addr as usize + len];
        assert!(
            target.iter().all(|&b| b == 0xFF),
            "program without erase at {:#x}",
            addr
        );
        target.copy_from_slice(data);
        Ok(())
    }
}

/// Counts cache invalidation requests
#[derive(Debug, Default)]
pub struct MockCache {
    pub invalidations: usize,
}

impl CacheMaintenance for MockCache {
    fn invalidate_all(&mut self) {
        self.invalidations += 1;
    }
}
