//! CPU cache maintenance
//!
//! Flash that is also memory-mapped for execute-in-place may be shadowed by
//! a processor data cache. After flash content changes, that cache has to be
//! invalidated before the new content is visible through the mapping.

/// Processor cache invalidation hook
pub trait CacheMaintenance {
    /// Invalidate every data cache line that may shadow flash content
    fn invalidate_all(&mut self);
}

/// Cache maintenance for parts without a flash data cache
///
/// Also suitable for chips whose flash driver already flushes the cache
/// after every erase or program.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCacheMaintenance;

impl CacheMaintenance for NoCacheMaintenance {
    fn invalidate_all(&mut self) {}
}
