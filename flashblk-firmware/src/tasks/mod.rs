//! Embassy async tasks
//!
//! Tasks share the block device through its mutex; each device call holds
//! the lock only for its own duration.

pub mod sync;

pub use self_test::self_test_task;
pub use sync::sync_task;
