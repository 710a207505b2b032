//! Buffer pool management
//!
//! A fixed number of page-sized frames is shared by all registered files.
//! Resident pages are found through the page table; on a miss the clock
//! replacer picks a frame to reuse, writing its old page back first if it
//! was modified.

mod error;
mod frame;
mod manager;
mod page_table;
mod pool;
mod replacer;
mod stats;

pub use error::{BufferError, BufferResult};
pub use frame::{FrameDesc, FrameId};
pub use manager::{BufferManager, PageRef};
pub use page_table::PageTable;
pub use pool::BufferPool;
pub use replacer::ClockReplacer;
pub use stats::BufferStats;

/// Number of frames used by [`BufferManager::new`]
pub const DEFAULT_POOL_SIZE: usize = 64;
