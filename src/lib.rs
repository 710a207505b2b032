pub mod buffer;
pub mod file;

pub use buffer::{
    BufferError, BufferManager, BufferResult, BufferStats, DEFAULT_POOL_SIZE, FrameDesc, FrameId,
    PageRef,
};
pub use file::{
    DiskFile, FileError, FileId, FileResult, INVALID_PAGE, MemFile, PAGE_SIZE, Page, PageId,
    PagedFile,
};
