mod disk_file;
mod error;
mod memory;
mod page;

pub use disk_file::DiskFile;
pub use error::{FileError, FileResult};
pub use memory::{IoCounters, MemFile};
pub use page::Page;

use std::fmt;

/// Page size in bytes (8KB)
pub const PAGE_SIZE: usize = 8192;

/// Page number type. Page numbers start at 1 within a file.
pub type PageId = u32;

/// Sentinel page number for a page that was never assigned one
pub const INVALID_PAGE: PageId = 0;

/// Stable identity of a paged file, used as the first half of page table keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file:{:x}", self.0)
    }
}

/// A file made of fixed-size pages.
///
/// This is the only way the buffer manager touches storage. Implementations
/// decide how page numbers are assigned and what happens to deleted pages.
pub trait PagedFile {
    /// Identity of this file. Must stay the same for the file's lifetime.
    fn identity(&self) -> FileId;

    /// Read an existing page. Fails if the page was never allocated or was deleted.
    fn read_page(&mut self, page_number: PageId) -> FileResult<Page>;

    /// Persist a page at the page number it carries.
    fn write_page(&mut self, page: &Page) -> FileResult<()>;

    /// Append a new zeroed page and return it with its assigned page number.
    fn allocate_page(&mut self) -> FileResult<Page>;

    /// Remove a page from the file.
    fn delete_page(&mut self, page_number: PageId) -> FileResult<()>;
}
