use ahash::AHashMap;

use super::error::{FileError, FileResult};
use super::{FileId, INVALID_PAGE, PAGE_SIZE, Page, PageId, PagedFile};

/// Number of calls made against a [`MemFile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub reads: usize,
    pub writes: usize,
    pub allocations: usize,
    pub deletions: usize,
}

/// In-memory paged file
///
/// Behaves like [`DiskFile`](super::DiskFile) (page numbers start at 1, deleted
/// numbers are reused) but keeps everything in a map and counts every call,
/// which makes write-back observable.
pub struct MemFile {
    id: FileId,
    pages: AHashMap<PageId, Box<[u8; PAGE_SIZE]>>,
    free_pages: Vec<PageId>,
    next_page: PageId,
    counters: IoCounters,
}

impl MemFile {
    /// Create an empty file with the given identity
    pub fn new(id: u64) -> Self {
        Self {
            id: FileId(id),
            pages: AHashMap::new(),
            free_pages: Vec::new(),
            next_page: INVALID_PAGE + 1,
            counters: IoCounters::default(),
        }
    }

    /// Create a file with `count` allocated pages, each stamped with its own
    /// page number in the first four bytes. Not counted as I/O.
    pub fn with_pages(id: u64, count: usize) -> Self {
        let mut file = Self::new(id);
        for _ in 0..count {
            let number = file.next_page;
            file.next_page += 1;
            let mut data = Box::new([0u8; PAGE_SIZE]);
            data[..4].copy_from_slice(&number.to_le_bytes());
            file.pages.insert(number, data);
        }
        file
    }

    /// Current content of a page, bypassing the counters
    pub fn page_content(&self, page_number: PageId) -> Option<&[u8]> {
        self.pages.get(&page_number).map(|data| &data[..])
    }

    /// Whether a page is currently allocated
    pub fn contains_page(&self, page_number: PageId) -> bool {
        self.pages.contains_key(&page_number)
    }

    /// Number of allocated pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn counters(&self) -> IoCounters {
        self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters = IoCounters::default();
    }
}

impl PagedFile for MemFile {
    fn identity(&self) -> FileId {
        self.id
    }

    fn read_page(&mut self, page_number: PageId) -> FileResult<Page> {
        self.counters.reads += 1;
        let data = self
            .pages
            .get(&page_number)
            .ok_or(FileError::PageNotFound { page: page_number })?;
        Ok(Page::from_bytes(page_number, data.clone()))
    }

    fn write_page(&mut self, page: &Page) -> FileResult<()> {
        self.counters.writes += 1;
        let data = self
            .pages
            .get_mut(&page.page_number())
            .ok_or(FileError::PageNotFound {
                page: page.page_number(),
            })?;
        data.copy_from_slice(page.data());
        Ok(())
    }

    fn allocate_page(&mut self) -> FileResult<Page> {
        self.counters.allocations += 1;
        let number = match self.free_pages.pop() {
            Some(number) => number,
            None => {
                let number = self.next_page;
                self.next_page += 1;
                number
            }
        };
        self.pages.insert(number, Box::new([0u8; PAGE_SIZE]));
        Ok(Page::new(number))
    }

    fn delete_page(&mut self, page_number: PageId) -> FileResult<()> {
        self.counters.deletions += 1;
        self.pages
            .remove(&page_number)
            .ok_or(FileError::PageNotFound { page: page_number })?;
        self.free_pages.push(page_number);
        Ok(())
    }
}
