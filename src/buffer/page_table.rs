use ahash::AHashMap;

use super::FrameId;
use crate::file::{FileId, PageId};

/// Maps resident (file, page) pairs to the frame holding them
pub struct PageTable {
    map: AHashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: AHashMap::with_capacity(capacity),
        }
    }

    /// Frame holding the page, or `None` if it is not resident
    pub fn lookup(&self, file: FileId, page_number: PageId) -> Option<FrameId> {
        self.map.get(&(file, page_number)).copied()
    }

    /// Register a page; returns the frame it was previously mapped to, if any
    pub fn insert(&mut self, file: FileId, page_number: PageId, frame: FrameId) -> Option<FrameId> {
        self.map.insert((file, page_number), frame)
    }

    pub fn remove(&mut self, file: FileId, page_number: PageId) -> Option<FrameId> {
        self.map.remove(&(file, page_number))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
