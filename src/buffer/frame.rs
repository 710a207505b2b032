//! Per-frame bookkeeping for the buffer pool.

use std::fmt;

use crate::file::{FileId, INVALID_PAGE, PageId};

/// Index of a slot in the buffer pool
pub type FrameId = usize;

/// Descriptor of one buffer frame
///
/// An invalid frame always has no owner, no pins, and clear dirty and
/// reference bits.
#[derive(Debug, Clone)]
pub struct FrameDesc {
    frame_no: FrameId,
    pub(crate) file: Option<FileId>,
    pub(crate) page_number: PageId,
    pub(crate) pin_count: u32,
    pub(crate) dirty: bool,
    pub(crate) valid: bool,
    pub(crate) ref_bit: bool,
    /// Bumped every time a page is installed, so old handles can be detected
    pub(crate) generation: u64,
}

impl FrameDesc {
    pub fn new(frame_no: FrameId) -> Self {
        Self {
            frame_no,
            file: None,
            page_number: INVALID_PAGE,
            pin_count: 0,
            dirty: false,
            valid: false,
            ref_bit: false,
            generation: 0,
        }
    }

    /// Install a freshly loaded page, pinned once
    pub(crate) fn set(&mut self, file: FileId, page_number: PageId) {
        self.file = Some(file);
        self.page_number = page_number;
        self.pin_count = 1;
        self.dirty = false;
        self.valid = true;
        self.ref_bit = true;
        self.generation += 1;
    }

    /// Return the frame to the empty state
    pub(crate) fn clear(&mut self) {
        self.file = None;
        self.page_number = INVALID_PAGE;
        self.pin_count = 0;
        self.dirty = false;
        self.valid = false;
        self.ref_bit = false;
    }

    /// Record another holder of the page
    pub(crate) fn pin(&mut self) {
        self.pin_count += 1;
        self.ref_bit = true;
    }

    /// Drop one holder. Returns `false` if the frame was not pinned.
    pub(crate) fn unpin(&mut self) -> bool {
        if self.pin_count == 0 {
            return false;
        }
        self.pin_count -= 1;
        true
    }

    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    pub fn file(&self) -> Option<FileId> {
        self.file
    }

    pub fn page_number(&self) -> PageId {
        self.page_number
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn ref_bit(&self) -> bool {
        self.ref_bit
    }

    pub fn is_owned_by(&self, file: FileId) -> bool {
        self.file == Some(file)
    }
}

impl fmt::Display for FrameDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file {
            Some(file) => write!(f, "{} ", file)?,
            None => write!(f, "file:none ")?,
        }
        write!(
            f,
            "pageNo:{} valid:{} pinCnt:{} dirty:{} refbit:{}",
            self.page_number, self.valid, self.pin_count, self.dirty, self.ref_bit
        )
    }
}
