use super::FrameId;
use crate::file::Page;

/// Page storage for every frame, indexed by frame id
pub struct BufferPool {
    slots: Vec<Page>,
}

impl BufferPool {
    pub fn new(num_frames: usize) -> Self {
        Self {
            slots: (0..num_frames).map(|_| Page::empty()).collect(),
        }
    }

    pub fn get(&self, frame: FrameId) -> &Page {
        &self.slots[frame]
    }

    pub fn get_mut(&mut self, frame: FrameId) -> &mut Page {
        &mut self.slots[frame]
    }

    /// Replace the content of a frame with a newly loaded page
    pub fn install(&mut self, frame: FrameId, page: Page) {
        self.slots[frame] = page;
    }
}
