use ahash::AHashMap;
use std::fmt;
use tracing::{debug, trace, warn};

use super::error::{BufferError, BufferResult};
use super::frame::{FrameDesc, FrameId};
use super::page_table::PageTable;
use super::pool::BufferPool;
use super::replacer::ClockReplacer;
use super::stats::BufferStats;
use super::DEFAULT_POOL_SIZE;
use crate::file::{FileId, INVALID_PAGE, Page, PageId, PagedFile};

/// Handle to a pinned page in the buffer pool
///
/// The handle is checked against the frame on every access through
/// [`BufferManager::page`] and [`BufferManager::page_mut`]. Once the frame has
/// been reused for another page, or the page is no longer pinned by anyone,
/// access fails with [`BufferError::StalePageRef`]. Pins are counted per page,
/// not per handle, so a handle stays usable while any holder keeps the page
/// pinned.
#[derive(Debug)]
#[must_use = "a fetched page stays pinned until it is released"]
pub struct PageRef {
    file: FileId,
    page_number: PageId,
    frame: FrameId,
    generation: u64,
}

impl PageRef {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn page_number(&self) -> PageId {
        self.page_number
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }
}

/// Fixed-size buffer pool with clock replacement
///
/// Owns the files whose pages it caches. Pages are pinned by
/// [`fetch_page`](Self::fetch_page) and [`allocate_page`](Self::allocate_page)
/// and must be unpinned before their frame can be reused.
pub struct BufferManager<F: PagedFile> {
    /// Registered files, keyed by their identity
    files: AHashMap<FileId, F>,
    /// Frame descriptors, one per pool slot
    frames: Vec<FrameDesc>,
    /// Page content, one per frame
    pool: BufferPool,
    /// Resident (file, page) -> frame
    page_table: PageTable,
    clock: ClockReplacer,
    stats: BufferStats,
}

impl<F: PagedFile> BufferManager<F> {
    /// Create a new buffer manager with the default number of frames
    pub fn new() -> Self {
        Self::build(DEFAULT_POOL_SIZE)
    }

    /// Create a new buffer manager with specified capacity
    pub fn with_capacity(num_frames: usize) -> BufferResult<Self> {
        if num_frames == 0 {
            return Err(BufferError::EmptyPool);
        }
        Ok(Self::build(num_frames))
    }

    fn build(num_frames: usize) -> Self {
        Self {
            files: AHashMap::new(),
            frames: (0..num_frames).map(FrameDesc::new).collect(),
            pool: BufferPool::new(num_frames),
            // Headroom so the table never rehashes at capacity
            page_table: PageTable::with_capacity(num_frames + num_frames / 5 + 1),
            clock: ClockReplacer::new(num_frames),
            stats: BufferStats::default(),
        }
    }

    /// Hand a file over to the manager
    pub fn register_file(&mut self, file: F) -> BufferResult<FileId> {
        let id = file.identity();
        if self.files.contains_key(&id) {
            return Err(BufferError::DuplicateFile(id));
        }
        self.files.insert(id, file);
        debug!(%id, "registered file");
        Ok(id)
    }

    /// Flush a file and take it back
    pub fn unregister_file(&mut self, file: FileId) -> BufferResult<F> {
        self.flush_file(file)?;
        let removed = self
            .files
            .remove(&file)
            .ok_or(BufferError::UnknownFile(file))?;
        debug!(id = %file, "unregistered file");
        Ok(removed)
    }

    /// Get a reference to a registered file
    pub fn file(&self, file: FileId) -> Option<&F> {
        self.files.get(&file)
    }

    /// Get a mutable reference to a registered file
    ///
    /// Writing pages that are currently resident through this reference
    /// bypasses the pool; the cached copy wins on the next write-back.
    /// Deleting resident pages through it is unsupported: use
    /// [`dispose_page`](Self::dispose_page). If the file later reissues such a
    /// page number, the stale cached copy is discarded without write-back.
    pub fn file_mut(&mut self, file: FileId) -> Option<&mut F> {
        self.files.get_mut(&file)
    }

    /// Pin a page, reading it from its file if it is not resident
    pub fn fetch_page(&mut self, file: FileId, page_number: PageId) -> BufferResult<PageRef> {
        self.stats.accesses += 1;

        if let Some(frame) = self.page_table.lookup(file, page_number) {
            trace!(%file, page = page_number, frame, "buffer hit");
            let desc = &mut self.frames[frame];
            desc.pin();
            return Ok(PageRef {
                file,
                page_number,
                frame,
                generation: desc.generation,
            });
        }

        if !self.files.contains_key(&file) {
            return Err(BufferError::UnknownFile(file));
        }

        // Pick the frame before reading, but only evict once the read worked
        let frame = self.clock.select_victim(&mut self.frames)?;
        let page = self
            .files
            .get_mut(&file)
            .ok_or(BufferError::UnknownFile(file))?
            .read_page(page_number)?;
        self.stats.disk_reads += 1;
        trace!(%file, page = page_number, frame, "buffer miss");

        self.evict(frame)?;
        Ok(self.install(frame, file, page))
    }

    /// Drop one pin on a page. Unknown pages are ignored.
    pub fn unpin_page(&mut self, file: FileId, page_number: PageId, dirty: bool) -> BufferResult<()> {
        let Some(frame) = self.page_table.lookup(file, page_number) else {
            return Ok(());
        };

        let desc = &mut self.frames[frame];
        if !desc.unpin() {
            return Err(BufferError::PageNotPinned {
                file,
                page: page_number,
                frame,
            });
        }
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    /// Unpin the page behind a handle, consuming it
    pub fn release(&mut self, page: PageRef, dirty: bool) -> BufferResult<()> {
        self.unpin_page(page.file, page.page_number, dirty)
    }

    /// Allocate a new page in a file and pin it in the pool
    pub fn allocate_page(&mut self, file: FileId) -> BufferResult<(PageId, PageRef)> {
        self.stats.accesses += 1;

        if !self.files.contains_key(&file) {
            return Err(BufferError::UnknownFile(file));
        }

        // Secure a frame first so a full pool doesn't leak a page in the file
        let frame = self.alloc_frame()?;
        let page = self
            .files
            .get_mut(&file)
            .ok_or(BufferError::UnknownFile(file))?
            .allocate_page()?;
        let page_number = page.page_number();
        debug!(%file, page = page_number, frame, "allocated page");

        Ok((page_number, self.install(frame, file, page)))
    }

    /// Delete a page from its file, dropping any cached copy without writing it
    ///
    /// Fails with [`BufferError::PagePinned`] if the page is resident and
    /// pinned; neither the pool nor the file is touched in that case.
    pub fn dispose_page(&mut self, file: FileId, page_number: PageId) -> BufferResult<()> {
        if !self.files.contains_key(&file) {
            return Err(BufferError::UnknownFile(file));
        }

        if let Some(frame) = self.page_table.lookup(file, page_number) {
            if self.frames[frame].pin_count > 0 {
                return Err(BufferError::PagePinned {
                    file,
                    page: page_number,
                    frame,
                });
            }
            self.page_table.remove(file, page_number);
            self.frames[frame].clear();
            debug!(%file, page = page_number, frame, "dropped cached page");
        }

        self.files
            .get_mut(&file)
            .ok_or(BufferError::UnknownFile(file))?
            .delete_page(page_number)?;
        Ok(())
    }

    /// Write back and evict every resident page of a file
    ///
    /// Frames are visited in ascending order. Hitting a pinned page aborts
    /// the flush with [`BufferError::PagePinned`]; pages visited before it
    /// stay written back and evicted.
    pub fn flush_file(&mut self, file: FileId) -> BufferResult<()> {
        if !self.files.contains_key(&file) {
            return Err(BufferError::UnknownFile(file));
        }

        for frame in 0..self.frames.len() {
            let desc = &self.frames[frame];
            if !desc.is_owned_by(file) {
                continue;
            }
            if desc.valid && desc.page_number == INVALID_PAGE {
                return Err(BufferError::InvalidPageEncountered { file, frame });
            }
            if desc.pin_count > 0 {
                return Err(BufferError::PagePinned {
                    file,
                    page: desc.page_number,
                    frame,
                });
            }
            self.evict(frame)?;
        }

        debug!(%file, "flushed file");
        Ok(())
    }

    /// Write back every dirty page, pinned or not, without evicting anything
    pub fn flush_all(&mut self) -> BufferResult<()> {
        for (frame, desc) in self.frames.iter_mut().enumerate() {
            if !desc.valid || !desc.dirty {
                continue;
            }
            let Some(owner) = desc.file else {
                continue;
            };
            self.files
                .get_mut(&owner)
                .ok_or(BufferError::UnknownFile(owner))?
                .write_page(self.pool.get(frame))?;
            desc.dirty = false;
            self.stats.disk_writes += 1;
        }
        Ok(())
    }

    /// Read access to a pinned page
    pub fn page(&self, page: &PageRef) -> BufferResult<&Page> {
        self.check_ref(page)?;
        Ok(self.pool.get(page.frame))
    }

    /// Write access to a pinned page. Release it with `dirty = true` afterwards.
    pub fn page_mut(&mut self, page: &PageRef) -> BufferResult<&mut Page> {
        self.check_ref(page)?;
        Ok(self.pool.get_mut(page.frame))
    }

    fn check_ref(&self, page: &PageRef) -> BufferResult<()> {
        let live = self.frames.get(page.frame).is_some_and(|desc| {
            desc.valid && desc.generation == page.generation && desc.pin_count > 0
        });
        if !live {
            return Err(BufferError::StalePageRef {
                file: page.file,
                page: page.page_number,
            });
        }
        Ok(())
    }

    /// Find a frame that can be overwritten, writing back its old page if needed
    fn alloc_frame(&mut self) -> BufferResult<FrameId> {
        let frame = self.clock.select_victim(&mut self.frames)?;
        self.evict(frame)?;
        Ok(frame)
    }

    /// Write back (if dirty), unmap and clear a frame. No-op on an empty frame.
    fn evict(&mut self, frame: FrameId) -> BufferResult<()> {
        let desc = &self.frames[frame];
        if !desc.valid {
            return Ok(());
        }
        let page_number = desc.page_number;
        let Some(owner) = desc.file else {
            return Ok(());
        };

        if desc.dirty {
            self.files
                .get_mut(&owner)
                .ok_or(BufferError::UnknownFile(owner))?
                .write_page(self.pool.get(frame))?;
            self.stats.disk_writes += 1;
            debug!(file = %owner, page = page_number, frame, "wrote back dirty page");
        }

        self.page_table.remove(owner, page_number);
        self.frames[frame].clear();
        Ok(())
    }

    /// Put a page into a cleared frame and pin it
    fn install(&mut self, frame: FrameId, file: FileId, page: Page) -> PageRef {
        let page_number = page.page_number();
        self.pool.install(frame, page);
        // A reissued page number still cached elsewhere is a copy of a page
        // deleted outside the pool; it is dropped unwritten.
        if let Some(stale) = self.page_table.insert(file, page_number, frame)
            && stale != frame
        {
            warn!(%file, page = page_number, frame = stale, "dropped stale copy of reissued page");
            self.frames[stale].clear();
        }

        let desc = &mut self.frames[frame];
        desc.set(file, page_number);
        PageRef {
            file,
            page_number,
            frame,
            generation: desc.generation,
        }
    }

    /// Get the number of frames in the pool
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Check if a page is in the buffer pool
    pub fn is_page_cached(&self, file: FileId, page_number: PageId) -> bool {
        self.page_table.lookup(file, page_number).is_some()
    }

    /// Pin count of a resident page
    pub fn pin_count(&self, file: FileId, page_number: PageId) -> Option<u32> {
        self.page_table
            .lookup(file, page_number)
            .map(|frame| self.frames[frame].pin_count)
    }

    /// Get the number of pages currently in the buffer pool
    pub fn resident_page_count(&self) -> usize {
        self.page_table.len()
    }

    /// Get the number of dirty pages in the buffer pool
    pub fn dirty_page_count(&self) -> usize {
        self.frames.iter().filter(|f| f.valid && f.dirty).count()
    }

    pub fn frames(&self) -> &[FrameDesc] {
        &self.frames
    }

    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }
}

impl<F: PagedFile> Default for BufferManager<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PagedFile> fmt::Display for BufferManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for desc in &self.frames {
            writeln!(f, "FrameNo:{} {}", desc.frame_no(), desc)?;
        }
        let valid = self.frames.iter().filter(|d| d.valid).count();
        write!(f, "Total Number of Valid Frames:{}", valid)
    }
}

impl<F: PagedFile> Drop for BufferManager<F> {
    fn drop(&mut self) {
        // Flush all dirty pages when the buffer manager is dropped
        if let Err(err) = self.flush_all() {
            warn!(%err, "write-back on drop failed");
        }
        debug!(stats = %self.stats, "buffer manager dropped");
    }
}
