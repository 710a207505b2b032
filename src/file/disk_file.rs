use std::fs::{File, OpenOptions};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::error::{FileError, FileResult};
use super::{FileId, INVALID_PAGE, PAGE_SIZE, Page, PageId, PagedFile};

/// Magic number at the start of every paged file ("BUFM")
const FILE_MAGIC: u32 = 0x4255_464D;

/// Per-slot header: state (4 bytes) + next free slot (4 bytes)
const SLOT_HEADER_SIZE: usize = 8;

/// On-disk size of one page slot
const SLOT_SIZE: usize = PAGE_SIZE + SLOT_HEADER_SIZE;

const SLOT_USED: u32 = 1;
const SLOT_FREE: u32 = 2;

/// Paged file on disk
///
/// Layout: slot 0 holds the file header (magic, slot count, free list head),
/// slot `n` holds page `n`. Deleted slots are chained through their headers
/// and handed out again by [`allocate_page`](PagedFile::allocate_page).
pub struct DiskFile {
    file: File,
    path: PathBuf,
    id: FileId,
    /// Number of slots including the header slot; also the next fresh page number
    slot_count: u32,
    /// First deleted slot, or `INVALID_PAGE` when the free list is empty
    free_head: PageId,
}

impl DiskFile {
    /// Create a new empty paged file
    pub fn create<P: AsRef<Path>>(path: P) -> FileResult<Self> {
        let path = path.as_ref();

        if path.exists() {
            return Err(FileError::FileAlreadyExists(path.display().to_string()));
        }

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        let path = path.canonicalize()?;

        let mut disk_file = Self {
            file,
            id: identity_of(&path),
            path,
            slot_count: 1,
            free_head: INVALID_PAGE,
        };
        disk_file.file.set_len(SLOT_SIZE as u64)?;
        disk_file.write_file_header()?;
        Ok(disk_file)
    }

    /// Open an existing paged file
    pub fn open<P: AsRef<Path>>(path: P) -> FileResult<Self> {
        let path_ref = path.as_ref();
        let path = path_ref
            .canonicalize()
            .map_err(|_| FileError::FileNotFound(path_ref.display().to_string()))?;

        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut header = [0u8; 12];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header).map_err(|_| {
            FileError::CorruptFile(format!("{}: missing file header", path.display()))
        })?;

        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != FILE_MAGIC {
            return Err(FileError::CorruptFile(format!(
                "{}: bad magic {:#010x}",
                path.display(),
                magic
            )));
        }
        let slot_count = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let free_head = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

        let required_size = slot_count as u64 * SLOT_SIZE as u64;
        if slot_count == 0 || file.metadata()?.len() < required_size {
            return Err(FileError::CorruptFile(format!(
                "{}: truncated, expected {} slots",
                path.display(),
                slot_count
            )));
        }

        Ok(Self {
            file,
            id: identity_of(&path),
            path,
            slot_count,
            free_head,
        })
    }

    /// Canonical path of this file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of page slots ever handed out, live or deleted
    pub fn page_slots(&self) -> usize {
        (self.slot_count - 1) as usize
    }

    /// Sync file contents to disk (flush all OS buffers)
    pub fn sync(&mut self) -> FileResult<()> {
        self.file.sync_data()?;
        Ok(())
    }

    fn slot_offset(page_number: PageId) -> u64 {
        page_number as u64 * SLOT_SIZE as u64
    }

    fn write_file_header(&mut self) -> FileResult<()> {
        let mut header = [0u8; 12];
        header[0..4].copy_from_slice(&FILE_MAGIC.to_le_bytes());
        header[4..8].copy_from_slice(&self.slot_count.to_le_bytes());
        header[8..12].copy_from_slice(&self.free_head.to_le_bytes());

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&header)?;
        Ok(())
    }

    fn read_slot_header(&mut self, page_number: PageId) -> FileResult<(u32, PageId)> {
        let mut header = [0u8; SLOT_HEADER_SIZE];
        self.file
            .seek(SeekFrom::Start(Self::slot_offset(page_number)))?;
        self.file.read_exact(&mut header)?;

        let state = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let next_free = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        Ok((state, next_free))
    }

    fn write_slot_header(
        &mut self,
        page_number: PageId,
        state: u32,
        next_free: PageId,
    ) -> FileResult<()> {
        let mut header = [0u8; SLOT_HEADER_SIZE];
        header[0..4].copy_from_slice(&state.to_le_bytes());
        header[4..8].copy_from_slice(&next_free.to_le_bytes());

        self.file
            .seek(SeekFrom::Start(Self::slot_offset(page_number)))?;
        self.file.write_all(&header)?;
        Ok(())
    }

    fn write_slot_data(&mut self, page_number: PageId, data: &[u8]) -> FileResult<()> {
        let offset = Self::slot_offset(page_number) + SLOT_HEADER_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        // Note: Don't sync on every write - let the OS buffer and batch writes
        Ok(())
    }

    /// Fails unless `page_number` names a live page
    fn check_live(&mut self, page_number: PageId) -> FileResult<()> {
        if page_number == INVALID_PAGE {
            return Err(FileError::InvalidPage(page_number));
        }
        if page_number >= self.slot_count {
            return Err(FileError::PageNotFound { page: page_number });
        }
        let (state, _) = self.read_slot_header(page_number)?;
        if state != SLOT_USED {
            return Err(FileError::PageNotFound { page: page_number });
        }
        Ok(())
    }
}

impl PagedFile for DiskFile {
    fn identity(&self) -> FileId {
        self.id
    }

    fn read_page(&mut self, page_number: PageId) -> FileResult<Page> {
        self.check_live(page_number)?;

        // check_live leaves the cursor right after the slot header
        let mut data = Box::new([0u8; PAGE_SIZE]);
        self.file.read_exact(&mut data[..])?;
        Ok(Page::from_bytes(page_number, data))
    }

    fn write_page(&mut self, page: &Page) -> FileResult<()> {
        self.check_live(page.page_number())?;
        self.write_slot_data(page.page_number(), page.data())
    }

    fn allocate_page(&mut self) -> FileResult<Page> {
        let page_number = if self.free_head != INVALID_PAGE {
            let reused = self.free_head;
            let (_, next_free) = self.read_slot_header(reused)?;
            self.free_head = next_free;
            reused
        } else {
            let fresh = self.slot_count;
            self.slot_count += 1;
            self.file
                .set_len(self.slot_count as u64 * SLOT_SIZE as u64)?;
            fresh
        };

        let page = Page::new(page_number);
        self.write_slot_header(page_number, SLOT_USED, INVALID_PAGE)?;
        self.write_slot_data(page_number, page.data())?;
        self.write_file_header()?;
        Ok(page)
    }

    fn delete_page(&mut self, page_number: PageId) -> FileResult<()> {
        self.check_live(page_number)?;
        self.write_slot_header(page_number, SLOT_FREE, self.free_head)?;
        self.free_head = page_number;
        self.write_file_header()
    }
}

fn identity_of(path: &Path) -> FileId {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    FileId(hasher.finish())
}
