use thiserror::Error;

use super::FrameId;
use crate::file::{FileError, FileId, PageId};

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Buffer pool exceeded: every frame is pinned")]
    BufferExceeded,

    #[error("Page not pinned: {file} page={page} frame={frame}")]
    PageNotPinned {
        file: FileId,
        page: PageId,
        frame: FrameId,
    },

    #[error("Page pinned: {file} page={page} frame={frame}")]
    PagePinned {
        file: FileId,
        page: PageId,
        frame: FrameId,
    },

    #[error("Invalid page in valid frame: {file} frame={frame}")]
    InvalidPageEncountered { file: FileId, frame: FrameId },

    #[error("Stale page reference: {file} page={page}")]
    StalePageRef { file: FileId, page: PageId },

    #[error("Unknown file: {0}")]
    UnknownFile(FileId),

    #[error("File already registered: {0}")]
    DuplicateFile(FileId),

    #[error("Buffer pool must have at least one frame")]
    EmptyPool,
}

pub type BufferResult<T> = Result<T, BufferError>;
