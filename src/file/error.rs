use std::io;
use thiserror::Error;

use super::PageId;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("Page not found: page={page}")]
    PageNotFound { page: PageId },

    #[error("Invalid page number: {0}")]
    InvalidPage(PageId),

    #[error("Corrupt file: {0}")]
    CorruptFile(String),
}

pub type FileResult<T> = Result<T, FileError>;
