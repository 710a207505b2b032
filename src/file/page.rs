use std::fmt;

use super::{INVALID_PAGE, PAGE_SIZE, PageId};

/// Fixed-size page content tagged with its page number
#[derive(Clone)]
pub struct Page {
    number: PageId,
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Create a zeroed page with the given number
    pub fn new(number: PageId) -> Self {
        Self {
            number,
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    /// Create a zeroed page that does not belong to any file yet
    pub fn empty() -> Self {
        Self::new(INVALID_PAGE)
    }

    /// Wrap existing bytes as a page
    pub fn from_bytes(number: PageId, data: Box<[u8; PAGE_SIZE]>) -> Self {
        Self { number, data }
    }

    pub fn page_number(&self) -> PageId {
        self.number
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The payload is too large to be useful in debug output
        f.debug_struct("Page").field("number", &self.number).finish()
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number && self.data[..] == other.data[..]
    }
}

impl Eq for Page {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_is_zeroed() {
        let page = Page::new(7);
        assert_eq!(page.page_number(), 7);
        assert_eq!(page.data().len(), PAGE_SIZE);
        assert!(page.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_empty_page_has_sentinel_number() {
        assert_eq!(Page::empty().page_number(), INVALID_PAGE);
        assert_eq!(Page::default().page_number(), INVALID_PAGE);
    }

    #[test]
    fn test_data_mut() {
        let mut page = Page::new(1);
        page.data_mut()[0] = 42;
        page.data_mut()[PAGE_SIZE - 1] = 255;
        assert_eq!(page.data()[0], 42);
        assert_eq!(page.data()[PAGE_SIZE - 1], 255);
        assert_ne!(page, Page::new(1));
    }
}
