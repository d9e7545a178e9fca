use crate::{pagination::cursor::PageCursor, records::record::Record};

/// Records returned by one API call.
#[derive(Debug, Clone)]
pub struct Page {
    pub cursor: PageCursor,
    pub records: Vec<Record>,
    /// Whether the response advertised a `rel="next"` link.
    pub has_next_link: bool,
}

impl Page {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// An empty page, or one shorter than requested, ends the result set.
    pub fn is_short(&self) -> bool {
        self.is_empty() || self.len() < self.cursor.per_page as usize
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub records: Vec<Record>,
    pub pages: u32,
    pub took_ms: u128,
}

impl FetchResult {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}
