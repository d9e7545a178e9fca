use serde::{Deserialize, Serialize};

/// Position of the next page request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl PageCursor {
    pub fn first(per_page: u32) -> Self {
        PageCursor { page: 1, per_page }
    }

    pub fn next(&self) -> Self {
        PageCursor {
            page: self.page + 1,
            per_page: self.per_page,
        }
    }
}
