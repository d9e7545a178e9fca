use crate::api::error::ApiError;
use async_trait::async_trait;
use model::{
    pagination::{cursor::PageCursor, page::Page},
    resource::ResourceKind,
};

/// One page request against a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub resource: ResourceKind,
    pub cursor: PageCursor,
    /// Lower bound on the modification time, sent as `updated_since`.
    pub updated_since: Option<String>,
}

impl PageRequest {
    pub fn new(resource: ResourceKind, cursor: PageCursor) -> Self {
        PageRequest {
            resource,
            cursor,
            updated_since: None,
        }
    }

    pub fn updated_since(mut self, since: impl Into<String>) -> Self {
        self.updated_since = Some(since.into());
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("per_page", self.cursor.per_page.to_string()),
            ("page", self.cursor.page.to_string()),
        ];
        if let Some(since) = &self.updated_since {
            pairs.push(("updated_since", since.clone()));
        }
        pairs
    }
}

/// Anything that can serve pages of helpdesk records.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, ApiError>;
}
