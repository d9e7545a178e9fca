//! Walks a list endpoint page by page.

use crate::{error::FetchError, retry::classify_api_error};
use connectors::api::source::{PageRequest, PageSource};
use engine_core::{
    metrics::Metrics,
    retry::{RetryError, RetryPolicy},
};
use model::{
    pagination::{cursor::PageCursor, page::FetchResult},
    records::record::Record,
    resource::ResourceKind,
    watermark::Watermark,
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, info, warn};

/// Sequential fetcher: one request in flight, pages requested in order.
#[derive(Clone)]
pub struct PaginatedFetcher {
    source: Arc<dyn PageSource>,
    page_size: u32,
    retry: RetryPolicy,
    full_extract_since: String,
    metrics: Metrics,
}

impl PaginatedFetcher {
    pub fn new(
        source: Arc<dyn PageSource>,
        page_size: u32,
        retry: RetryPolicy,
        full_extract_since: impl Into<String>,
        metrics: Metrics,
    ) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            retry,
            full_extract_since: full_extract_since.into(),
            metrics,
        }
    }

    /// Fetches every record of `resource`. Incremental resources are bounded
    /// below by the watermark (or by the full-extract date when there is
    /// none); the others are always fetched in full.
    pub async fn fetch(
        &self,
        resource: ResourceKind,
        watermark: Option<Watermark>,
    ) -> Result<FetchResult, FetchError> {
        let started = Instant::now();
        let (updated_since, guard) = match (resource.is_incremental(), watermark) {
            (true, Some(mark)) => (Some(mark.as_query_param()), Some(mark)),
            (true, None) => (Some(self.full_extract_since.clone()), None),
            (false, _) => (None, None),
        };

        let mut cursor = PageCursor::first(self.page_size);
        let mut records: Vec<Record> = Vec::new();
        let mut pages = 0u32;
        let mut dropped = 0usize;

        loop {
            let mut request = PageRequest::new(resource, cursor);
            if let Some(since) = &updated_since {
                request = request.updated_since(since.clone());
            }

            let page = self.fetch_page(&request).await?;
            pages += 1;
            self.metrics.increment_pages(1);

            let last = page.is_short() || !page.has_next_link;
            debug!(
                resource = %resource,
                page = cursor.page,
                records = page.len(),
                next_link = page.has_next_link,
                "Fetched page"
            );

            for record in page.records {
                if let (Some(mark), Some(modified)) = (guard, record.modified_at())
                    && !mark.admits(&modified)
                {
                    debug!(
                        resource = %resource,
                        page = cursor.page,
                        modified_at = %modified,
                        watermark = %mark,
                        "Dropping record older than the watermark"
                    );
                    dropped += 1;
                    continue;
                }
                records.push(record);
            }

            if last {
                break;
            }
            cursor = cursor.next();
        }

        self.metrics.increment_records(records.len() as u64);
        let took_ms = started.elapsed().as_millis();
        info!(
            resource = %resource,
            pages,
            records = records.len(),
            dropped,
            took_ms,
            "Fetched resource"
        );

        Ok(FetchResult {
            records,
            pages,
            took_ms,
        })
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<model::pagination::page::Page, FetchError> {
        let resource = request.resource;
        let page = request.cursor.page;

        self.retry
            .run_observed(
                || self.source.fetch_page(request),
                classify_api_error,
                |attempt, err, delay| {
                    self.metrics.increment_retries(1);
                    warn!(
                        resource = %resource,
                        page,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Page request failed; retrying"
                    );
                },
            )
            .await
            .map_err(|err| match err {
                RetryError::Fatal(source) => FetchError::Api {
                    resource,
                    page,
                    source,
                },
                RetryError::AttemptsExceeded(source) => FetchError::RetriesExhausted {
                    resource,
                    page,
                    attempts: self.retry.max_attempts,
                    source,
                },
            })
    }
}
