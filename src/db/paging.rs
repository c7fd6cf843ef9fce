//! Offset-based batch draining for reads that may exceed a single page.
//!
//! Every bulk read in the metrics services goes through [`fetch_all_pages`].
//! Callers must order their query by a unique, stable key (`created_at, id`)
//! so consecutive pages neither overlap nor skip rows.

use std::future::Future;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Page size and fetch cap for one batch drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub batch_size: i64,
    /// Maximum number of page requests, including the short page that ends the drain.
    pub max_pages: usize,
}

impl BatchLimits {
    pub fn new(batch_size: i64, max_pages: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_pages: max_pages.max(1),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.query_batch_size, config.query_max_pages)
    }
}

/// Call `fetch_page(offset, limit)` until a short page arrives and return
/// the concatenation of every page.
///
/// Fails with [`AppError::Internal`] when `max_pages` requests all came back
/// full, instead of truncating the result.
pub async fn fetch_all_pages<T, F, Fut>(
    limits: BatchLimits,
    mut fetch_page: F,
) -> Result<Vec<T>, AppError>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, AppError>>,
{
    let limits = BatchLimits::new(limits.batch_size, limits.max_pages);
    let mut rows = Vec::new();
    let mut offset = 0i64;

    for _ in 0..limits.max_pages {
        let page = fetch_page(offset, limits.batch_size).await?;
        let short = (page.len() as i64) < limits.batch_size;
        rows.extend(page);
        if short {
            return Ok(rows);
        }
        offset += limits.batch_size;
    }

    tracing::warn!(
        batch_size = limits.batch_size,
        max_pages = limits.max_pages,
        rows = rows.len(),
        "Batch drain hit page cap"
    );
    Err(AppError::Internal(format!(
        "batch read exceeded {} pages of {} rows",
        limits.max_pages, limits.batch_size
    )))
}
