//! Paging over ordered result sets.
//!
//! Two strategies share one contract: walking pages 1, 2, ... in order yields
//! every element exactly once, every page but the last holds exactly `size`
//! elements, and the last holds at most `size`.
//!
//! - [`PagingStrategy::Materialized`] fetches the full ordered set once and
//!   slices it in memory. Only suitable when the set fits in memory.
//! - [`PagingStrategy::Offset`] issues one skip/take query per page and treats
//!   a short page as the end of data.

pub mod cursor;

use async_trait::async_trait;

use crate::error::StoreError;

pub use cursor::{run_cursor, CursorCommand, CursorError, CursorNotice, CursorState, CursorStep, PagerIo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingStrategy {
    Materialized,
    Offset,
}

/// A validated page window: `number >= 1`, `size > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: i64,
    size: i64,
}

impl PageRequest {
    pub fn new(number: i64, size: i64) -> Result<Self, StoreError> {
        if size <= 0 {
            return Err(StoreError::InvalidInput(format!(
                "page size must be positive, got {}",
                size
            )));
        }
        if number < 1 {
            return Err(StoreError::InvalidInput(format!(
                "page number must be at least 1, got {}",
                number
            )));
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// Rows to skip before this page. Saturates at `i64::MAX`, which no
    /// table reaches, so a far-out page reads as empty.
    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

/// Number of pages needed for `total` elements.
pub fn page_count(total: usize, size: usize) -> usize {
    total.div_ceil(size)
}

/// Split a fully materialized ordered set into consecutive pages of `size`.
pub fn paginate<T>(items: Vec<T>, size: i64) -> Result<Vec<Vec<T>>, StoreError> {
    let request = PageRequest::new(1, size)?;
    let size = request.size() as usize;

    let mut pages = Vec::with_capacity(page_count(items.len(), size));
    let mut iter = items.into_iter();
    loop {
        let page: Vec<T> = iter.by_ref().take(size).collect();
        if page.is_empty() {
            break;
        }
        pages.push(page);
    }
    Ok(pages)
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub number: i64,
    pub items: Vec<T>,
    /// Whether a later page may hold data.
    pub has_more: bool,
}

/// An ordered result set that can be read whole or by window.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_all(&self) -> Result<Vec<Self::Item>, StoreError>;

    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Self::Item>, StoreError>;
}

/// Serves numbered pages from a source using the selected strategy.
pub struct Pager<'a, S: PageSource> {
    source: &'a S,
    strategy: PagingStrategy,
    size: i64,
    materialized: Option<Vec<Vec<S::Item>>>,
}

impl<'a, S> Pager<'a, S>
where
    S: PageSource,
    S::Item: Clone,
{
    /// Rejects a non-positive page size before touching the source.
    pub fn new(source: &'a S, strategy: PagingStrategy, size: i64) -> Result<Self, StoreError> {
        PageRequest::new(1, size)?;
        Ok(Self {
            source,
            strategy,
            size,
            materialized: None,
        })
    }

    pub fn strategy(&self) -> PagingStrategy {
        self.strategy
    }

    pub fn page_size(&self) -> i64 {
        self.size
    }

    pub async fn fetch(&mut self, number: i64) -> Result<Page<S::Item>, StoreError> {
        let request = PageRequest::new(number, self.size)?;

        match self.strategy {
            PagingStrategy::Offset => {
                let items = self.source.fetch_page(request).await?;
                let has_more = items.len() as i64 == self.size;
                Ok(Page {
                    number,
                    items,
                    has_more,
                })
            }
            PagingStrategy::Materialized => {
                if self.materialized.is_none() {
                    let all = self.source.fetch_all().await?;
                    self.materialized = Some(paginate(all, self.size)?);
                }
                let pages = self.materialized.as_deref().unwrap_or_default();
                let index = usize::try_from(number - 1).unwrap_or(usize::MAX);
                Ok(Page {
                    number,
                    items: pages.get(index).cloned().unwrap_or_default(),
                    has_more: index.saturating_add(1) < pages.len(),
                })
            }
        }
    }

    /// Walk forward from page 1 until the data runs out. Empty trailing pages
    /// are not included, so an empty source yields no pages.
    pub async fn collect_pages(&mut self) -> Result<Vec<Page<S::Item>>, StoreError> {
        let mut pages = Vec::new();
        let mut number = 1;
        loop {
            let page = self.fetch(number).await?;
            let has_more = page.has_more;
            if !page.items.is_empty() {
                pages.push(page);
            }
            if !has_more {
                break;
            }
            number += 1;
        }
        Ok(pages)
    }
}
