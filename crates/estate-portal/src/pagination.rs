//! Page/limit pagination flattened into one growing list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One page of a list endpoint: `{ data, page, totalPages, total? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Option<Vec<T>>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Page to request after `requested`, if any. An empty page ends the list
    /// even when the server reports more pages.
    pub fn next_after(&self, requested: u32) -> Option<u32> {
        if self.is_empty() || requested >= self.total_pages {
            None
        } else {
            Some(requested + 1)
        }
    }
}

/// Page/limit request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

/// Anything that can fetch page `n` of a list.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, page: u32) -> Option<Page<Self::Item>>;
}

/// Pages fetched so far plus the token for the next one.
#[derive(Debug, Clone)]
pub struct InfiniteList<T> {
    pages: Vec<Page<T>>,
    next: Option<u32>,
    first_page: u32,
}

impl<T> Default for InfiniteList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InfiniteList<T> {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first_page: u32) -> Self {
        Self {
            pages: Vec::new(),
            next: Some(first_page),
            first_page,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.next.is_some()
    }

    pub fn next_page(&self) -> Option<u32> {
        self.next
    }

    /// Fetch the next page. Returns false without touching `source` once the
    /// list is exhausted, and halts the list when a page comes back empty or missing.
    pub async fn load_more<S>(&mut self, source: &S) -> bool
    where
        S: PageSource<Item = T> + ?Sized,
    {
        let Some(requested) = self.next else {
            return false;
        };

        match source.fetch_page(requested).await {
            Some(page) if !page.is_empty() => {
                self.next = page.next_after(requested);
                self.pages.push(page);
                true
            }
            _ => {
                tracing::debug!(page = requested, "pagination halted on empty page");
                self.next = None;
                false
            }
        }
    }

    /// Keep loading until the list is exhausted or `max_pages` pages are held.
    pub async fn load_until<S>(&mut self, source: &S, max_pages: usize) -> usize
    where
        S: PageSource<Item = T> + ?Sized,
    {
        let mut loaded = 0;
        while self.pages.len() < max_pages && self.load_more(source).await {
            loaded += 1;
        }
        loaded
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    /// Every item of every fetched page, in fetch order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.items().iter())
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|page| page.items().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&mut self) {
        self.pages.clear();
        self.next = Some(self.first_page);
    }
}
