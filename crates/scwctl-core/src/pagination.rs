//! Page-exhausting list helper
//!
//! List endpoints return one page at a time along with the total number of
//! matching resources. [`fetch_all_pages`] keeps requesting pages until it
//! has collected that many items (or the API hands back an empty page) and
//! returns them merged into a single response.

use std::future::Future;

use tracing::{debug, trace};

use crate::error::Result;

/// Paging parameters for a single list call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl Page {
    pub fn new(page: u32) -> Self {
        Self {
            page: Some(page),
            page_size: None,
        }
    }

    pub fn with_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// A list response that can be merged with its following pages
pub trait Paginated {
    /// Total number of matching resources across every page
    fn total_count(&self) -> u64;

    /// Number of items held by this response
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the items of `next` at the end of this response
    fn append(&mut self, next: Self);
}

/// Implement [`Paginated`] for a response struct with a `total_count` field
/// and a single `Vec` of items.
macro_rules! impl_paginated {
    ($ty:ty, $field:ident) => {
        impl $crate::pagination::Paginated for $ty {
            fn total_count(&self) -> u64 {
                self.total_count
            }

            fn len(&self) -> usize {
                self.$field.len()
            }

            fn append(&mut self, next: Self) {
                self.$field.extend(next.$field);
            }
        }
    };
}

pub(crate) use impl_paginated;

/// Fetch every page of a list endpoint and merge them
///
/// `fetch` is called with page numbers starting at 1. The first error aborts
/// the listing.
pub async fn fetch_all_pages<R, F, Fut>(mut fetch: F) -> Result<R>
where
    R: Paginated,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let mut page = 1;
    let mut all = fetch(page).await?;
    let total = all.total_count();
    trace!(page, total, fetched = all.len(), "first page");

    while (all.len() as u64) < total {
        page += 1;
        let next = fetch(page).await?;
        trace!(page, fetched = next.len(), "next page");
        if next.is_empty() {
            // The total moved under us (deletions between calls); stop here
            debug!(page, total, collected = all.len(), "empty page before total reached");
            break;
        }
        all.append(next);
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScwError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Default)]
    struct Numbers {
        total_count: u64,
        items: Vec<u32>,
    }

    impl_paginated!(Numbers, items);

    fn page_of(total: u64, page: u32, size: u32) -> Numbers {
        let start = (page - 1) * size;
        let end = ((page * size) as u64).min(total) as u32;
        Numbers {
            total_count: total,
            items: (start..end.max(start)).collect(),
        }
    }

    #[tokio::test]
    async fn test_fetches_every_page() {
        let calls = AtomicU32::new(0);
        let all = fetch_all_pages(|page| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(page_of(7, page, 3)) }
        })
        .await
        .unwrap();

        assert_eq!(all.items, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_page_makes_one_call() {
        let calls = AtomicU32::new(0);
        let all = fetch_all_pages(|page| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(page_of(2, page, 50)) }
        })
        .await
        .unwrap();

        assert_eq!(all.items.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let all = fetch_all_pages(|_| async { Ok(Numbers::default()) })
            .await
            .unwrap();
        assert!(all.items.is_empty());
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        // Claims 10 items but only ever serves the first page
        let all = fetch_all_pages(|page| async move {
            Ok(if page == 1 {
                Numbers {
                    total_count: 10,
                    items: vec![1, 2],
                }
            } else {
                Numbers {
                    total_count: 10,
                    items: vec![],
                }
            })
        })
        .await
        .unwrap();
        assert_eq!(all.items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_page_error_aborts() {
        let result = fetch_all_pages(|page| async move {
            if page == 2 {
                Err(ScwError::from_status(500, "boom".into(), None))
            } else {
                Ok(page_of(5, page, 2))
            }
        })
        .await;
        assert!(result.unwrap_err().is_server_error());
    }
}
