//! Keyset pagination contract for the set queries
//!
//! Results are ordered ascending by key; `after_key` names the last key of
//! the previous page, exclusive.

use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Request for one page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery<K> {
    pub page_size: usize,
    pub after_key: Option<K>,
}

impl<K> PageQuery<K> {
    pub fn new(page_size: usize) -> Self {
        PageQuery {
            page_size,
            after_key: None,
        }
    }
}

impl<K> Default for PageQuery<K> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<K> {
    /// The query that produced this page
    pub current_page_query: PageQuery<K>,

    /// Query for the next page, present iff a further page exists
    pub next_page_query: Option<PageQuery<K>>,

    pub items: Vec<K>,
}

impl<K: Clone> Page<K> {
    /// An empty terminal page for the given query
    pub fn empty(current_page_query: PageQuery<K>) -> Self {
        Page {
            current_page_query,
            next_page_query: None,
            items: Vec::new(),
        }
    }

    /// Build a page from up to `page_size + 1` fetched items; the extra
    /// item, when present, only signals that another page exists.
    pub fn from_items(query: PageQuery<K>, mut items: Vec<K>) -> Self {
        let has_more = items.len() > query.page_size;
        if has_more {
            items.truncate(query.page_size);
        }
        let next_page_query = match (has_more, items.last()) {
            (true, Some(last)) => Some(PageQuery {
                page_size: query.page_size,
                after_key: Some(last.clone()),
            }),
            _ => None,
        };
        Page {
            current_page_query: query,
            next_page_query,
            items,
        }
    }
}
