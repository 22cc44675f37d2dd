//! Walk a paginated listing until it is exhausted.

use crate::source::FetchError;

/// Position of the next page to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Number of records to skip; advanced by the page size.
    Offset(usize),
    /// Opaque token taken from the previous response's metadata.
    Token(String),
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Next-page token, for token-paginated endpoints.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// A page that is known to be the last one.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next_token: None }
    }
}

/// A listing that returns at most `page_size` items per call.
pub trait PagedEndpoint {
    type Item;

    /// Cursor of the first page (offset 0, page "1", ...).
    fn first_cursor(&self) -> Cursor;

    /// Largest page the server honours. Larger requests are clamped to it.
    fn max_page_size(&self) -> Option<usize> {
        None
    }

    fn fetch_page(
        &mut self,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<Page<Self::Item>, FetchError>;
}

/// Fetch every page of `endpoint` and concatenate them in source order.
///
/// Stops on the first non-full page, or, for token cursors, when the
/// response carries no next token. The first failing page aborts the walk.
pub fn fetch_all<E: PagedEndpoint>(
    endpoint: &mut E,
    page_size: usize,
) -> Result<Vec<E::Item>, FetchError> {
    let page_size = match endpoint.max_page_size() {
        Some(max) if page_size > max => {
            tracing::debug!(requested = page_size, max, "clamping page size");
            max
        }
        _ => page_size,
    }
    .max(1);
    let mut cursor = endpoint.first_cursor();
    let mut all = Vec::new();
    let mut calls = 0usize;

    loop {
        let page = endpoint.fetch_page(&cursor, page_size)?;
        calls += 1;
        let count = page.items.len();
        tracing::debug!(?cursor, count, "fetched page");
        all.extend(page.items);

        if count < page_size {
            break;
        }
        cursor = match cursor {
            Cursor::Offset(offset) => Cursor::Offset(offset + page_size),
            Cursor::Token(_) => match page.next_token {
                Some(token) if !token.is_empty() => Cursor::Token(token),
                _ => break,
            },
        };
    }

    tracing::debug!(calls, total = all.len(), "pagination complete");
    Ok(all)
}
