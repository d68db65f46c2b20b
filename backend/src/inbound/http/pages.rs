//! Pagination query parameters and page envelopes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Page, PageRequest};

/// `?page=&size=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size, 1 to 100. Defaults to 10.
    pub size: Option<i64>,
}

impl PageQuery {
    /// Validate into a domain page request.
    pub fn to_request(self) -> Result<PageRequest, Error> {
        PageRequest::try_new(self.page, self.size).map_err(Error::from)
    }
}

/// Generic page envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    pub content: Vec<T>,
    pub total_pages: u64,
    pub total_elements: u64,
    /// Zero-based index of this page.
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> PageDto<T> {
    /// Convert a domain page, mapping each element.
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        let number = page.request.page();
        let size = page.request.size();
        let total_elements = page.total_elements;
        Self {
            content: page.content.into_iter().map(f).collect(),
            total_pages,
            total_elements,
            number,
            size,
            first,
            last,
        }
    }
}
