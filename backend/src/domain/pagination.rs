//! Offset pagination shared by list operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raised when pagination parameters are out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageValidationError {
    NegativePage,
    SizeOutOfRange { max: u32 },
}

impl fmt::Display for PageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativePage => write!(f, "page must not be negative"),
            Self::SizeOutOfRange { max } => write!(f, "size must be between 1 and {max}"),
        }
    }
}

impl std::error::Error for PageValidationError {}

impl From<PageValidationError> for Error {
    fn from(value: PageValidationError) -> Self {
        let field = match value {
            PageValidationError::NegativePage => "page",
            PageValidationError::SizeOutOfRange { .. } => "size",
        };
        Self::invalid_field(field, "out_of_range", value.to_string())
    }
}

/// Zero-based page selector.
///
/// # Examples
/// ```
/// use backend::domain::PageRequest;
///
/// let request = PageRequest::try_new(Some(2), Some(20)).unwrap();
/// assert_eq!(request.offset(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Validate raw query parameters, applying defaults for missing values.
    pub fn try_new(page: Option<i64>, size: Option<i64>) -> Result<Self, PageValidationError> {
        let page = match page {
            None => 0,
            Some(value) => u32::try_from(value).map_err(|_| PageValidationError::NegativePage)?,
        };
        let size = match size {
            None => DEFAULT_PAGE_SIZE,
            Some(value) => u32::try_from(value)
                .ok()
                .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                .ok_or(PageValidationError::SizeOutOfRange { max: MAX_PAGE_SIZE })?,
        };
        Ok(Self { page, size })
    }

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Requested number of items per page.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of items to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Slice an already ordered collection.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Page<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let content = items
            .iter()
            .skip(offset)
            .take(self.size as usize)
            .cloned()
            .collect();
        Page::new(content, items.len() as u64, *self)
    }
}

/// One page of results plus the totals needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Assemble a page from fetched content and the overall item count.
    pub fn new(content: Vec<T>, total_elements: u64, request: PageRequest) -> Self {
        Self {
            content,
            total_elements,
            request,
        }
    }

    /// Number of pages needed for every element.
    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.request.size.max(1)))
    }

    /// Whether this is the first page.
    pub fn is_first(&self) -> bool {
        self.request.page == 0
    }

    /// Whether no page follows this one.
    pub fn is_last(&self) -> bool {
        u64::from(self.request.page) + 1 >= self.total_pages()
    }

    /// Transform every item, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            request: self.request,
        }
    }
}

/// Ordering direction for sortable listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}
