//! Pagination helper types for repository queries

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// Largest accepted page number or page size (positive 32-bit range)
pub const MAX_PAGE_VALUE: i64 = i32::MAX as i64;

/// Pagination request parameters
///
/// Pages are 1-indexed. Both values are validated on construction, so a
/// `PageRequest` in hand always yields a non-negative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Current page number (1-indexed)
    page: u32,
    /// Number of items per page
    page_size: u32,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Errors
    ///
    /// `InvalidInput` if either value is outside `1..=2^31-1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_library::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(3, 20).unwrap();
    /// assert_eq!(request.offset(), 40);
    /// assert_eq!(request.limit(), 20);
    /// assert!(PageRequest::new(0, 20).is_err());
    /// ```
    pub fn new(page: i64, page_size: i64) -> Result<Self> {
        Ok(Self {
            page: Self::bounded("page", page)?,
            page_size: Self::bounded("limit", page_size)?,
        })
    }

    fn bounded(field: &str, value: i64) -> Result<u32> {
        if !(1..=MAX_PAGE_VALUE).contains(&value) {
            return Err(LibraryError::invalid_input(
                field,
                format!("must be between 1 and {}, got {}", MAX_PAGE_VALUE, value),
            ));
        }
        Ok(value as u32)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Calculate the SQL OFFSET value, `(page - 1) * page_size`
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// Get the LIMIT value (same as page_size)
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}
