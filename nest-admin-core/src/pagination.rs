//! Paged listing envelopes

use crate::specification::{Criteria, Paging, Queryable, SortDir, Specification, MAX_PAGE_SIZE};
use crate::{Failure, Outcome};
use serde::{Deserialize, Serialize};

/// Page size limits applied to listing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl ListingConfig {
    pub fn validate(&self) -> Outcome<()> {
        if self.max_page_size == 0 || self.max_page_size > MAX_PAGE_SIZE {
            return Err(Failure::validation(
                "ListingConfig.InvalidMaxPageSize",
                format!("max_page_size must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(Failure::validation(
                "ListingConfig.InvalidDefaultPageSize",
                "default_page_size must be between 1 and max_page_size",
            ));
        }
        Ok(())
    }
}

/// Sorting and paging part of a listing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: u32,
    /// Falls back to [`ListingConfig::default_page_size`]
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortDir,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: None,
            sort_by: None,
            sort_order: SortDir::Asc,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sorted_by(self, field: impl Into<String>, order: SortDir) -> Self {
        Self {
            sort_by: Some(field.into()),
            sort_order: order,
            ..self
        }
    }

    /// Build the paged specification for `criteria`.
    ///
    /// The count query is derived from the result with
    /// [`Specification::without_paging`].
    pub fn specification<E: Queryable>(
        &self,
        criteria: Criteria<E::Field>,
        config: &ListingConfig,
    ) -> Outcome<Specification<E>> {
        let page_size = self.page_size.unwrap_or(config.default_page_size);
        if page_size > config.max_page_size {
            return Err(Failure::validation(
                "Specification.InvalidPageSize",
                format!("Page size must be between 1 and {}", config.max_page_size),
            ));
        }
        let spec = Specification::new(criteria);
        let spec = match &self.sort_by {
            Some(field) => spec.with_ordering(field, self.sort_order)?,
            None => spec,
        };
        spec.with_paging(self.page_number, page_size)
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Number of pages needed for `total_count` rows
pub fn total_pages(total_count: i64, page_size: u32) -> u32 {
    if total_count <= 0 || page_size == 0 {
        return 0;
    }
    let total = u64::try_from(total_count).unwrap_or(0);
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, paging: Paging) -> Self {
        Self {
            items,
            total_count,
            page_number: paging.page_number(),
            page_size: paging.page_size(),
            total_pages: total_pages(total_count, paging.page_size()),
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }
}
