use serde::{Deserialize, Serialize};

fn default_page_number() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

fn default_max_age() -> u32 {
    u32::MAX
}

/// Query string of the employee collection route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeParameters {
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub min_age: u32,
    #[serde(default = "default_max_age")]
    pub max_age: u32,
    pub search_term: Option<String>,
    pub order_by: Option<String>,
    pub fields: Option<String>,
}

impl Default for EmployeeParameters {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
            min_age: 0,
            max_age: default_max_age(),
            search_term: None,
            order_by: None,
            fields: None,
        }
    }
}

impl EmployeeParameters {
    /// Clamp paging into `1..` and page size into `1..=max_page_size`.
    pub fn normalized(mut self, max_page_size: u32) -> Self {
        self.page_number = self.page_number.max(1);
        self.page_size = self.page_size.clamp(1, max_page_size.max(1));
        self
    }

    pub fn valid_age_range(&self) -> bool {
        self.max_age >= self.min_age
    }

    pub fn search_term(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }
}

/// Paging summary sent in the `X-Pagination` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaData {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub meta: MetaData,
}

impl<T> PagedList<T> {
    /// Wrap one already-fetched page.
    pub fn new(items: Vec<T>, total_count: u64, page_number: u32, page_size: u32) -> Self {
        let total_pages = total_count.div_ceil(u64::from(page_size.max(1))) as u32;
        Self {
            items,
            meta: MetaData {
                current_page: page_number,
                total_pages,
                page_size,
                total_count,
                has_previous: page_number > 1,
                has_next: page_number < total_pages,
            },
        }
    }

    /// Cut one page out of a fully materialised result set.
    pub fn from_all(all: Vec<T>, page_number: u32, page_size: u32) -> Self {
        let total_count = all.len() as u64;
        let skip = (page_number.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        let items = all.into_iter().skip(skip).take(page_size as usize).collect();
        Self::new(items, total_count, page_number, page_size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
