use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total_items: usize,
    pub items_per_page: usize,
}

impl Pagination {
    /// `ceil(total_items / items_per_page)`, zero items means zero pages
    pub fn total_pages(&self) -> usize {
        if self.items_per_page == 0 {
            return 0;
        }

        self.total_items.div_ceil(self.items_per_page)
    }
}

/// One page of records plus the summary the backend reports for the whole result set
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersonPage<R> {
    pub persons: Vec<R>,
    pub pagination: Pagination,
}

impl<R: Clone> PersonPage<R> {
    /// Slices an already filtered, complete result set. Used where the backend returns everything at once.
    pub fn from_slice(records: &[R], page: usize, items_per_page: usize) -> Self {
        let offset = page.saturating_sub(1) * items_per_page;

        let persons = records
            .iter()
            .skip(offset)
            .take(items_per_page)
            .cloned()
            .collect();

        PersonPage {
            persons,
            pagination: Pagination {
                total_items: records.len(),
                items_per_page,
            },
        }
    }
}
