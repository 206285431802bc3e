use crate::{
    consts::consts::{PageNumber, FIRST_PAGE, VISIBLE_PAGE_WINDOW},
    model::page::PersonPage,
};

/// Everything the list needs to render one page plus its pagination controls
#[derive(Clone, Debug, PartialEq)]
pub struct PageState<R> {
    pub persons: Vec<R>,
    pub current_page: PageNumber,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub search_term: String,
    pub is_loading: bool,
}

impl<R> PageState<R> {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            persons: vec![],
            current_page: FIRST_PAGE,
            items_per_page,
            total_items: 0,
            total_pages: 1,
            search_term: String::new(),
            is_loading: false,
        }
    }

    /// Replaces the visible rows, the page count is recomputed from the page size the backend used
    pub fn apply(&mut self, page: PersonPage<R>) {
        self.persons = page.persons;
        self.total_items = page.pagination.total_items;
        self.total_pages = page.pagination.total_pages();
    }

    pub fn last_valid_page(&self) -> PageNumber {
        PageNumber(self.total_pages.max(1))
    }

    pub fn is_valid_page(&self, page: PageNumber) -> bool {
        page >= FIRST_PAGE && page.to_number() <= self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > FIRST_PAGE
    }

    pub fn has_next(&self) -> bool {
        self.current_page.to_number() < self.total_pages
    }

    pub fn page_window(&self) -> Vec<usize> {
        page_window(
            self.current_page.to_number(),
            self.total_pages,
            VISIBLE_PAGE_WINDOW,
        )
    }

    /// `(first, last, total)` of the "Showing X to Y of Z" line, first is 0 when nothing matched
    pub fn showing_range(&self) -> (usize, usize, usize) {
        if self.total_items == 0 {
            return (0, 0, 0);
        }

        let page = self.current_page.to_number();
        let first = (page - 1) * self.items_per_page + 1;
        let last = (page * self.items_per_page).min(self.total_items);

        (first.min(last), last, self.total_items)
    }
}

/// Contiguous run of at most `visible` page numbers centred on `current_page`, slid back inside
/// `[1, total_pages]` so it stays full near either edge
pub fn page_window(current_page: usize, total_pages: usize, visible: usize) -> Vec<usize> {
    if visible == 0 {
        return vec![];
    }

    let mut start = current_page.saturating_sub(visible / 2).max(1);
    let end = total_pages.min(start + visible - 1);

    if end + 1 < start + visible {
        start = (end + 1).saturating_sub(visible).max(1);
    }

    (start..=end).collect()
}
