use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    consts::consts::{PageNumber, FIRST_PAGE},
    notify::Notifier,
};

use super::{
    pagination::PageState,
    source::{PageQuery, PersonSource},
};

struct Shared<S: PersonSource> {
    source: S,
    state: Mutex<PageState<S::Record>>,
    /// Incremented for every request issued, a response is only applied if nothing newer was issued since
    generation: AtomicU64,
    /// Bumped every time `state` changes so front ends know to re-render
    revision: watch::Sender<u64>,
    notifier: Notifier,
    /// Fetch started by the last debounce timer that fired. Never aborted, stale answers are
    /// dropped by the generation check instead.
    search_fetch: Mutex<Option<JoinHandle<()>>>,
}

impl<S: PersonSource> Shared<S> {
    fn state(&self) -> MutexGuard<'_, PageState<S::Record>> {
        self.state.lock().expect("page state lock poisoned")
    }

    fn changed(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    async fn fetch(&self, page: PageNumber, search_term: String) {
        let mut page = page;

        loop {
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

            let query = {
                let mut state = self.state();
                state.is_loading = true;

                PageQuery {
                    page,
                    items_per_page: state.items_per_page,
                    person_name: search_term.clone(),
                }
            };

            self.changed();

            let result = self.source.fetch_page(&query).await;

            if generation != self.generation.load(Ordering::SeqCst) {
                log::debug!(
                    "Discarding stale page response [Page: {}, Generation: {}]",
                    page.to_number(),
                    generation
                );
                return;
            }

            let clamped = {
                let mut state = self.state();
                state.is_loading = false;

                match result {
                    Ok(person_page) => {
                        state.apply(person_page);

                        let last_valid_page = state.last_valid_page();

                        if state.current_page > last_valid_page {
                            state.current_page = last_valid_page;
                            Some(last_valid_page)
                        } else {
                            None
                        }
                    }
                    Err(e) => {
                        // Previous rows stay on screen, stale but consistent
                        log::error!("Unable to load persons: {}", e);
                        self.notifier.error("Failed to load persons");
                        None
                    }
                }
            };

            self.changed();

            match clamped {
                Some(last_valid_page) => {
                    log::debug!(
                        "Current page out of range, reloading page {}",
                        last_valid_page.to_number()
                    );
                    page = last_valid_page;
                }
                None => return,
            }
        }
    }
}

/// Owns the current page, page size, totals and search term of a person list.
///
/// Page changes fetch immediately. Search keystrokes are debounced through a single timer slot:
/// scheduling a new search always aborts the pending one, so only the last keystroke fetches.
pub struct SearchController<S: PersonSource> {
    shared: Arc<Shared<S>>,
    debounce: Mutex<Option<JoinHandle<()>>>,
    debounce_interval: Duration,
}

impl<S: PersonSource> SearchController<S> {
    pub fn new(
        source: S,
        notifier: Notifier,
        items_per_page: usize,
        debounce_interval: Duration,
    ) -> Self {
        let (revision, _) = watch::channel(0);

        Self {
            shared: Arc::new(Shared {
                source,
                state: Mutex::new(PageState::new(items_per_page)),
                generation: AtomicU64::new(0),
                revision,
                notifier,
                search_fetch: Mutex::new(None),
            }),
            debounce: Mutex::new(None),
            debounce_interval,
        }
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    pub fn snapshot(&self) -> PageState<S::Record> {
        self.shared.state().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Fetches the current page with the current term, used after mutations
    pub async fn refresh(&self) {
        let (page, search_term) = {
            let state = self.shared.state();
            (state.current_page, state.search_term.clone())
        };

        self.shared.fetch(page, search_term).await
    }

    /// Returns false when the page is out of range or already shown, nothing is fetched then
    pub async fn go_to_page(&self, page: usize) -> bool {
        let page = PageNumber(page);

        let search_term = {
            let mut state = self.shared.state();

            if !state.is_valid_page(page) || state.current_page == page {
                return false;
            }

            state.current_page = page;
            state.search_term.clone()
        };

        self.shared.fetch(page, search_term).await;

        true
    }

    pub async fn next_page(&self) -> bool {
        let next = self.shared.state().current_page.increment();
        self.go_to_page(next.to_number()).await
    }

    pub async fn previous_page(&self) -> bool {
        let previous = self.shared.state().current_page.decrement();
        self.go_to_page(previous.to_number()).await
    }

    /// Updates the displayed term straight away and (re)schedules the debounced fetch.
    /// Only a timer that has not fired yet is cancelled, a search already sent is left to finish.
    /// Must be called from within a tokio runtime.
    pub fn set_search_term(&self, search_term: &str) {
        self.shared.state().search_term = search_term.to_string();
        self.shared.changed();

        let shared = self.shared.clone();
        let search_term = search_term.to_string();
        let interval = self.debounce_interval;

        let mut slot = self.debounce.lock().expect("debounce lock poisoned");

        if let Some(pending) = slot.take() {
            pending.abort();
        }

        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;

            let fetch_shared = shared.clone();
            let fetch = tokio::spawn(async move {
                fetch_shared.state().current_page = FIRST_PAGE;

                fetch_shared.fetch(FIRST_PAGE, search_term).await;
            });

            *shared
                .search_fetch
                .lock()
                .expect("search fetch lock poisoned") = Some(fetch);
        }));
    }

    pub fn has_pending_search(&self) -> bool {
        let timer_pending = self
            .debounce
            .lock()
            .expect("debounce lock poisoned")
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false);

        let fetch_pending = self
            .shared
            .search_fetch
            .lock()
            .expect("search fetch lock poisoned")
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false);

        timer_pending || fetch_pending
    }

    /// Waits for the scheduled search, if any, to fire and finish
    pub async fn wait_for_search(&self) {
        let timer = self.debounce.lock().expect("debounce lock poisoned").take();

        if let Some(handle) = timer {
            // A cancelled timer is the normal outcome of a newer keystroke
            let _ = handle.await;
        }

        let fetch = self
            .shared
            .search_fetch
            .lock()
            .expect("search fetch lock poisoned")
            .take();

        if let Some(handle) = fetch {
            let _ = handle.await;
        }
    }
}

impl<S: PersonSource> Drop for SearchController<S> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.debounce.lock() {
            if let Some(pending) = slot.take() {
                pending.abort();
            }
        }
    }
}
