use std::{sync::Arc, time::Duration};

use peopledesk::{
    consts::consts::{PageNumber, PersonId, TOKEN_KEY},
    model::person::PersonV2,
    notify::Notifier,
    persons::{
        controller::SearchController,
        list::{PersonListView, SaveFailure},
        source::{PageQuery, PersonSource, PersonsV1Source, PersonsV2Source},
    },
    router::route::{Navigator, Route},
    storage::{memory::MemoryStore, KeyValueStore},
};

use common::{new_person, BackendState, FakeBackend};

mod common;

const DEBOUNCE: Duration = Duration::from_millis(20);

/// Backend with `count` people and a client already holding a valid token
fn signed_in(count: u64) -> (FakeBackend, Arc<dyn KeyValueStore>, Navigator) {
    let backend = FakeBackend::start(BackendState::with_people(count));
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "token-1").unwrap();

    (backend, store, Navigator::new(Route::Dashboard))
}

fn new_v2_view(
    backend: &FakeBackend,
    store: &Arc<dyn KeyValueStore>,
    navigator: &Navigator,
) -> PersonListView<PersonsV2Source> {
    let (notifier, _) = Notifier::new();
    let source = PersonsV2Source::new(backend.client(store.clone(), navigator.clone()));

    PersonListView::new(
        SearchController::new(source, notifier.clone(), 5, DEBOUNCE),
        notifier,
    )
}

fn ids(persons: &[PersonV2]) -> Vec<u64> {
    persons.iter().filter_map(|p| p.id).collect()
}

#[test_log::test(tokio::test)]
async fn v2_pages_come_back_at_the_right_offset() {
    // Given 12 people, 5 per page
    let (backend, store, navigator) = signed_in(12);
    let view = new_v2_view(&backend, &store, &navigator);
    let controller = view.controller();

    // When
    controller.refresh().await;

    // Then
    let state = controller.snapshot();
    assert_eq!(ids(&state.persons), vec![1, 2, 3, 4, 5]);
    assert_eq!(state.total_items, 12);
    assert_eq!(state.total_pages, 3);
    assert!(!state.has_previous());

    assert!(controller.go_to_page(3).await);

    let state = controller.snapshot();
    assert_eq!(ids(&state.persons), vec![11, 12]);
    assert_eq!(state.showing_range(), (11, 12, 12));
    assert!(!state.has_next());
    assert_eq!(state.page_window(), vec![1, 2, 3]);
}

#[test_log::test(tokio::test)]
async fn search_resets_to_first_page_and_narrows() {
    let (backend, store, navigator) = signed_in(12);
    let view = new_v2_view(&backend, &store, &navigator);
    let controller = view.controller();
    controller.refresh().await;
    controller.go_to_page(2).await;

    // Names are zero padded, "person 1" only matches 10, 11 and 12
    controller.set_search_term("pErSoN 1");
    controller.wait_for_search().await;

    let state = controller.snapshot();
    assert_eq!(state.current_page, PageNumber(1));
    assert_eq!(state.total_items, 3);
    assert_eq!(ids(&state.persons), vec![10, 11, 12]);
}

#[test_log::test(tokio::test)]
async fn delete_refetches_with_one_less() {
    let (backend, store, navigator) = signed_in(7);
    let view = new_v2_view(&backend, &store, &navigator);
    view.controller().refresh().await;

    let deleted = view
        .delete(&PersonId::from(3), &|_: &str| true)
        .await
        .unwrap();

    assert!(deleted);
    let state = view.controller().snapshot();
    assert_eq!(state.total_items, 6);
    assert_eq!(ids(&state.persons), vec![1, 2, 4, 5, 6]);
}

#[test_log::test(tokio::test)]
async fn save_failures_are_classified_from_backend_messages() {
    let (backend, store, navigator) = signed_in(2);
    let view = new_v2_view(&backend, &store, &navigator);

    // Same cpf and email as person 1
    view.open_add();
    let mut duplicate = new_person(1);
    duplicate.id = None;
    assert_eq!(view.save(duplicate).await, Err(SaveFailure::Duplicate));

    // Someone else removed the record being edited
    view.open_edit(new_person(99));
    assert_eq!(view.save(new_person(99)).await, Err(SaveFailure::NotFound));

    // A fresh record goes through and closes the editor
    view.open_add();
    let mut fresh = new_person(50);
    fresh.id = None;
    view.save(fresh).await.unwrap();

    assert_eq!(view.controller().snapshot().total_items, 3);
    assert_eq!(backend.state.people.lock().unwrap()[2].id, Some(3));
}

#[test_log::test(tokio::test)]
async fn save_with_expired_session_redirects() {
    let (backend, store, navigator) = signed_in(1);
    let view = new_v2_view(&backend, &store, &navigator);
    backend.state.expire_tokens();

    view.open_edit(new_person(1));
    let result = view.save(new_person(1)).await;

    assert_eq!(result, Err(SaveFailure::SessionExpired));
    assert_eq!(navigator.current(), Route::session_expired());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[test_log::test(tokio::test)]
async fn v1_source_pages_and_filters_locally() {
    let (backend, store, navigator) = signed_in(12);
    let source = PersonsV1Source::new(backend.client(store, navigator));

    let page = source
        .fetch_page(&PageQuery {
            page: PageNumber(2),
            items_per_page: 5,
            person_name: String::new(),
        })
        .await
        .unwrap();

    let page_ids: Vec<String> = page
        .persons
        .iter()
        .filter_map(|p| p.id.as_ref().map(|id| id.to_string()))
        .collect();
    assert_eq!(page_ids, vec!["6", "7", "8", "9", "10"]);
    assert_eq!(page.pagination.total_items, 12);

    let filtered = source
        .fetch_page(&PageQuery {
            page: PageNumber(1),
            items_per_page: 5,
            person_name: "person 0".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(filtered.pagination.total_items, 9);
    assert_eq!(filtered.pagination.total_pages(), 2);
}
