use super::*;
use crate::{ListDirection, ListImport, PageCursor, PageInfo};

fn ids(store: &EntityStore, key: &str) -> Vec<String> {
    store.list_ids(Entities::Statuses, key).unwrap()
}

fn page(next: Option<&str>) -> PageInfo {
    PageInfo {
        next: next.map(Into::into),
        prev: None,
        total_count: None,
    }
}

#[test]
fn test_append_deduplicates_and_keeps_order() {
    let store = test_store();
    store
        .import_list("home", notes(&["3", "2"]), ListImport::Replace)
        .unwrap();
    store
        .import_list("home", notes(&["2", "1", "1", "0"]), ListImport::Append)
        .unwrap();

    assert_eq!(ids(&store, "home"), vec!["3", "2", "1", "0"]);
}

#[test]
fn test_prepend_keeps_existing_positions() {
    let store = test_store();
    store
        .import_list("home", notes(&["2", "1"]), ListImport::Replace)
        .unwrap();
    store
        .import_list("home", notes(&["4", "3", "2"]), ListImport::Prepend)
        .unwrap();

    assert_eq!(ids(&store, "home"), vec!["4", "3", "2", "1"]);
}

#[test]
fn test_replace_drops_old_ids_but_not_records() {
    let store = test_store();
    store
        .import_list("home", notes(&["1", "2"]), ListImport::Replace)
        .unwrap();
    store
        .import_list("home", notes(&["3"]), ListImport::Replace)
        .unwrap();

    assert_eq!(ids(&store, "home"), vec!["3"]);
    assert!(store.get::<Note>("1").unwrap().is_some());
}

#[test]
fn test_no_duplicates_after_mixed_operations() {
    let store = test_store();
    store
        .import_list("home", notes(&["5", "4", "3"]), ListImport::Replace)
        .unwrap();
    store
        .import_list("home", notes(&["6", "5"]), ListImport::Prepend)
        .unwrap();
    store
        .import_list("home", notes(&["3", "2", "6"]), ListImport::Append)
        .unwrap();
    store.insert_streamed("home", note("4", "edited")).unwrap();

    let list = ids(&store, "home");
    assert_eq!(list, vec!["6", "5", "4", "3", "2"]);
    let mut unique = list.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), list.len());
    assert_eq!(store.get::<Note>("4").unwrap().unwrap().text, "edited");
}

#[test]
fn test_page_cursor_updates() {
    let store = test_store();
    let token = store
        .begin_fetch(Entities::Statuses, "home", ListDirection::NewestFirst)
        .unwrap();
    assert!(store.list_state(Entities::Statuses, "home").unwrap().unwrap().fetching);

    let first = PageInfo {
        next: Some("https://example.com/api/v1/timelines/home?max_id=1".into()),
        prev: Some("https://example.com/api/v1/timelines/home?min_id=1".into()),
        total_count: Some(2),
    };
    assert!(store
        .import_page(token, "home", notes(&["1"]), PageCursor::First(first))
        .unwrap());

    let query = store.query::<Note>("home").unwrap();
    assert!(query.has_next_page());
    assert!(query.has_previous_page());
    assert!(!query.is_fetching());
    assert!(query.state.fetched);
    assert_eq!(query.state.total_count, Some(2));

    let token = store
        .begin_fetch(Entities::Statuses, "home", ListDirection::NewestFirst)
        .unwrap();
    store
        .import_page(token, "home", notes(&["2"]), PageCursor::Next(page(None)))
        .unwrap();

    let query = store.query::<Note>("home").unwrap();
    assert_eq!(
        query.entities.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );
    assert!(!query.has_next_page());
    // The previous-page cursor is untouched by a next-page fetch.
    assert!(query.has_previous_page());
}

#[test]
fn test_oldest_first_list_places_pages_at_head() {
    let store = test_store();
    let token = store
        .begin_fetch(Entities::Statuses, "chat:1", ListDirection::OldestFirst)
        .unwrap();
    store
        .import_page(token, "chat:1", notes(&["8", "9"]), PageCursor::First(page(Some("older"))))
        .unwrap();
    let token = store
        .begin_fetch(Entities::Statuses, "chat:1", ListDirection::OldestFirst)
        .unwrap();
    store
        .import_page(token, "chat:1", notes(&["6", "7"]), PageCursor::Next(page(None)))
        .unwrap();
    store.insert_streamed("chat:1", note("10", "")).unwrap();

    assert_eq!(ids(&store, "chat:1"), vec!["6", "7", "8", "9", "10"]);
}

#[test]
fn test_stale_token_after_reset_is_dropped() {
    let store = test_store();
    let token = store
        .begin_fetch(Entities::Statuses, "home", ListDirection::NewestFirst)
        .unwrap();
    store.reset().unwrap();

    let applied = store
        .import_page(token, "home", notes(&["1"]), PageCursor::First(page(None)))
        .unwrap();
    assert!(!applied);
    assert_eq!(store.count(Entities::Statuses).unwrap(), 0);
    assert!(store.list_state(Entities::Statuses, "home").unwrap().is_none());
}

#[test]
fn test_stale_token_after_remove_list_is_dropped() {
    let store = test_store();
    let token = store
        .begin_fetch(Entities::Statuses, "home", ListDirection::NewestFirst)
        .unwrap();
    assert!(store.remove_list(Entities::Statuses, "home").unwrap());
    // A new list under the same key does not accept the old token.
    store
        .begin_fetch(Entities::Statuses, "home", ListDirection::NewestFirst)
        .unwrap();

    let applied = store
        .import_page(token, "home", notes(&["1"]), PageCursor::First(page(None)))
        .unwrap();
    assert!(!applied);
    assert!(ids(&store, "home").is_empty());
}

#[test]
fn test_fail_fetch_keeps_contents() {
    let store = test_store();
    store
        .import_list("home", notes(&["1"]), ListImport::Replace)
        .unwrap();
    let token = store
        .begin_fetch(Entities::Statuses, "home", ListDirection::NewestFirst)
        .unwrap();
    assert!(store
        .fail_fetch(Entities::Statuses, "home", token, "boom".into())
        .unwrap());

    let query = store.query::<Note>("home").unwrap();
    assert_eq!(query.entities.len(), 1);
    assert!(query.is_error());
    assert!(!query.is_fetching());
}

#[test]
fn test_streamed_record_skips_unobserved_list() {
    let store = test_store();
    let inserted = store.insert_streamed("public", note("1", "")).unwrap();

    assert!(!inserted);
    assert!(store.list_state(Entities::Statuses, "public").unwrap().is_none());
    assert!(store.get::<Note>("1").unwrap().is_some());
}

#[test]
fn test_dismiss_and_invalidate_list() {
    let store = test_store();
    store
        .import_list("requests", notes(&["1", "2"]), ListImport::Replace)
        .unwrap();

    assert_eq!(store.dismiss(Entities::Statuses, "requests", &["1"]).unwrap(), 1);
    assert_eq!(ids(&store, "requests"), vec!["2"]);
    assert!(store.get::<Note>("1").unwrap().is_some());

    assert!(store.invalidate_list(Entities::Statuses, "requests").unwrap());
    assert!(store.query::<Note>("requests").unwrap().is_invalid());
}

#[test]
fn test_query_unknown_list_is_empty() {
    let store = test_store();
    let query = store.query::<Note>("nothing").unwrap();

    assert!(query.entities.is_empty());
    assert!(!query.has_next_page());
    assert!(!query.is_loading());
}
