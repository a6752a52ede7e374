//! Tests for the in-memory store.

use animebot_core::{CatalogItem, CatalogItemBuilder, Direction, NewUser, ToggleAction, ToggleOutcome};
use animebot_database::InMemoryStore;
use animebot_interface::{CatalogStore, SubscriptionStore, UserStore};

fn item(id: i64, primary: &str, alternate: &str) -> CatalogItem {
    CatalogItemBuilder::default()
        .id(id)
        .external_id(format!("ext-{}", id))
        .primary_name(primary)
        .alternate_name(alternate)
        .build()
        .expect("Valid item")
}

async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.put_item(item(1, "Наруто", "Naruto")).await;
    store.put_item(item(2, "Наруто: Ураганные хроники", "Naruto: Shippuden")).await;
    store.put_item(item(3, "Ван-Пис", "One Piece")).await;
    store
}

#[tokio::test]
async fn test_find_or_insert_reports_prior_existence() {
    let store = InMemoryStore::new();
    let new_user = NewUser::new("1001", "mika");

    let first = store.find_or_insert(&new_user).await.unwrap();
    let second = store.find_or_insert(&new_user).await.unwrap();

    assert!(!first.existed_before);
    assert!(second.existed_before);
    assert_eq!(first.user.id, second.user.id);
    assert_eq!(store.user_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_first_contact_creates_one_user() {
    let store = InMemoryStore::new();
    let calls = (0..16).map(|_| {
        let store = store.clone();
        async move { store.find_or_insert(&NewUser::new("42", "race")).await }
    });

    let results = futures::future::join_all(calls).await;
    let fresh = results
        .iter()
        .filter(|r| !r.as_ref().unwrap().existed_before)
        .count();

    assert_eq!(fresh, 1);
    assert_eq!(store.user_count().await, 1);
}

#[tokio::test]
async fn test_toggle_twice_restores_membership() {
    let store = seeded_store().await;

    let first = store.toggle(7, 1, None).await.unwrap();
    assert_eq!(first, ToggleOutcome::Applied(ToggleAction::Subscribed));
    assert!(store.exists(7, 1).await.unwrap());

    let second = store.toggle(7, 1, None).await.unwrap();
    assert_eq!(second, ToggleOutcome::Applied(ToggleAction::Unsubscribed));
    assert!(!store.exists(7, 1).await.unwrap());
}

#[tokio::test]
async fn test_directed_toggle_does_not_mutate_when_state_matches() {
    let store = seeded_store().await;

    let outcome = store.toggle(7, 1, Some(Direction::Unsubscribe)).await.unwrap();

    assert_eq!(outcome, ToggleOutcome::Unchanged { subscribed: false });
    assert_eq!(store.subscription_count().await, 0);
}

#[tokio::test]
async fn test_failed_toggle_leaves_state_untouched() {
    let store = seeded_store().await;
    store.set_fail_writes(true);

    let result = store.toggle(7, 1, None).await;

    assert!(result.is_err());
    assert_eq!(store.subscription_count().await, 0);
}

#[tokio::test]
async fn test_search_is_case_insensitive_across_both_names() {
    let store = seeded_store().await;

    let results = store.search_by_substring(7, "naruto", 50).await.unwrap();

    let ids: Vec<i64> = results.iter().map(|r| r.item.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let cyrillic = store.search_by_substring(7, "ван", 50).await.unwrap();
    assert_eq!(cyrillic.len(), 1);
    assert_eq!(cyrillic[0].item.id, 3);
}

#[tokio::test]
async fn test_search_annotation_reflects_membership() {
    let store = seeded_store().await;
    SubscriptionStore::insert(&store, 7, 2).await.unwrap();

    let results = store.search_by_substring(7, "NARUTO", 50).await.unwrap();

    assert!(!results[0].subscribed);
    assert!(results[1].subscribed);

    let other_user = store.search_by_substring(8, "naruto", 50).await.unwrap();
    assert!(other_user.iter().all(|r| !r.subscribed));
}

#[tokio::test]
async fn test_search_respects_limit() {
    let store = seeded_store().await;
    let results = store.search_by_substring(7, "a", 1).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_subscribed_and_unsubscribed_partition_catalog() {
    let store = seeded_store().await;
    SubscriptionStore::insert(&store, 7, 3).await.unwrap();

    let followed = store.list_subscribed(7).await.unwrap();
    let rest = store.list_unsubscribed(7).await.unwrap();

    assert_eq!(followed.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3]);
    assert_eq!(rest.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn test_find_by_name_matches_either_name_exactly() {
    let store = seeded_store().await;

    assert_eq!(store.find_by_name("One Piece").await.unwrap().map(|i| i.id), Some(3));
    assert_eq!(store.find_by_name("Ван-Пис").await.unwrap().map(|i| i.id), Some(3));
    assert!(store.find_by_name("one piece").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_by_empty_name_matches_nothing() {
    let store = seeded_store().await;
    store.put_item(item(4, "Гинтама", "")).await;

    assert!(store.find_by_name("").await.unwrap().is_none());
    assert_eq!(store.find_by_name("Гинтама").await.unwrap().unwrap().id, 4);
}
