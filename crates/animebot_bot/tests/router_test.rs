//! End-to-end dispatch tests over the in-memory store.

use animebot_bot::{CommandRouter, parse_update};
use animebot_core::{
    CatalogItem, CatalogItemBuilder, Interaction, OutboundNotification, RETURNING_TEXT, Sender,
    ToggleAction, WELCOME_TEXT,
};
use animebot_database::InMemoryStore;
use animebot_error::{AnimebotErrorKind, PublishError, PublishErrorKind};
use animebot_interface::{NotificationPublisher, SubscriptionStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Publisher double that records what it was asked to send.
#[derive(Default)]
struct RecordingPublisher {
    sent: Mutex<Vec<OutboundNotification>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    fn sent(&self) -> Vec<OutboundNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationPublisher for RecordingPublisher {
    async fn publish(&self, notification: &OutboundNotification) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::new(PublishErrorKind::Connection(
                "bus down".to_string(),
            )));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn item(id: i64, primary: &str, alternate: &str) -> CatalogItem {
    CatalogItemBuilder::default()
        .id(id)
        .external_id(format!("{}", 1000 + id))
        .primary_name(primary)
        .alternate_name(alternate)
        .build()
        .expect("Valid item")
}

struct Harness {
    store: InMemoryStore,
    publisher: Arc<RecordingPublisher>,
    router: CommandRouter,
}

async fn harness() -> Harness {
    let store = InMemoryStore::new();
    store.put_item(item(42, "Наруто", "Naruto")).await;
    store
        .put_item(item(43, "Наруто: Ураганные хроники", "Naruto: Shippuden"))
        .await;
    store.put_item(item(44, "Ван-Пис", "One Piece")).await;

    let publisher = Arc::new(RecordingPublisher::default());
    let shared = Arc::new(store.clone());
    let router = CommandRouter::new(
        shared.clone(),
        shared.clone(),
        shared,
        publisher.clone(),
    );
    Harness {
        store,
        publisher,
        router,
    }
}

fn sender() -> Sender {
    Sender {
        external_id: "7001".to_string(),
        display_name: "mika".to_string(),
    }
}

fn text(body: &str) -> Interaction {
    Interaction::TextMessage {
        sender: sender(),
        chat_id: 7001,
        text: body.to_string(),
    }
}

fn callback(data: &str) -> Interaction {
    Interaction::CallbackAction {
        id: "cb-1".to_string(),
        sender: sender(),
        data: data.to_string(),
        chat_id: 7001,
        message_id: 55,
    }
}

#[tokio::test]
async fn test_start_welcomes_then_greets_returning_user() {
    let h = harness().await;

    let first = h.router.handle(text("/start")).await.unwrap();
    let second = h.router.handle(text("/start")).await.unwrap();

    assert_eq!(
        first,
        OutboundNotification::Welcome {
            chat_id: 7001,
            returning: false,
            text: WELCOME_TEXT.to_string(),
        }
    );
    assert_eq!(
        second,
        OutboundNotification::Welcome {
            chat_id: 7001,
            returning: true,
            text: RETURNING_TEXT.to_string(),
        }
    );
    assert_eq!(h.store.user_count().await, 1);
    assert_eq!(h.publisher.sent().len(), 2);
}

#[tokio::test]
async fn test_name_toggles_twice_back_to_original_state() {
    let h = harness().await;

    let first = h.router.handle(text("Naruto")).await.unwrap();
    assert!(matches!(
        first,
        OutboundNotification::ToggleResult {
            action: ToggleAction::Subscribed,
            item_id: 42,
            message_id: None,
            ..
        }
    ));
    assert_eq!(h.store.subscription_count().await, 1);

    let second = h.router.handle(text("Наруто")).await.unwrap();
    assert!(matches!(
        second,
        OutboundNotification::ToggleResult {
            action: ToggleAction::Unsubscribed,
            item_id: 42,
            ..
        }
    ));
    assert_eq!(h.store.subscription_count().await, 0);
}

#[tokio::test]
async fn test_unknown_name_is_not_found() {
    let h = harness().await;

    let note = h.router.handle(text("Bleach")).await.unwrap();

    assert_eq!(note, OutboundNotification::error(Some(7001), "not found"));
    assert_eq!(h.store.subscription_count().await, 0);
}

#[tokio::test]
async fn test_start_with_item_prompts_with_membership() {
    let h = harness().await;

    let before = h.router.handle(text("/start 1042")).await.unwrap();
    match before {
        OutboundNotification::TogglePrompt {
            item, subscribed, ..
        } => {
            assert_eq!(item.id, 42);
            assert!(!subscribed);
        }
        other => panic!("Unexpected notification: {:?}", other),
    }

    h.router.handle(text("Naruto")).await.unwrap();
    let after = h.router.handle(text("/start 1042")).await.unwrap();
    assert!(matches!(
        after,
        OutboundNotification::TogglePrompt {
            subscribed: true,
            ..
        }
    ));
    assert_eq!(h.store.subscription_count().await, 1);
}

#[tokio::test]
async fn test_start_with_unknown_item_falls_through_to_name_lookup() {
    let h = harness().await;

    let note = h.router.handle(text("/start 9999")).await.unwrap();

    assert_eq!(note, OutboundNotification::error(Some(7001), "not found"));
}

#[tokio::test]
async fn test_catalog_and_subscription_lists_partition_the_catalog() {
    let h = harness().await;
    h.router.handle(text("One Piece")).await.unwrap();

    let catalog = h.router.handle(text("/animes")).await.unwrap();
    let subscriptions = h.router.handle(text("/subscriptions")).await.unwrap();

    let OutboundNotification::CatalogList { items: unsubscribed, .. } = catalog else {
        panic!("Expected catalog list");
    };
    let OutboundNotification::SubscriptionList { items: subscribed, .. } = subscriptions else {
        panic!("Expected subscription list");
    };
    let mut ids: Vec<i64> = unsubscribed.iter().map(|item| item.id).collect();
    ids.sort();
    assert_eq!(ids, vec![42, 43]);
    assert_eq!(subscribed.len(), 1);
    assert_eq!(subscribed[0].id, 44);
}

#[tokio::test]
async fn test_inline_search_is_case_insensitive_and_annotated() {
    let h = harness().await;
    h.router.handle(text("Naruto: Shippuden")).await.unwrap();

    let note = h
        .router
        .handle(Interaction::InlineSearch {
            id: "q-1".to_string(),
            sender: sender(),
            query: "naruto".to_string(),
        })
        .await
        .unwrap();

    let OutboundNotification::InlineResults { query_id, items } = note else {
        panic!("Expected inline results");
    };
    assert_eq!(query_id, "q-1");
    assert_eq!(items.len(), 2);
    for annotated in items {
        assert_eq!(annotated.subscribed, annotated.item.id == 43);
    }
}

#[tokio::test]
async fn test_callback_subscribes_and_addresses_the_message() {
    let h = harness().await;

    let note = h.router.handle(callback("sub 42")).await.unwrap();

    assert_eq!(
        note,
        OutboundNotification::ToggleResult {
            action: ToggleAction::Subscribed,
            chat_id: 7001,
            message_id: Some(55),
            callback_id: Some("cb-1".to_string()),
            item_id: 42,
        }
    );
    assert!(h.store.exists(1, 42).await.unwrap());
}

#[tokio::test]
async fn test_directional_callback_already_in_state_is_a_no_op() {
    let h = harness().await;
    h.router.handle(callback("sub 42")).await.unwrap();

    let again = h.router.handle(callback("sub 42")).await.unwrap();
    assert_eq!(
        again,
        OutboundNotification::error(Some(7001), "already subscribed")
    );
    assert_eq!(h.store.subscription_count().await, 1);

    let unsub = h.router.handle(callback("unsub 43")).await.unwrap();
    assert_eq!(unsub, OutboundNotification::error(Some(7001), "not subscribed"));
    assert_eq!(h.store.subscription_count().await, 1);
}

#[tokio::test]
async fn test_malformed_callback_rejected_without_mutation() {
    let h = harness().await;

    for data in ["sub", "sub x", "sub 42 extra", "follow 42"] {
        let err = h.router.handle(callback(data)).await.unwrap_err();
        assert!(
            matches!(err.kind(), AnimebotErrorKind::Parse(_)),
            "{} should be a parse error",
            data
        );
    }

    assert_eq!(h.store.user_count().await, 0);
    assert_eq!(h.store.subscription_count().await, 0);
    assert!(h.publisher.sent().is_empty());
}

#[tokio::test]
async fn test_callback_for_unknown_item_is_not_found() {
    let h = harness().await;

    let note = h.router.handle(callback("sub 999")).await.unwrap();

    assert_eq!(note, OutboundNotification::error(Some(7001), "not found"));
    assert_eq!(h.store.subscription_count().await, 0);
}

#[tokio::test]
async fn test_persistence_failure_publishes_nothing() {
    let h = harness().await;
    h.router.handle(text("/start")).await.unwrap();
    h.store.set_fail_writes(true);

    let err = h.router.handle(text("Naruto")).await.unwrap_err();

    assert!(matches!(err.kind(), AnimebotErrorKind::Database(_)));
    assert_eq!(h.store.subscription_count().await, 0);
    assert_eq!(h.publisher.sent().len(), 1);
}

#[tokio::test]
async fn test_publish_failure_keeps_committed_toggle() {
    let h = harness().await;
    h.publisher.fail.store(true, Ordering::SeqCst);

    let err = h.router.handle(text("Naruto")).await.unwrap_err();

    assert!(matches!(err.kind(), AnimebotErrorKind::Publish(_)));
    assert_eq!(h.store.subscription_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_toggles_on_one_pair_alternate() {
    let h = harness().await;
    h.router.handle(text("/start")).await.unwrap();

    let tasks = (0..8).map(|_| {
        let router = h.router.clone();
        tokio::spawn(async move { router.handle(text("Naruto")).await })
    });
    let results = futures::future::join_all(tasks).await;

    let subscribed = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .filter(|note| {
            matches!(
                note,
                OutboundNotification::ToggleResult {
                    action: ToggleAction::Subscribed,
                    ..
                }
            )
        })
        .count();
    assert_eq!(subscribed, 4);
    assert_eq!(h.store.subscription_count().await, 0);
}

#[tokio::test]
async fn test_parsed_update_flows_through_router() {
    let h = harness().await;
    let body = br#"{
        "update_id": 1,
        "callback_query": {
            "id": "cb-9",
            "from": {"id": 7001, "first_name": "Mika"},
            "message": {"message_id": 55, "chat": {"id": 7001}},
            "data": "sub 44"
        }
    }"#;

    let interaction = parse_update(body).unwrap();
    let note = h.router.handle(interaction).await.unwrap();

    assert!(matches!(
        note,
        OutboundNotification::ToggleResult {
            action: ToggleAction::Subscribed,
            item_id: 44,
            ..
        }
    ));
}

#[tokio::test]
async fn test_blank_text_never_toggles_an_untitled_item() {
    let h = harness().await;
    h.store.put_item(item(45, "Гинтама", "")).await;

    for body in ["   ", "", "\t"] {
        let note = h.router.handle(text(body)).await.unwrap();
        assert_eq!(note, OutboundNotification::error(Some(7001), "not found"));
    }

    assert_eq!(h.store.subscription_count().await, 0);
}

#[tokio::test]
async fn test_inline_search_without_matches_is_empty() {
    let h = harness().await;

    let note = h
        .router
        .dispatch(Interaction::InlineSearch {
            id: "q-2".to_string(),
            sender: sender(),
            query: "bleach".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(
        note,
        OutboundNotification::InlineResults {
            query_id: "q-2".to_string(),
            items: Vec::new(),
        }
    );
    assert!(h.publisher.sent().is_empty());
}
