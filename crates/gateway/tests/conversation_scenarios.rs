//! End-to-end conversation turns against in-memory collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use tk_carrier::types::{STATUS_DELIVERED, STATUS_NOT_REGISTERED};
use tk_carrier::{LookupResult, StaticCarrierLookup};
use tk_domain::config::ConversationConfig;
use tk_domain::error::{Error, Result};
use tk_domain::tracking::CompletionFlag;
use tk_gateway::conversation::speech;
use tk_gateway::conversation::slots::{SLOT_ALIAS, SLOT_COMPANY, SLOT_NUMBER_PARTS};
use tk_gateway::conversation::{ConversationRouter, ConversationSession, Slot, Slots};
use tk_store::{Item, ItemBackend, ItemQuery, MemoryBackend, TrackingStore};

struct Harness {
    router: ConversationRouter,
    store: TrackingStore,
    carrier: Arc<StaticCarrierLookup>,
    backend: Arc<MemoryBackend>,
}

fn harness_with(config: ConversationConfig) -> Harness {
    let backend = Arc::new(MemoryBackend::new());
    let store = TrackingStore::new(backend.clone(), "Tracking");
    let carrier = Arc::new(StaticCarrierLookup::new());
    let router = ConversationRouter::new(store.clone(), carrier.clone(), config);
    Harness {
        router,
        store,
        carrier,
        backend,
    }
}

fn harness() -> Harness {
    harness_with(ConversationConfig::default())
}

fn tracking_slots(company: &str, parts: [&str; 4]) -> Slots {
    let mut slots = Slots::new();
    slots.insert(SLOT_COMPANY.into(), Slot::raw(company));
    for (name, value) in SLOT_NUMBER_PARTS.iter().zip(parts) {
        slots.insert((*name).into(), Slot::raw(value));
    }
    slots
}

fn alias_slots(alias: &str) -> Slots {
    let mut slots = Slots::new();
    slots.insert(SLOT_ALIAS.into(), Slot::raw(alias));
    slots
}

#[tokio::test]
async fn in_transit_query_persists_pending_and_opens_session() {
    let h = harness();
    h.carrier
        .set("Yamato", "1234567890", LookupResult::success("在途中"));

    let turn = h
        .router
        .handle(
            "TrackingRequestIntent",
            &tracking_slots("Yamato", ["123", "456", "789", "0"]),
            "user-1",
            None,
        )
        .await;

    assert!(turn.speech.contains("在途中"));
    assert!(!turn.should_end_session);
    let session = turn.session.expect("session opened");
    let payload = session.to_payload();
    assert_eq!(payload["company"], "Yamato");
    assert_eq!(payload["number"], "1234567890");

    let stored = h
        .store
        .get("user-1", "Yamato_1234567890")
        .await
        .into_value()
        .expect("record stored");
    assert_eq!(stored.flag, CompletionFlag::Pending);
}

#[tokio::test]
async fn alias_follow_up_names_the_tracking_and_closes_session() {
    let h = harness();
    h.carrier
        .set("Yamato", "1234567890", LookupResult::success("在途中"));
    let first = h
        .router
        .handle(
            "TrackingRequestIntent",
            &tracking_slots("Yamato", ["123", "456", "789", "0"]),
            "user-1",
            None,
        )
        .await;

    // The transport hands the payload back on the next turn.
    let incoming = ConversationSession::from_payload(&first.session.unwrap().to_payload());
    let turn = h
        .router
        .handle("SetAliasIntent", &alias_slots("Mom's gift"), "user-1", incoming)
        .await;

    assert_eq!(turn.speech, speech::ALIAS_SAVED);
    assert!(turn.should_end_session);
    assert!(turn.session.is_none());

    let stored = h
        .store
        .get("user-1", "Yamato_1234567890")
        .await
        .into_value()
        .unwrap();
    assert_eq!(stored.alias, "Mom's gift");
    assert_eq!(stored.flag, CompletionFlag::Pending);
}

#[tokio::test]
async fn alias_on_stale_session_keeps_delivered_record_closed() {
    let h = harness();
    h.store
        .put("user-1", "yamato_1", CompletionFlag::Delivered, "")
        .await
        .unwrap();

    let turn = h
        .router
        .handle(
            "SetAliasIntent",
            &alias_slots("gift"),
            "user-1",
            Some(ConversationSession::new("yamato", "1")),
        )
        .await;

    assert_eq!(turn.speech, speech::ALIAS_SAVED);
    let stored = h.store.get("user-1", "yamato_1").await.into_value().unwrap();
    assert_eq!(stored.flag, CompletionFlag::Delivered);
    assert_eq!(stored.alias, "gift");

    let listing = h.router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;
    assert_eq!(listing.speech, "ただいまの荷物は0個です。\n");
}

#[tokio::test]
async fn alias_without_session_writes_nothing() {
    let h = harness();
    let turn = h
        .router
        .handle("SetAliasIntent", &alias_slots("Mom's gift"), "user-1", None)
        .await;

    assert_eq!(turn.speech, speech::NO_TRACKING_IN_SESSION);
    assert!(turn.session.is_none());
    assert!(h.backend.is_empty());
}

#[tokio::test]
async fn delivered_query_persists_delivered_and_ends_session() {
    let h = harness();
    h.carrier
        .set("Yamato", "1234567890", LookupResult::success(STATUS_DELIVERED));

    let turn = h
        .router
        .handle(
            "TrackingRequestIntent",
            &tracking_slots("Yamato", ["123", "456", "789", "0"]),
            "user-1",
            None,
        )
        .await;

    assert_eq!(turn.speech, speech::DELIVERED);
    assert!(turn.should_end_session);
    assert!(turn.session.is_none());
    let stored = h
        .store
        .get("user-1", "Yamato_1234567890")
        .await
        .into_value()
        .unwrap();
    assert_eq!(stored.flag, CompletionFlag::Delivered);
}

#[tokio::test]
async fn empty_digit_group_skips_lookup_and_store() {
    let h = harness();
    let turn = h
        .router
        .handle(
            "TrackingRequestIntent",
            &tracking_slots("Yamato", ["123", "", "789", "0"]),
            "user-1",
            None,
        )
        .await;

    assert_eq!(turn.speech, speech::NOT_UNDERSTOOD);
    assert!(!turn.should_end_session);
    assert_eq!(h.carrier.calls(), 0);
    assert!(h.backend.is_empty());
}

#[tokio::test]
async fn list_all_keeps_freshly_delivered_record_for_one_pass() {
    let h = harness();
    h.store
        .put("user-1", "sagawa_111", CompletionFlag::Pending, "")
        .await
        .unwrap();
    h.store
        .put("user-1", "yamato_222", CompletionFlag::Pending, "Mom's gift")
        .await
        .unwrap();
    h.store
        .put("user-1", "yamato_333", CompletionFlag::Delivered, "")
        .await
        .unwrap();
    h.carrier
        .set("sagawa", "111", LookupResult::success("配達中"));
    h.carrier
        .set("yamato", "222", LookupResult::success(STATUS_DELIVERED));

    let turn = h.router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;

    assert_eq!(
        turn.speech,
        "ただいまの荷物は2個です。\n\
         1、sagawaの、一、一、一、、の荷物状況は、配達中。\n\
         2、yamatoの、Mom's gift、の荷物状況は、配達完了。\n"
    );
    assert_eq!(turn.card_title, speech::CARD_ALL_TRACKING);
    assert!(turn.should_end_session);
    assert!(turn.session.is_none());

    let rewritten = h.store.get("user-1", "yamato_222").await.into_value().unwrap();
    assert_eq!(rewritten.flag, CompletionFlag::Delivered);
    assert_eq!(rewritten.alias, "Mom's gift");

    // The next pass no longer sees it.
    let again = h.router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;
    assert!(again.speech.starts_with("ただいまの荷物は1個です。"));
}

#[tokio::test]
async fn list_all_can_exclude_delivered_in_the_same_pass() {
    let h = harness_with(ConversationConfig {
        exclude_delivered_from_listing: true,
        ..ConversationConfig::default()
    });
    h.store
        .put("user-1", "sagawa_111", CompletionFlag::Pending, "")
        .await
        .unwrap();
    h.store
        .put("user-1", "yamato_222", CompletionFlag::Pending, "")
        .await
        .unwrap();
    h.carrier
        .set("yamato", "222", LookupResult::success(STATUS_DELIVERED));

    let turn = h.router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;

    assert!(turn.speech.starts_with("ただいまの荷物は1個です。\n"));
    assert!(turn.speech.contains(STATUS_NOT_REGISTERED));
    let rewritten = h.store.get("user-1", "yamato_222").await.into_value().unwrap();
    assert_eq!(rewritten.flag, CompletionFlag::Delivered);
}

#[tokio::test]
async fn list_all_skips_undecodable_keys() {
    let backend = Arc::new(MemoryBackend::from_items([
        Item::new("user-1", "yamato1234").with("ShippingFinishFlg", "0"),
        Item::new("user-1", "yamato_5678").with("ShippingFinishFlg", "0"),
    ]));
    let store = TrackingStore::new(backend, "Tracking");
    let carrier = Arc::new(StaticCarrierLookup::new());
    carrier.set("yamato", "5678", LookupResult::success("配達中"));
    let router = ConversationRouter::new(store, carrier.clone(), ConversationConfig::default());

    let turn = router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;

    assert_eq!(
        turn.speech,
        "ただいまの荷物は1個です。\n\
         1、yamatoの、五、六、七、八、、の荷物状況は、配達中。\n"
    );
    assert_eq!(carrier.calls(), 1);
}

#[tokio::test]
async fn list_all_reads_unknown_and_unreachable_statuses() {
    let h = harness();
    h.store
        .put("user-1", "sagawa_1", CompletionFlag::Pending, "")
        .await
        .unwrap();
    h.store
        .put("user-1", "yamato_2", CompletionFlag::Pending, "box")
        .await
        .unwrap();
    // sagawa_1 has no carrier entry; yamato_2 hits a transport fault.
    h.carrier.set("yamato", "2", LookupResult::transport_fault());

    let turn = h.router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;

    assert_eq!(
        turn.speech,
        format!(
            "ただいまの荷物は2個です。\n\
             1、sagawaの、一、、の荷物状況は、{STATUS_NOT_REGISTERED}。\n\
             2、yamatoの、box、の荷物状況は、{}。\n",
            speech::STATUS_UNAVAILABLE
        )
    );
    let pending = h.store.query_all_pending("user-1").await.into_value();
    assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn list_all_for_unknown_user_reports_zero() {
    let h = harness();
    let turn = h.router.handle("getAllTrackingIntent", &Slots::new(), "nobody", None).await;
    assert_eq!(turn.speech, "ただいまの荷物は0個です。\n");
    assert_eq!(h.carrier.calls(), 0);
}

// ── Store failures ────────────────────────────────────────────────────

/// Reads answer nothing, writes fail.
struct UnavailableBackend;

#[async_trait]
impl ItemBackend for UnavailableBackend {
    async fn get_item(&self, _: &str, _: &str) -> Result<Option<Item>> {
        Err(Error::Store("connection refused".into()))
    }

    async fn put_item(&self, _: Item) -> Result<()> {
        Err(Error::Store("connection refused".into()))
    }

    async fn query(&self, _: &ItemQuery) -> Result<Vec<Item>> {
        Err(Error::Store("connection refused".into()))
    }

    async fn delete_item(&self, _: &str, _: &str) -> Result<()> {
        Err(Error::Store("connection refused".into()))
    }
}

/// Reads succeed, writes fail.
struct ReadOnlyBackend(MemoryBackend);

#[async_trait]
impl ItemBackend for ReadOnlyBackend {
    async fn get_item(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>> {
        self.0.get_item(partition_key, sort_key).await
    }

    async fn put_item(&self, _: Item) -> Result<()> {
        Err(Error::Store("table is read-only".into()))
    }

    async fn query(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        self.0.query(query).await
    }

    async fn delete_item(&self, _: &str, _: &str) -> Result<()> {
        Err(Error::Store("table is read-only".into()))
    }
}

fn unavailable_router(carrier: Arc<StaticCarrierLookup>) -> ConversationRouter {
    let store = TrackingStore::new(Arc::new(UnavailableBackend), "Tracking");
    ConversationRouter::new(store, carrier, ConversationConfig::default())
}

#[tokio::test]
async fn failed_write_apologises_without_session() {
    let carrier = Arc::new(StaticCarrierLookup::new());
    carrier.set("yamato", "0001", LookupResult::success("在途中"));
    let router = unavailable_router(carrier.clone());

    let turn = router
        .handle(
            "TrackingRequestIntent",
            &tracking_slots("yamato", ["1", "", "", ""]),
            "user-1",
            None,
        )
        .await;
    // Incomplete slots never reach the store.
    assert_eq!(turn.speech, speech::NOT_UNDERSTOOD);

    let turn = router
        .handle(
            "TrackingRequestIntent",
            &tracking_slots("yamato", ["0", "0", "0", "1"]),
            "user-1",
            None,
        )
        .await;
    assert_eq!(carrier.calls(), 1);
    assert_eq!(turn.speech, speech::WRITE_FAILED);
    assert!(turn.session.is_none());
}

#[tokio::test]
async fn failed_alias_write_apologises() {
    let router = unavailable_router(Arc::new(StaticCarrierLookup::new()));
    let turn = router
        .handle(
            "SetAliasIntent",
            &alias_slots("Mom's gift"),
            "user-1",
            Some(ConversationSession::new("yamato", "1")),
        )
        .await;
    assert_eq!(turn.speech, speech::WRITE_FAILED);
}

#[tokio::test]
async fn degraded_listing_still_answers() {
    let carrier = Arc::new(StaticCarrierLookup::new());
    let router = unavailable_router(carrier.clone());
    let turn = router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;
    assert_eq!(turn.speech, "ただいまの荷物は0個です。\n");
    assert_eq!(carrier.calls(), 0);
}

#[tokio::test]
async fn list_all_speaks_lines_whose_write_back_failed() {
    let backend = ReadOnlyBackend(MemoryBackend::from_items([
        Item::new("user-1", "sagawa_1").with("ShippingFinishFlg", "0"),
        Item::new("user-1", "yamato_2").with("ShippingFinishFlg", "0"),
    ]));
    let store = TrackingStore::new(Arc::new(backend), "Tracking");
    let carrier = Arc::new(StaticCarrierLookup::new());
    carrier.set("sagawa", "1", LookupResult::success("配達中"));
    carrier.set("yamato", "2", LookupResult::success(STATUS_DELIVERED));
    let router = ConversationRouter::new(store.clone(), carrier.clone(), ConversationConfig::default());

    let turn = router.handle("getAllTrackingIntent", &Slots::new(), "user-1", None).await;

    assert_eq!(
        turn.speech,
        "ただいまの荷物は2個です。\n\
         1、sagawaの、一、、の荷物状況は、配達中。\n\
         2、yamatoの、二、、の荷物状況は、配達完了。\n"
    );
    assert_eq!(carrier.calls(), 2);
    let stored = store.get("user-1", "yamato_2").await.into_value().unwrap();
    assert_eq!(stored.flag, CompletionFlag::Pending);
}
