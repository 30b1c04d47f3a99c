mod support;

use bazaar_api::{FailureClass, Method, NoticeKind, TransportError};
use bazaar_client::{ConversationResolver, ListingDraft, ListingPatch};
use serde_json::json;
use support::{failed_envelope, harness, ok_envelope, wire_listing};

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn network_failures_exhaust_the_full_retry_budget() {
    let h = harness();
    for _ in 0..4 {
        h.transport
            .push_error(TransportError::ConnectionFailed("reset".into()));
    }

    let err = h.client.fetch_favorites().await.expect_err("failure");

    // Budget of 3 means 4 attempts in total.
    assert_eq!(h.transport.call_count(), 4);
    assert!(err.is_network_error);
    assert_eq!(err.context.as_deref(), Some("Fetching favorites"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn server_errors_are_retried_until_success() {
    let h = harness();
    h.transport.push_response(502, json!({ "message": "bad gateway" }));
    h.transport
        .push_response(200, ok_envelope(json!([wire_listing("l1")])));

    let page = h.client.fetch_favorites().await.expect("favorites");

    assert_eq!(h.transport.call_count(), 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "l1");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn client_errors_are_never_retried() {
    let h = harness();
    h.transport.push_response(403, json!({ "message": "not yours" }));

    let err = h
        .client
        .update_listing("l1", &ListingPatch {
            title: Some("New title".into()),
            ..ListingPatch::default()
        })
        .await
        .expect_err("failure");

    assert_eq!(h.transport.call_count(), 1);
    assert_eq!(err.status, Some(403));
    assert_eq!(err.class(), FailureClass::Client);
    let notices = h.notifier.snapshot();
    assert_eq!(notices.last().map(|n| n.message.as_str()),
        Some("Updating listing failed: you are not allowed to do that"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn first_attempt_success_performs_exactly_one_call() {
    let h = harness();
    h.transport
        .push_response(200, ok_envelope(json!(wire_listing("l9"))));

    let listing = h.client.get_listing("l9").await.expect("listing");

    assert_eq!(h.transport.call_count(), 1);
    assert_eq!(listing.id, "l9");
    assert_eq!(listing.price_cents, 1500);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn toggle_favorite_resolves_to_the_new_state() {
    let h = harness();
    h.transport.push_response(200, json!({ "success": true }));
    h.transport.push_response(200, json!({ "success": true }));

    let now_favorite = h
        .client
        .toggle_favorite("L1", false)
        .await
        .expect("toggle on");
    assert!(now_favorite);

    let now_favorite = h
        .client
        .toggle_favorite("L1", true)
        .await
        .expect("toggle off");
    assert!(!now_favorite);

    let requests = h.transport.requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[1].method, Method::Delete);
    assert_eq!(requests[0].path, "/favorites/L1");

    let messages: Vec<String> = h
        .notifier
        .snapshot()
        .into_iter()
        .filter(|n| n.kind == NoticeKind::Success)
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["Added to favorites", "Removed from favorites"]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn batch_validation_skips_and_counts_invalid_items() {
    let h = harness();
    let mut items = vec![
        wire_listing("l1"),
        wire_listing("l2"),
        wire_listing("l3"),
    ];
    items.push(json!({ "id": "l4", "title": "" }));
    items.push(json!({ "priceCents": -2 }));
    h.transport.push_response(200, ok_envelope(json!(items)));

    let page = h.client.fetch_favorites().await.expect("favorites");

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.skipped, 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn similar_listings_drop_malformed_items() {
    let h = harness();
    h.transport.push_response(
        200,
        ok_envelope(json!([
            json!({ "id": "bad" }),
            wire_listing("l2"),
        ])),
    );

    let listings = h.client.get_similar_listings("books", "L1").await;

    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, "l2");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn similar_listings_degrade_to_empty_on_any_failure() {
    let h = harness();
    for _ in 0..3 {
        h.transport
            .push_error(TransportError::ConnectionFailed("reset".into()));
    }

    let listings = h.client.get_similar_listings("books", "L1").await;

    assert!(listings.is_empty());
    // Secondary UI never pushes an error notice either.
    assert!(
        h.notifier
            .snapshot()
            .iter()
            .all(|n| n.kind != NoticeKind::Error)
    );
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn upload_rejects_invalid_draft_before_any_transport_call() {
    let h = harness();

    let err = h
        .client
        .upload_listing(&ListingDraft {
            title: String::new(),
            description: String::new(),
            category: "books".into(),
            price_cents: -10,
            image_url: None,
        })
        .await
        .expect_err("invalid draft");

    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(err.class(), FailureClass::Validation);
    let errors = err.validation_errors.expect("field errors");
    assert!(errors.contains_key("title"));
    assert!(errors.contains_key("price_cents"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn upload_sends_wire_convention_body_and_validates_response() {
    let h = harness();
    h.transport
        .push_response(200, ok_envelope(json!(wire_listing("l5"))));

    let listing = h
        .client
        .upload_listing(&ListingDraft {
            title: "Desk lamp".into(),
            description: "Barely used".into(),
            category: "furniture".into(),
            price_cents: 1500,
            image_url: None,
        })
        .await
        .expect("created listing");

    assert_eq!(listing.id, "l5");

    let requests = h.transport.requests();
    let body = requests[0].body.as_ref().expect("request body");
    assert_eq!(body["priceCents"], json!(1500));
    assert!(body.get("price_cents").is_none());

    let success: Vec<_> = h
        .notifier
        .snapshot()
        .into_iter()
        .filter(|n| n.kind == NoticeKind::Success)
        .collect();
    assert_eq!(success[0].message, "Listing published");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn envelope_declared_failure_carries_message_and_code() {
    let h = harness();
    h.transport
        .push_response(200, failed_envelope("listing is archived"));

    let err = h.client.get_listing("l1").await.expect_err("failure");

    assert_eq!(h.transport.call_count(), 1);
    assert_eq!(err.message, "listing is archived");
    assert_eq!(err.code.as_deref(), Some("FETCH_FAILED"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn resolver_rejects_self_contact_without_transport() {
    let h = harness();
    let resolver = ConversationResolver::new(h.client.clone());

    let err = resolver.resolve("u1", "u1", "L1").await.expect_err("rejected");

    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(err.class(), FailureClass::User);
    assert_eq!(err.message, "you cannot start a conversation with yourself");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn resolver_rejects_missing_identifiers_without_transport() {
    let h = harness();
    let resolver = ConversationResolver::new(h.client.clone());

    let err = resolver.resolve("u1", "", "L1").await.expect_err("rejected");

    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(err.class(), FailureClass::User);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn resolver_is_idempotent_for_one_identity_key() {
    let h = harness();
    let conversation = json!({
        "id": "abc",
        "buyerId": "u1",
        "sellerId": "u2",
        "listingId": "L1",
    });
    h.transport.push_response(200, ok_envelope(conversation.clone()));
    h.transport.push_response(200, ok_envelope(conversation));
    let resolver = ConversationResolver::new(h.client.clone());

    let first = resolver.resolve("u1", "u2", "L1").await.expect("resolved");
    let second = resolver.resolve("u1", "u2", "L1").await.expect("resolved");

    assert_eq!(first, "abc");
    assert_eq!(second, "abc");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn resolver_create_is_not_retried_after_a_server_response() {
    let h = harness();
    h.transport.push_response(500, json!({ "message": "boom" }));
    let resolver = ConversationResolver::new(h.client.clone());

    let err = resolver.resolve("u1", "u2", "L1").await.expect_err("failure");

    // A 5xx still means the server may have created the conversation.
    assert_eq!(h.transport.call_count(), 1);
    assert_eq!(err.status, Some(500));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn resolver_transport_failure_is_reported_exactly_once() {
    let h = harness();
    h.transport.push_response(404, json!({ "message": "listing gone" }));
    let resolver = ConversationResolver::new(h.client.clone());

    let err = resolver.resolve("u1", "u2", "L1").await.expect_err("failure");

    assert_eq!(err.context.as_deref(), Some("Opening conversation"));
    let errors: Vec<_> = h
        .notifier
        .snapshot()
        .into_iter()
        .filter(|n| n.kind == NoticeKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn send_message_requires_a_body_locally() {
    let h = harness();

    let err = h
        .client
        .send_message("c1", "   ")
        .await
        .expect_err("rejected");

    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(err.class(), FailureClass::User);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn send_message_attaches_a_client_transaction_id() {
    let h = harness();
    h.transport.push_response(
        200,
        ok_envelope(json!({
            "id": "m1",
            "conversationId": "c1",
            "senderId": "u1",
            "body": "hi there",
            "sentAt": "2026-08-05T12:00:00Z",
        })),
    );

    let message = h.client.send_message("c1", "hi there").await.expect("sent");

    assert_eq!(message.id, "m1");
    assert_eq!(message.conversation_id, "c1");

    let requests = h.transport.requests();
    let body = requests[0].body.as_ref().expect("request body");
    assert!(
        body["clientTxnId"]
            .as_str()
            .is_some_and(|id| !id.is_empty())
    );
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn fetch_favorites_shows_and_dismisses_a_loading_notice() {
    let h = harness();
    h.transport.push_response(200, ok_envelope(json!([])));

    h.client.fetch_favorites().await.expect("favorites");

    let notices = h.notifier.snapshot();
    assert_eq!(notices[0].kind, NoticeKind::Info);
    assert_eq!(notices[0].message, "Loading favorites...");
    assert_eq!(h.notifier.dismissed().len(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn seller_reviews_are_batch_tolerant() {
    let h = harness();
    h.transport.push_response(
        200,
        ok_envelope(json!([
            { "id": "r1", "sellerId": "s1", "authorId": "u1", "rating": 4 },
            { "id": "r2", "sellerId": "s1", "authorId": "u2", "rating": 11 },
        ])),
    );

    let page = h.client.get_seller_reviews("s1").await.expect("reviews");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.skipped, 1);
    assert_eq!(page.items[0].rating, 4);
}
