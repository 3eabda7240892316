//! End-to-end tests of the HTTP surface over the in-memory store.

#![allow(clippy::panic, missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use ticket_gateway::app_state::AppState;
use ticket_gateway::build_app;
use ticket_gateway::config::GatewayConfig;
use ticket_gateway::persistence::{InboxStore, MemoryStore, TicketStore};

const ADMIN_TOKEN: &str = "admin-secret";

fn app() -> Router {
    let config = GatewayConfig {
        admin_api_token: Some(ADMIN_TOKEN.to_string()),
        public_base_url: "https://tickets.example".to_string(),
        ..GatewayConfig::default()
    };
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        &config,
        Arc::clone(&store) as Arc<dyn TicketStore>,
        store as Arc<dyn InboxStore>,
    );
    build_app(state, Duration::from_secs(5))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router failed");
    };
    let status = response.status();
    let Ok(bytes) = to_bytes(response.into_body(), 1 << 20).await else {
        panic!("body read failed");
    };
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    let Ok(request) = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
    else {
        panic!("bad request");
    };
    request
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let Ok(request) = builder.body(Body::empty()) else {
        panic!("bad request");
    };
    request
}

async fn create_listing(app: &Router, quantity: u32, price: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/private-events",
            &json!({
                "name": "Garden Party",
                "date": "2026-07-04",
                "start_time": "18:00:00",
                "end_time": "23:00:00",
                "city": "Lisbon",
                "is_paid": true,
                "unit_price": price,
                "quantity": quantity,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let Some(id) = body["event_id"].as_str() else {
        panic!("no event_id in {body}");
    };
    id.to_string()
}

fn purchase_body(event_id: &str, quantity: u32) -> Value {
    json!({
        "eventId": event_id,
        "quantity": quantity,
        "buyerInfo": {"name": "Ana", "email": "ana@example.com", "phone": "+351900000000"},
    })
}

async fn purchase(app: &Router, event_id: &str, quantity: u32) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/api/private-event-purchase",
            &purchase_body(event_id, quantity),
        ),
    )
    .await
}

#[tokio::test]
async fn last_tickets_sell_and_next_request_reports_zero_left() {
    let app = app();
    let event_id = create_listing(&app, 5, "25.00").await;

    let (status, _) = purchase(&app, &event_id, 3).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = purchase(&app, &event_id, 2).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["ticketsRemaining"], 0);
    assert!(body["ticketCode"].as_str().is_some_and(|c| c.len() == 10));
    let Some(redirect) = body["redirectUrl"].as_str() else {
        panic!("no redirectUrl");
    };
    assert!(redirect.starts_with("https://tickets.example/ticket-confirmation?ticketId="));

    let (status, body) = purchase(&app, &event_id, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Only 0 tickets available");
    assert_eq!(body["error"], "INSUFFICIENT_TICKETS");

    let (_, listing) = send(&app, get(&format!("/api/v1/private-events/{event_id}"), None)).await;
    assert_eq!(listing["quantity_sold"], 5);
    assert_eq!(listing["sold_out"], true);

    let (_, tickets) = send(
        &app,
        get(
            &format!("/api/v1/admin/private-events/{event_id}/tickets"),
            Some(ADMIN_TOKEN),
        ),
    )
    .await;
    assert_eq!(tickets["pagination"]["total"], 2);
}

#[tokio::test]
async fn ledger_records_net_price_and_ticket_page_hides_contact() {
    let app = app();
    let event_id = create_listing(&app, 10, "40.00").await;

    let (_, body) = purchase(&app, &event_id, 2).await;
    let Some(ticket_id) = body["ticketId"].as_str() else {
        panic!("no ticketId");
    };

    let (_, admin) = send(
        &app,
        get(
            &format!("/api/v1/admin/private-events/{event_id}/tickets"),
            Some(ADMIN_TOKEN),
        ),
    )
    .await;
    assert_eq!(admin["data"][0]["price_paid"], "36");
    assert_eq!(admin["data"][0]["total_price"], "80");

    let (status, public) = send(&app, get(&format!("/api/v1/tickets/{ticket_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["buyer_name"], "Ana");
    assert!(public.get("buyer_email").is_none());
}

#[tokio::test]
async fn idempotency_key_header_replays_original_ticket() {
    let app = app();
    let event_id = create_listing(&app, 4, "10.00").await;

    let request = || {
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/api/private-event-purchase")
            .header(header::CONTENT_TYPE, "application/json")
            .header("Idempotency-Key", "checkout-7f3a9c21-retry")
            .body(Body::from(purchase_body(&event_id, 2).to_string()))
        else {
            panic!("bad request");
        };
        request
    };

    let (status, first) = send(&app, request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["replayed"], false);

    let (status, second) = send(&app, request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["replayed"], true);
    assert_eq!(first["ticketId"], second["ticketId"]);
    assert_eq!(first["ticketCode"], second["ticketCode"]);
    assert_eq!(second["ticketsRemaining"], 2);
}

#[tokio::test]
async fn concurrent_buyers_never_oversell() {
    let app = app();
    let event_id = create_listing(&app, 10, "5.00").await;

    let mut handles = Vec::new();
    for _ in 0..30 {
        let app = app.clone();
        let event_id = event_id.clone();
        handles.push(tokio::spawn(async move {
            purchase(&app, &event_id, 1).await.0
        }));
    }

    let mut ok = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await {
            Ok(StatusCode::OK) => ok += 1,
            Ok(StatusCode::BAD_REQUEST) => rejected += 1,
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(ok, 10);
    assert_eq!(rejected, 20);

    let (_, listing) = send(&app, get(&format!("/api/v1/private-events/{event_id}"), None)).await;
    assert_eq!(listing["quantity_sold"], 10);
}

#[tokio::test]
async fn invalid_purchases_are_rejected_with_json_errors() {
    let app = app();
    let event_id = create_listing(&app, 3, "10.00").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/private-event-purchase",
            &json!({"eventId": event_id, "quantity": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "buyerInfo is required");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/private-event-purchase",
            &json!({
                "eventId": event_id,
                "quantity": 1,
                "buyerInfo": {"name": "Ana", "email": "ana@example.com"},
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "buyerInfo.phone is required");

    let (status, body) = purchase(&app, &uuid::Uuid::new_v4().to_string(), 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "EVENT_NOT_FOUND");

    let Ok(malformed) = Request::builder()
        .method("POST")
        .uri("/api/private-event-purchase")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
    else {
        panic!("bad request");
    };
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn share_link_resolves_listing() {
    let app = app();
    let event_id = create_listing(&app, 3, "10.00").await;

    let (_, listing) = send(&app, get(&format!("/api/v1/private-events/{event_id}"), None)).await;
    let Some(token) = listing["share_token"].as_str() else {
        panic!("no share token");
    };
    let (status, shared) = send(&app, get(&format!("/api/v1/share/{token}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["event_id"], event_id.as_str());

    let (status, _) = send(&app, get("/api/v1/share/unknown-token", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_bearer_token() {
    let app = app();

    let (status, body) = send(&app, get("/api/v1/admin/contact-messages", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = send(&app, get("/api/v1/admin/contact-messages", Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        get("/api/v1/admin/contact-messages", Some(ADMIN_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn contact_message_triage_flow() {
    let app = app();

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/contact-messages",
            &json!({
                "name": "Rui",
                "email": "rui@example.com",
                "subject": "Refund",
                "message": "Can I get a refund?",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "unread");
    let Some(id) = created["id"].as_str() else {
        panic!("no id");
    };

    let patch = |status: &str| {
        let Ok(request) = Request::builder()
            .method("PATCH")
            .uri(format!("/api/v1/admin/contact-messages/{id}"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
            .body(Body::from(json!({ "status": status }).to_string()))
        else {
            panic!("bad request");
        };
        request
    };

    let (status, body) = send(&app, patch("archived")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_STATUS");

    let (status, body) = send(&app, patch("resolved")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "resolved");

    let (_, page) = send(
        &app,
        get(
            "/api/v1/admin/contact-messages?status=resolved&per_page=500",
            Some(ADMIN_TOKEN),
        ),
    )
    .await;
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["pagination"]["per_page"], 100);
    assert_eq!(page["data"][0]["id"], id);
}

#[tokio::test]
async fn partner_requests_start_pending() {
    let app = app();
    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/partner-requests",
            &json!({
                "name": "Marta",
                "email": "marta@venue.example",
                "company": "Venue Co",
                "message": "We host 300-seat events",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["subject"], "Venue Co");
}

#[tokio::test]
async fn health_reports_backend() {
    let app = app();
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["fee_rate"], "0.10");
}

#[tokio::test]
async fn listing_prices_beyond_cents_or_cap_are_rejected() {
    let app = app();
    for price in ["19.9999", "10000000000"] {
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/private-events",
                &json!({
                    "name": "Garden Party",
                    "date": "2026-07-04",
                    "is_paid": true,
                    "unit_price": price,
                    "quantity": 5,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{price}: {body}");
        assert_eq!(body["error"], "INVALID_REQUEST");
    }
}
