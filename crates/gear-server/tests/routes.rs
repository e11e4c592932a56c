//! Route tests driving the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use gear_core::enums::InvoiceStatus;
use gear_db::repos::billing::NewInvoice;
use gear_db::repos::calendar::NewCalendarFeed;
use gear_db::repos::marketing::{NewBlogPost, NewTestimonial};
use gear_db::repos::notification::NewNotification;
use gear_db::repos::staff::NewStaffUser;
use gear_db::repos::student::NewStudent;
use gear_db::service::{GearService, ServiceSettings};
use gear_server::stripe::WebhookVerifier;
use gear_server::{AppState, router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "whsec_routes";

async fn test_state() -> AppState {
    let service = GearService::new_local(":memory:", None, ServiceSettings::default())
        .await
        .unwrap();
    AppState::new(Arc::new(service), WebhookVerifier::new(SECRET, 300))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn staff_request(method: &str, uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Staff-User", user)
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Intake forms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lead_form_creates_lead() {
    let state = test_state().await;
    let (status, body) = send(
        router(state.clone()),
        post_json(
            "/crm/lead",
            &json!({"name": "Jo Driver", "email": "jo@example.com", "message": "G2 prep?"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let lead = json_of(&body);
    assert_eq!(lead["first_name"], "Jo");
    assert_eq!(lead["source"], "Website Contact Form");
    assert_eq!(state.service.list_leads(None, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_lead_form_is_422() {
    let state = test_state().await;
    let (status, body) = send(
        router(state),
        post_json("/crm/lead", &json!({"name": "Jo", "email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_of(&body)["detail"].as_str().unwrap().contains("not a valid email"));
}

#[tokio::test]
async fn blank_enrollment_request_gets_defaults() {
    let state = test_state().await;
    let (status, body) = send(router(state), post_json("/crm/enroll", &json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let request = json_of(&body);
    assert_eq!(request["name"], "Website Visitor");
    assert!(request["lead_id"].is_string());
}

#[tokio::test]
async fn lesson_request_is_created() {
    let state = test_state().await;
    let (status, _) = send(
        router(state),
        post_json(
            "/crm/lesson/request",
            &json!({"name": "Sam Lee", "email": "sam@example.com", "preferred_date": "2026-05-02"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notifications_require_staff_header() {
    let state = test_state().await;
    let request = Request::get("/crm/notifications/unread-count")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router(state), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_staff_is_forbidden() {
    let state = test_state().await;
    let (status, body) = send(
        router(state),
        staff_request("GET", "/crm/notifications/unread-count", "usr-nobody"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json_of(&body), json!({"detail": "forbidden"}));
}

#[tokio::test]
async fn inbox_flow() {
    let state = test_state().await;
    let alice = state
        .service
        .create_staff_user(NewStaffUser::staff("alice"))
        .await
        .unwrap();
    state
        .service
        .create_notification(NewNotification::for_staff("New lead", "Jo Driver"))
        .await
        .unwrap();
    state
        .service
        .create_notification(NewNotification::for_staff("Payment", "INV-1 paid"))
        .await
        .unwrap();

    let (status, body) = send(
        router(state.clone()),
        staff_request("GET", "/crm/notifications/unread-count", &alice.id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({"unread_count": 2}));

    let (_, body) = send(
        router(state.clone()),
        staff_request("GET", "/crm/notifications/list?limit=abc", &alice.id),
    )
    .await;
    let items = json_of(&body)["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 2);
    let receipt_id = items[0]["receipt_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        router(state.clone()),
        staff_request(
            "POST",
            &format!("/crm/notifications/{receipt_id}/mark-read"),
            &alice.id,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let marked = json_of(&body);
    assert_eq!(marked["ok"], true);
    assert!(marked["read_at"].is_string());

    let (_, body) = send(
        router(state.clone()),
        staff_request("POST", "/crm/notifications/mark-all-read", &alice.id),
    )
    .await;
    assert_eq!(json_of(&body), json!({"ok": true, "updated": 1}));

    let (status, _) = send(
        router(state),
        staff_request("POST", "/crm/notifications/rcp-missing/mark-read", &alice.id),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inbox_limit_is_clamped_not_ignored() {
    let state = test_state().await;
    let bea = state
        .service
        .create_staff_user(NewStaffUser::staff("bea"))
        .await
        .unwrap();
    for title in ["One", "Two", "Three"] {
        state
            .service
            .create_notification(NewNotification::for_staff(title, "body"))
            .await
            .unwrap();
    }

    let inbox_len = |uri: &'static str| {
        let state = state.clone();
        let user = bea.id.clone();
        async move {
            let (status, body) = send(router(state), staff_request("GET", uri, &user)).await;
            assert_eq!(status, StatusCode::OK);
            json_of(&body)["items"].as_array().unwrap().len()
        }
    };

    assert_eq!(inbox_len("/crm/notifications/list?limit=-5").await, 1);
    assert_eq!(inbox_len("/crm/notifications/list?limit=0").await, 1);
    assert_eq!(inbox_len("/crm/notifications/list?limit=2").await, 2);
    assert_eq!(
        inbox_len("/crm/notifications/list?limit=99999999999999999999").await,
        3
    );
    assert_eq!(inbox_len("/crm/notifications/list?limit=nope").await, 3);
}

// ---------------------------------------------------------------------------
// Calendar feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn calendar_feed_serves_ics() {
    let state = test_state().await;
    let student = state
        .service
        .create_student(NewStudent {
            first_name: "Ana".into(),
            last_name: "Tester".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let feed = state
        .service
        .create_calendar_feed(NewCalendarFeed::for_student(student.id))
        .await
        .unwrap();

    let response = router(state.clone())
        .oneshot(
            Request::get(format!("/crm/calendar/{}", feed.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/calendar; charset=utf-8"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8(body.to_vec()).unwrap().starts_with("BEGIN:VCALENDAR"));

    let (status, _) = send(
        router(state),
        Request::get("/crm/calendar/unknown").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Stripe webhook
// ---------------------------------------------------------------------------

fn signed(payload: &str, verifier: &WebhookVerifier) -> Request<Body> {
    let header = verifier
        .sign(payload.as_bytes(), Utc::now().timestamp())
        .unwrap();
    Request::post("/crm/stripe/webhook")
        .header("Stripe-Signature", header)
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn stripe_webhook_marks_invoice_paid() {
    let state = test_state().await;
    let student = state
        .service
        .create_student(NewStudent {
            first_name: "Ana".into(),
            last_name: "Tester".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let invoice = state
        .service
        .create_invoice(NewInvoice {
            student_id: student.id,
            total_cents: 129_900,
            status: Some(InvoiceStatus::Issued),
            ..Default::default()
        })
        .await
        .unwrap();

    let payload = json!({
        "type": "payment_intent.succeeded",
        "data": {"object": {"id": "pi_123", "metadata": {"invoice_id": invoice.id}}}
    })
    .to_string();
    let (status, body) = send(router(state.clone()), signed(&payload, &state.stripe)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({"status": "ok"}));

    let paid = state.service.get_invoice(&invoice.id).await.unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert_eq!(state.service.list_payments(&invoice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn stripe_webhook_rejects_bad_signature() {
    let state = test_state().await;
    let request = Request::post("/crm/stripe/webhook")
        .header("Stripe-Signature", "t=1,v1=00")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(router(state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_of(&body), json!({"status": "invalid"}));
}

#[tokio::test]
async fn stripe_webhook_rejects_non_event_body() {
    let state = test_state().await;
    let (status, _) = send(router(state.clone()), signed("[1, 2]", &state.stripe)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Marketing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn published_blog_and_testimonials() {
    let state = test_state().await;
    let post = state
        .service
        .create_blog_post(NewBlogPost {
            title: "Passing the G2".into(),
            body: "Mirror, signal, shoulder check.".into(),
            published: true,
            ..Default::default()
        })
        .await
        .unwrap();
    state
        .service
        .create_blog_post(NewBlogPost {
            title: "Draft".into(),
            body: "wip".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    state
        .service
        .create_testimonial(NewTestimonial {
            name: "Priya".into(),
            quote: "Passed first try.".into(),
            rating: 5,
            display_order: 1,
            published: true,
        })
        .await
        .unwrap();

    let (_, body) = send(
        router(state.clone()),
        Request::get("/blog").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(json_of(&body).as_array().unwrap().len(), 1);

    let (status, body) = send(
        router(state.clone()),
        Request::get(format!("/blog/{}", post.slug))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let detail = json_of(&body);
    assert_eq!(detail["post"]["title"], "Passing the G2");
    assert_eq!(detail["comments"], json!([]));

    let (status, body) = send(
        router(state.clone()),
        post_json(
            &format!("/blog/{}/comments", post.slug),
            &json!({"name": "Reader", "body": "Great tips"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json_of(&body)["approved"], false);

    let (status, _) = send(
        router(state.clone()),
        Request::get("/blog/draft").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(
        router(state),
        Request::get("/testimonials").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(json_of(&body)[0]["name"], "Priya");
}
