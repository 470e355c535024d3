//! HTTP contract tests, driven through the router with `tower::ServiceExt`
//! against the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use orderdesk_core::{Agent, CustomerView, OrderView, Payment};
use orderdesk_gateway::{AppState, router};
use orderdesk_service::OrderDesk;
use orderdesk_store::InMemoryStore;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(OrderDesk::new(Arc::new(InMemoryStore::new()))))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

async fn body_as<T: serde::de::DeserializeOwned>(response: Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

async fn post_agent(app: &Router) -> Agent {
    let response = send(
        app,
        Method::POST,
        "/agents/agent",
        Some(json!({ "name": "Ramasundar", "working_area": "Bangalore", "commission": "0.15" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let header_location = location(&response);
    let agent: Agent = body_as(response).await;
    assert_eq!(header_location, format!("/agents/agent/{}", agent.id));
    agent
}

async fn post_payment(app: &Router, payment_type: &str) -> Payment {
    let response = send(
        app,
        Method::POST,
        "/payments/payment",
        Some(json!({ "payment_type": payment_type })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_as(response).await
}

fn customer_body(agent_id: u64, payment_id: u64) -> Value {
    json!({
        "name": "Micheal",
        "city": "New York",
        "opening_amount": 3000,
        "outstanding_amount": 6000,
        "payment_amount": 5000,
        "receive_amount": 2000,
        "agent": { "id": agent_id },
        "orders": [
            {
                "amount": 2000,
                "advance_amount": 600,
                "description": "SOD",
                "payments": [{ "id": payment_id }]
            }
        ]
    })
}

async fn post_customer(app: &Router, agent: &Agent, payment: &Payment) -> CustomerView {
    let response = send(
        app,
        Method::POST,
        "/customers/customer",
        Some(customer_body(agent.id, payment.id)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let header_location = location(&response);
    let view: CustomerView = body_as(response).await;
    assert_eq!(header_location, format!("/customers/customer/{}", view.id));
    view
}

#[tokio::test]
async fn health_check_answers_ok() {
    let response = send(&app(), Method::GET, "/healthz", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn created_customer_is_readable() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;

    let created = post_customer(&app, &agent, &cash).await;
    let response = send(
        &app,
        Method::GET,
        &format!("/customers/customer/{}", created.id),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let fetched: CustomerView = body_as(response).await;
    assert_eq!(fetched, created);
    assert_eq!(fetched.agent, agent);
    assert_eq!(fetched.orders[0].payments, vec![cash]);
}

#[tokio::test]
async fn post_ignores_a_client_supplied_id() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let mut body = customer_body(agent.id, cash.id);
    body["id"] = json!(500);

    let response = send(&app, Method::POST, "/customers/customer", Some(body)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let view: CustomerView = body_as(response).await;
    assert_ne!(view.id, 500);
}

#[tokio::test]
async fn patch_distinguishes_zero_from_absent() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let created = post_customer(&app, &agent, &cash).await;
    let uri = format!("/customers/customer/{}", created.id);

    let response = send(&app, Method::PATCH, &uri, Some(json!({ "payment_amount": 0 }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched: CustomerView = body_as(response).await;
    assert_eq!(patched.payment_amount, Decimal::ZERO);
    assert_eq!(patched.opening_amount, Decimal::new(3000, 0));

    let response = send(&app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let untouched: CustomerView = body_as(response).await;
    assert_eq!(untouched, patched);
}

#[tokio::test]
async fn put_replaces_customer_and_drops_unlisted_orders() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let created = post_customer(&app, &agent, &cash).await;
    let dropped_order = created.orders[0].id;

    let response = send(
        &app,
        Method::PUT,
        &format!("/customers/customer/{}", created.id),
        Some(json!({ "name": "Micheal Jr", "agent": { "id": agent.id } })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let replaced: CustomerView = body_as(response).await;
    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.city, None);
    assert_eq!(replaced.opening_amount, Decimal::ZERO);
    assert!(replaced.orders.is_empty());

    let response = send(
        &app,
        Method::GET,
        &format!("/orders/order/{dropped_order}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_agent_is_not_found() {
    let app = app();

    let response = send(
        &app,
        Method::POST,
        "/customers/customer",
        Some(json!({ "name": "Holmes", "agent": { "id": 99 } })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "agent 99 not found");

    let response = send(&app, Method::GET, "/customers/orders", None).await;
    let customers: Vec<CustomerView> = body_as(response).await;
    assert!(customers.is_empty());
}

#[tokio::test]
async fn blank_name_is_a_bad_request() {
    let app = app();
    let agent = post_agent(&app).await;

    let response = send(
        &app,
        Method::POST,
        "/customers/customer",
        Some(json!({ "name": "", "agent": { "id": agent.id } })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "customer name is required");
}

#[tokio::test]
async fn order_creation_returns_location_without_body() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let customer = post_customer(&app, &agent, &cash).await;

    let response = send(
        &app,
        Method::POST,
        "/orders/order",
        Some(json!({
            "amount": 1000,
            "advance_amount": 0,
            "description": "SOD",
            "customer": { "id": customer.id },
            "payments": [{ "id": cash.id }]
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let order_location = location(&response);
    assert!(order_location.starts_with("/orders/order/"));
    assert!(body_bytes(response).await.is_empty());

    let response = send(&app, Method::GET, &order_location, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let order: OrderView = body_as(response).await;
    assert_eq!(order.customer.id, customer.id);
    assert_eq!(order.payments, vec![cash]);
}

#[tokio::test]
async fn order_with_unknown_payment_is_rejected() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let customer = post_customer(&app, &agent, &cash).await;

    let response = send(
        &app,
        Method::POST,
        "/orders/order",
        Some(json!({
            "amount": 1000,
            "customer": { "id": customer.id },
            "payments": [{ "id": cash.id }, { "id": 4242 }]
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "payment 4242 not found");

    let response = send(
        &app,
        Method::GET,
        &format!("/customers/customer/{}", customer.id),
        None,
    )
    .await;
    let view: CustomerView = body_as(response).await;
    assert_eq!(view.orders.len(), 1);
}

#[tokio::test]
async fn order_put_and_delete() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let customer = post_customer(&app, &agent, &cash).await;
    let order_id = customer.orders[0].id;
    let uri = format!("/orders/order/{order_id}");

    let response = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "amount": 4000, "advance_amount": 0, "customer": { "id": customer.id } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());

    let response = send(&app, Method::GET, "/orders/advanceamount", None).await;
    let advanced: Vec<OrderView> = body_as(response).await;
    assert!(advanced.is_empty());

    let response = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        Method::GET,
        &format!("/payments/payment/{}", cash.id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn put_order_with_unknown_id_is_not_found() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let customer = post_customer(&app, &agent, &cash).await;

    let response = send(
        &app,
        Method::PUT,
        "/orders/order/777",
        Some(json!({ "amount": 1, "customer": { "id": customer.id } })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "order 777 not found");
}

#[tokio::test]
async fn agent_deletion_is_guarded_by_customers() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let customer = post_customer(&app, &agent, &cash).await;
    let agent_uri = format!("/agents/unassigned/{}", agent.id);

    let response = send(&app, Method::DELETE, &agent_uri, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_text(response).await,
        format!(
            "agent {} is already referenced by customer {}",
            agent.id, customer.id
        )
    );

    let response = send(
        &app,
        Method::DELETE,
        &format!("/customers/customer/{}", customer.id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, Method::DELETE, &agent_uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::GET,
        &format!("/agents/agent/{}", agent.id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_delete_cascades_orders_but_keeps_payments() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let customer = post_customer(&app, &agent, &cash).await;

    let response = send(
        &app,
        Method::DELETE,
        &format!("/customers/customer/{}", customer.id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::GET,
        &format!("/orders/order/{}", customer.orders[0].id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        Method::GET,
        &format!("/payments/payment/{}", cash.id),
        None,
    )
    .await;
    let payment: Payment = body_as(response).await;
    assert_eq!(payment, cash);
}

#[tokio::test]
async fn lookups_by_name_and_advance() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let customer = post_customer(&app, &agent, &cash).await;

    let response = send(&app, Method::GET, "/customers/namelike/CHEA", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let found: Vec<CustomerView> = body_as(response).await;
    assert_eq!(found, vec![customer.clone()]);

    let response = send(&app, Method::GET, "/customers/namelike/zzz", None).await;
    let found: Vec<CustomerView> = body_as(response).await;
    assert!(found.is_empty());

    let response = send(&app, Method::GET, "/orders/advanceamount", None).await;
    let advanced: Vec<OrderView> = body_as(response).await;
    assert_eq!(advanced, customer.orders);
}

#[tokio::test]
async fn mistyped_bodies_are_bad_requests() {
    let app = app();
    let agent = post_agent(&app).await;
    let cash = post_payment(&app, "Cash").await;
    let created = post_customer(&app, &agent, &cash).await;
    let uri = format!("/customers/customer/{}", created.id);

    let response = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "payment_amount": "abc" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!body_text(response).await.is_empty());

    let response = send(
        &app,
        Method::POST,
        "/customers/customer",
        Some(json!({ "name": "Holmes", "agent": 5 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, Method::GET, &uri, None).await;
    let unchanged: CustomerView = body_as(response).await;
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
    let response = send(&app(), Method::GET, "/customers/customer/abc", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
