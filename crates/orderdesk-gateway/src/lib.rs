//! HTTP surface of the order desk.
//!
//! Routes follow the `/customers`, `/orders`, `/agents` and `/payments`
//! layout. Creation answers `201 Created` with a `Location` header that
//! points at the new record; deletion answers `204 No Content`.

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, Uri, header::LOCATION},
    routing::{delete, get, post},
};
use orderdesk_core::{
    Agent, AgentInput, CustomerInput, CustomerView, DeskError, OrderInput, OrderView, Payment,
    PaymentInput, RecordId,
};
use orderdesk_service::OrderDesk;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    desk: OrderDesk,
}

impl AppState {
    pub fn new(desk: OrderDesk) -> Self {
        Self { desk }
    }
}

type ApiError = (StatusCode, String);

type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/customers/orders", get(list_customers))
        .route("/customers/namelike/{custname}", get(find_customers_named_like))
        .route("/customers/customer", post(create_customer))
        .route(
            "/customers/customer/{custid}",
            get(get_customer)
                .put(replace_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
        .route("/orders/advanceamount", get(orders_with_advance))
        .route("/orders/order", post(create_order))
        .route(
            "/orders/order/{ordernum}",
            get(get_order).put(replace_order).delete(delete_order),
        )
        .route("/agents/agent", post(create_agent))
        .route("/agents/agent/{agentid}", get(get_agent))
        .route(
            "/agents/unassigned/{agentid}",
            delete(delete_agent_if_unassigned),
        )
        .route("/payments/payment", post(create_payment))
        .route("/payments/payment/{paymentid}", get(get_payment))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerView>>, ApiError> {
    let customers = state.desk.list_customers().await.map_err(desk_error)?;
    Ok(Json(customers))
}

async fn find_customers_named_like(
    State(state): State<AppState>,
    Path(custname): Path<String>,
) -> Result<Json<Vec<CustomerView>>, ApiError> {
    let customers = state
        .desk
        .find_customers_named_like(&custname)
        .await
        .map_err(desk_error)?;
    Ok(Json(customers))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(custid): Path<RecordId>,
) -> Result<Json<CustomerView>, ApiError> {
    let customer = state.desk.get_customer(custid).await.map_err(desk_error)?;
    Ok(Json(customer))
}

async fn create_customer(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Created<CustomerView>, ApiError> {
    let mut payload = json_body(payload)?;
    payload.id = 0;
    let customer = state
        .desk
        .create_or_replace_customer(payload)
        .await
        .map_err(desk_error)?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location(&uri, customer.id))],
        Json(customer),
    ))
}

async fn replace_customer(
    State(state): State<AppState>,
    Path(custid): Path<RecordId>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<CustomerView>, ApiError> {
    let mut payload = json_body(payload)?;
    payload.id = custid;
    let customer = state
        .desk
        .create_or_replace_customer(payload)
        .await
        .map_err(desk_error)?;
    Ok(Json(customer))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(custid): Path<RecordId>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<CustomerView>, ApiError> {
    let patch = json_body(payload)?;
    let customer = state
        .desk
        .update_customer(custid, patch)
        .await
        .map_err(desk_error)?;
    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(custid): Path<RecordId>,
) -> Result<StatusCode, ApiError> {
    state.desk.delete_customer(custid).await.map_err(desk_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn orders_with_advance(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let orders = state.desk.orders_with_advance().await.map_err(desk_error)?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<AppState>,
    Path(ordernum): Path<RecordId>,
) -> Result<Json<OrderView>, ApiError> {
    let order = state.desk.get_order(ordernum).await.map_err(desk_error)?;
    Ok(Json(order))
}

/// Answers with the `Location` of the new order and no body.
async fn create_order(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<OrderInput>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1]), ApiError> {
    let mut payload = json_body(payload)?;
    payload.id = 0;
    let order = state
        .desk
        .create_or_replace_order(payload)
        .await
        .map_err(desk_error)?;

    Ok((StatusCode::CREATED, [(LOCATION, location(&uri, order.id))]))
}

async fn replace_order(
    State(state): State<AppState>,
    Path(ordernum): Path<RecordId>,
    payload: Result<Json<OrderInput>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let mut payload = json_body(payload)?;
    payload.id = ordernum;
    state
        .desk
        .create_or_replace_order(payload)
        .await
        .map_err(desk_error)?;
    Ok(StatusCode::OK)
}

async fn delete_order(
    State(state): State<AppState>,
    Path(ordernum): Path<RecordId>,
) -> Result<StatusCode, ApiError> {
    state.desk.delete_order(ordernum).await.map_err(desk_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_agent(
    State(state): State<AppState>,
    Path(agentid): Path<RecordId>,
) -> Result<Json<Agent>, ApiError> {
    let agent = state.desk.get_agent(agentid).await.map_err(desk_error)?;
    Ok(Json(agent))
}

async fn create_agent(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<AgentInput>, JsonRejection>,
) -> Result<Created<Agent>, ApiError> {
    let agent = state
        .desk
        .create_agent(json_body(payload)?)
        .await
        .map_err(desk_error)?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location(&uri, agent.id))],
        Json(agent),
    ))
}

async fn delete_agent_if_unassigned(
    State(state): State<AppState>,
    Path(agentid): Path<RecordId>,
) -> Result<StatusCode, ApiError> {
    state
        .desk
        .delete_agent_if_unassigned(agentid)
        .await
        .map_err(desk_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_payment(
    State(state): State<AppState>,
    Path(paymentid): Path<RecordId>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state.desk.get_payment(paymentid).await.map_err(desk_error)?;
    Ok(Json(payment))
}

async fn create_payment(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<PaymentInput>, JsonRejection>,
) -> Result<Created<Payment>, ApiError> {
    let payment = state
        .desk
        .create_payment(json_body(payload)?)
        .await
        .map_err(desk_error)?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location(&uri, payment.id))],
        Json(payment),
    ))
}

fn location(uri: &Uri, id: RecordId) -> String {
    format!("{}/{}", uri.path().trim_end_matches('/'), id)
}

/// Body rejections answer 400, the same as any other validation failure.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| (StatusCode::BAD_REQUEST, rejection.body_text()))
}

fn desk_error(err: DeskError) -> ApiError {
    let status = match &err {
        DeskError::NotFound { .. } => StatusCode::NOT_FOUND,
        DeskError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        DeskError::AlreadyReferenced { .. } => StatusCode::CONFLICT,
        DeskError::Storage(cause) => {
            error!(error = %cause, "record store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}
