//! Order placement and payment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use document_store::DocumentStore;
use domain::{Order, Payment};
use serde::Deserialize;
use workflows::{PaymentIntent, PlaceOrder, RecordPayment};

use super::ActingUser;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in major currency units, e.g. `19.99`.
    pub amount: f64,
}

/// POST /orders: place an order and take its items out of stock.
#[tracing::instrument(skip(state, input), fields(user_id = %user.0))]
pub async fn place<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: ActingUser,
    Json(input): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.workflows.place_order(user.0, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /payments: record a successful payment and complete its order.
#[tracing::instrument(skip(state, input), fields(user_id = %user.0))]
pub async fn record_payment<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    user: ActingUser,
    Json(input): Json<RecordPayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = state.workflows.record_payment(user.0, input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST /payments/intent: create a payment intent with the gateway.
#[tracing::instrument(skip(state, req))]
pub async fn payment_intent<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: ActingUser,
    Json(req): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntent>, ApiError> {
    let intent = state.workflows.create_payment_intent(req.amount).await?;
    Ok(Json(intent))
}
