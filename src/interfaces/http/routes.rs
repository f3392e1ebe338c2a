use crate::application::reconciler::{PaymentReconciler, PurchaseIntent};
use crate::domain::contact::PaymentWithContact;
use crate::error::PaymentError;
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<PaymentReconciler>,
}

impl AppState {
    pub fn new(reconciler: PaymentReconciler) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
        }
    }
}

/// JSON error envelope; 400 carries the validation message, 500 a fixed one.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(&'static str),
}

impl ApiError {
    fn from_payment(err: PaymentError, failure: &'static str) -> Self {
        match err {
            PaymentError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            other => {
                error!(error = %other, "{}", failure);
                ApiError::Internal(failure)
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPaymentParams {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub product_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckPaymentResponse {
    pub success: bool,
    pub payment: Option<PaymentWithContact>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub removed_count: usize,
    pub removed_payments: Vec<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub product_type: Option<String>,
    pub product_title: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub payment: PaymentWithContact,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub existing: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/payment/check", get(check_payment))
        .route("/payment/create", post(create_payment))
        .route("/admin/cleanup-duplicates", post(cleanup_duplicates))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn check_payment(
    State(state): State<AppState>,
    params: Result<Query<CheckPaymentParams>, QueryRejection>,
) -> Result<Json<CheckPaymentResponse>, ApiError> {
    let Query(params) = params?;
    let payment = state
        .reconciler
        .find_active_pending(
            params.user_id.as_deref(),
            params.product_id.as_deref(),
            params.product_type.as_deref(),
        )
        .await
        .map_err(|e| ApiError::from_payment(e, "Failed to check payment status"))?;

    Ok(Json(CheckPaymentResponse {
        success: true,
        payment,
    }))
}

async fn cleanup_duplicates(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let report = state
        .reconciler
        .reconcile_duplicates()
        .await
        .map_err(|e| ApiError::from_payment(e, "Failed to cleanup duplicates"))?;

    let removed_count = report.removed_count();
    Ok(Json(CleanupResponse {
        success: true,
        removed_count,
        removed_payments: report.removed,
        message: format!("Removed {removed_count} duplicate pending payments"),
    }))
}

async fn create_payment(
    State(state): State<AppState>,
    body: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePaymentResponse>), ApiError> {
    let Json(body) = body?;
    let intent = PurchaseIntent {
        user_id: body.user_id,
        product_id: body.product_id,
        product_type: body.product_type,
        product_title: body.product_title,
        amount: body.amount,
        currency: body.currency,
    };
    let outcome = state
        .reconciler
        .create_pending(intent)
        .await
        .map_err(|e| ApiError::from_payment(e, "Failed to create payment"))?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(CreatePaymentResponse {
            success: true,
            payment: outcome.payment,
            existing: !outcome.created,
        }),
    ))
}
