use crate::auth::AdminUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use model::entities::{payment, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request structure for recording a membership-fee payment
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// The member the payment belongs to
    pub user_id: i32,
    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,
    /// Date the fee was paid; defaults to today
    pub paid_on: Option<NaiveDate>,
    /// External payment-gateway transaction reference, if paid online
    pub transaction_ref: Option<String>,
    pub note: Option<String>,
}

/// Payment response model
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub user_id: i32,
    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub transaction_ref: Option<String>,
    pub note: Option<String>,
}

impl From<payment::Model> for PaymentResponse {
    fn from(model: payment::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            amount: model.amount,
            paid_on: model.paid_on,
            transaction_ref: model.transaction_ref,
            note: model.note,
        }
    }
}

/// Record a membership-fee payment
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded successfully", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Member does not exist", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn create_payment(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Recording payment for user {}", request.user_id);

    // Validate the member exists before recording against them
    match user::Entity::find_by_id(request.user_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Payment refers to unknown user {}", request.user_id);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("User with ID {} not found", request.user_id),
                    code: "USER_NOT_FOUND".to_string(),
                    success: false,
                }),
            ));
        }
        Err(db_error) => {
            error!("Failed to validate user {}: {}", request.user_id, db_error);
            return Err(internal_error());
        }
    }

    let new_payment = payment::ActiveModel {
        user_id: Set(request.user_id),
        amount: Set(request.amount),
        paid_on: Set(request.paid_on.unwrap_or_else(|| Utc::now().date_naive())),
        transaction_ref: Set(request.transaction_ref),
        note: Set(request.note),
        ..Default::default()
    };

    match new_payment.insert(&state.db).await {
        Ok(model) => {
            info!(
                "Payment {} of {} recorded for user {}",
                model.id, model.amount, model.user_id
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: PaymentResponse::from(model),
                    message: "Payment recorded successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to record payment: {}", db_error);
            Err(internal_error())
        }
    }
}

/// Get all payments, newest first
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "payments",
    responses(
        (status = 200, description = "Payments retrieved successfully", body = ApiResponse<Vec<PaymentResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn get_payments(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PaymentResponse>>>, StatusCode> {
    debug!("Fetching all payments");

    match payment::Entity::find()
        .order_by_desc(payment::Column::PaidOn)
        .all(&state.db)
        .await
    {
        Ok(payments) => {
            let responses: Vec<PaymentResponse> =
                payments.into_iter().map(PaymentResponse::from).collect();
            info!("Retrieved {} payments", responses.len());
            Ok(Json(ApiResponse {
                data: responses,
                message: "Payments retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve payments: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get the payment history of one member
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/payments",
    tag = "payments",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Payments retrieved successfully", body = ApiResponse<Vec<PaymentResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn get_user_payments(
    _admin: AdminUser,
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PaymentResponse>>>, StatusCode> {
    debug!("Fetching payments for user {}", user_id);

    match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("User with ID {} not found", user_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup user {}: {}", user_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match payment::Entity::find()
        .filter(payment::Column::UserId.eq(user_id))
        .order_by_desc(payment::Column::PaidOn)
        .all(&state.db)
        .await
    {
        Ok(payments) => {
            let responses: Vec<PaymentResponse> =
                payments.into_iter().map(PaymentResponse::from).collect();
            info!("Retrieved {} payments for user {}", responses.len(), user_id);
            Ok(Json(ApiResponse {
                data: responses,
                message: "Payments retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve payments for user {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}
