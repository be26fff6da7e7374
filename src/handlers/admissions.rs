use crate::auth::AdminUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
// Leading `::` keeps the service crate distinct from the entity module
// imported below, which shares its name.
use ::admission::AdmissionError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use common::ProvisionedCredentials;
use model::entities::admission::{self, AdmissionStatus, BloodGroup, Gender};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body submitted through the public admission form
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SubmitAdmissionRequest {
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub blood_group: Option<BloodGroup>,
    pub email: String,
    pub phone: String,
    pub image_url: Option<String>,
    /// Admission-fee payment reference, if paid online
    pub transaction_ref: Option<String>,
}

/// Admission response model
#[derive(Debug, Serialize, ToSchema)]
pub struct AdmissionResponse {
    pub id: i32,
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub blood_group: Option<BloodGroup>,
    pub email: String,
    pub phone: String,
    pub image_url: Option<String>,
    pub transaction_ref: Option<String>,
    pub status: AdmissionStatus,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<admission::Model> for AdmissionResponse {
    fn from(model: admission::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            father_name: model.father_name,
            mother_name: model.mother_name,
            date_of_birth: model.date_of_birth,
            gender: model.gender,
            blood_group: model.blood_group,
            email: model.email,
            phone: model.phone,
            image_url: model.image_url,
            transaction_ref: model.transaction_ref,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

/// Query parameters for listing admissions
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdmissionListQuery {
    /// Restrict the list to one workflow status
    pub status: Option<AdmissionStatus>,
}

/// Submit a membership application (public)
#[utoipa::path(
    post,
    path = "/api/v1/admissions",
    tag = "admissions",
    request_body = SubmitAdmissionRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<AdmissionResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn submit_admission(
    State(state): State<AppState>,
    Json(request): Json<SubmitAdmissionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AdmissionResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("New admission application from: {}", request.email);

    let new_admission = admission::ActiveModel {
        name: Set(request.name),
        father_name: Set(request.father_name),
        mother_name: Set(request.mother_name),
        date_of_birth: Set(request.date_of_birth),
        gender: Set(request.gender),
        blood_group: Set(request.blood_group),
        email: Set(request.email),
        phone: Set(request.phone),
        image_url: Set(request.image_url),
        transaction_ref: Set(request.transaction_ref),
        status: Set(AdmissionStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_admission.insert(&state.db).await {
        Ok(model) => {
            info!("Admission application {} submitted", model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: AdmissionResponse::from(model),
                    message: "Application submitted successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to store admission application: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to submit application".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// List admissions, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/v1/admissions",
    tag = "admissions",
    params(
        ("status" = Option<AdmissionStatus>, Query, description = "Filter by workflow status"),
    ),
    responses(
        (status = 200, description = "Admissions retrieved", body = ApiResponse<Vec<AdmissionResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn list_admissions(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<AdmissionListQuery>,
) -> Result<Json<ApiResponse<Vec<AdmissionResponse>>>, StatusCode> {
    debug!("Listing admissions with filter: {:?}", query.status);

    let mut find = admission::Entity::find().order_by_desc(admission::Column::CreatedAt);
    if let Some(status) = query.status {
        find = find.filter(admission::Column::Status.eq(status));
    }

    match find.all(&state.db).await {
        Ok(admissions) => {
            let count = admissions.len();
            let responses: Vec<AdmissionResponse> = admissions
                .into_iter()
                .map(AdmissionResponse::from)
                .collect();

            info!("Retrieved {} admissions", count);
            Ok(Json(ApiResponse {
                data: responses,
                message: "Admissions retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve admissions: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific admission by ID
#[utoipa::path(
    get,
    path = "/api/v1/admissions/{admission_id}",
    tag = "admissions",
    params(
        ("admission_id" = i32, Path, description = "Admission ID"),
    ),
    responses(
        (status = 200, description = "Admission retrieved", body = ApiResponse<AdmissionResponse>),
        (status = 404, description = "Admission not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn get_admission(
    _admin: AdminUser,
    Path(admission_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AdmissionResponse>>, StatusCode> {
    debug!("Fetching admission with ID: {}", admission_id);

    match admission::Entity::find_by_id(admission_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: AdmissionResponse::from(model),
            message: "Admission retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Admission with ID {} not found", admission_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve admission {}: {}", admission_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Approve a pending admission and provision the member account
///
/// Returns the generated username and the default password exactly once,
/// for the admin to relay to the new member out-of-band.
#[utoipa::path(
    post,
    path = "/api/v1/admissions/{admission_id}/approve",
    tag = "admissions",
    params(
        ("admission_id" = i32, Path, description = "Admission ID"),
    ),
    responses(
        (status = 200, description = "Admission approved, account provisioned", body = ApiResponse<ProvisionedCredentials>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Admission not found", body = ErrorResponse),
        (status = 409, description = "Already processed or username conflict", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(admin, state))]
pub async fn approve_admission(
    admin: AdminUser,
    Path(admission_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProvisionedCredentials>>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        "Admin '{}' approving admission {}",
        admin.0.username, admission_id
    );

    match ::admission::approve_admission(&state.db, &state.settings.provisioning, admission_id)
        .await
    {
        Ok(credentials) => Ok(Json(ApiResponse {
            data: credentials,
            message: "Admission approved successfully".to_string(),
            success: true,
        })),
        Err(err) => Err(admission_error_response("approve", admission_id, err)),
    }
}

/// Reject a pending admission
#[utoipa::path(
    post,
    path = "/api/v1/admissions/{admission_id}/reject",
    tag = "admissions",
    params(
        ("admission_id" = i32, Path, description = "Admission ID"),
    ),
    responses(
        (status = 200, description = "Admission rejected", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Admission not found", body = ErrorResponse),
        (status = 409, description = "Already processed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(admin, state))]
pub async fn reject_admission(
    admin: AdminUser,
    Path(admission_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        "Admin '{}' rejecting admission {}",
        admin.0.username, admission_id
    );

    match ::admission::reject_admission(&state.db, admission_id).await {
        Ok(()) => Ok(Json(ApiResponse {
            data: format!("Admission {} rejected", admission_id),
            message: "Admission rejected successfully".to_string(),
            success: true,
        })),
        Err(err) => Err(admission_error_response("reject", admission_id, err)),
    }
}

/// Map workflow errors to HTTP responses. Every variant is surfaced to the
/// caller; nothing is swallowed.
fn admission_error_response(
    operation: &str,
    admission_id: i32,
    err: AdmissionError,
) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match &err {
        AdmissionError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            "ADMISSION_NOT_FOUND",
            format!("Admission {} not found", admission_id),
        ),
        AdmissionError::AlreadyProcessed(status) => (
            StatusCode::CONFLICT,
            "ADMISSION_ALREADY_PROCESSED",
            format!("Admission {} was already processed ({:?})", admission_id, status),
        ),
        AdmissionError::Conflict(_) => (
            StatusCode::CONFLICT,
            "USERNAME_CONFLICT",
            "A concurrent approval took the generated username; please retry".to_string(),
        ),
        AdmissionError::Configuration(msg) => {
            // Operator problem, not caller problem; log loudly
            error!("Configuration error during {}: {}", operation, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "Server is not configured for admission approval".to_string(),
            )
        }
        AdmissionError::Hashing(_) | AdmissionError::Database(_) => {
            error!("Failed to {} admission {}: {}", operation, admission_id, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                format!("Failed to {} admission", operation),
            )
        }
    };

    warn!(
        "{} admission {} failed with {}: {}",
        operation, admission_id, code, err
    );

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}
