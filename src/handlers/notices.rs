use crate::auth::AdminUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use model::entities::notice;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request structure for publishing a notice
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateNoticeRequest {
    pub title: String,
    pub body: String,
    /// Publication date shown on the notice board; defaults to today
    pub published_on: Option<NaiveDate>,
}

/// Notice response model
#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeResponse {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub published_on: NaiveDate,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<notice::Model> for NoticeResponse {
    fn from(model: notice::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            body: model.body,
            published_on: model.published_on,
            created_at: model.created_at,
        }
    }
}

/// Publish a notice
#[utoipa::path(
    post,
    path = "/api/v1/notices",
    tag = "notices",
    request_body = CreateNoticeRequest,
    responses(
        (status = 201, description = "Notice published successfully", body = ApiResponse<NoticeResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn create_notice(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CreateNoticeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NoticeResponse>>), StatusCode> {
    debug!("Publishing notice: {}", request.title);

    let new_notice = notice::ActiveModel {
        title: Set(request.title),
        body: Set(request.body),
        published_on: Set(request
            .published_on
            .unwrap_or_else(|| Utc::now().date_naive())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_notice.insert(&state.db).await {
        Ok(model) => {
            info!("Notice published with ID: {}", model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: NoticeResponse::from(model),
                    message: "Notice published successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to publish notice: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all notices, newest first (public)
#[utoipa::path(
    get,
    path = "/api/v1/notices",
    tag = "notices",
    responses(
        (status = 200, description = "Notices retrieved successfully", body = ApiResponse<Vec<NoticeResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_notices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<NoticeResponse>>>, StatusCode> {
    debug!("Fetching all notices");

    match notice::Entity::find()
        .order_by_desc(notice::Column::PublishedOn)
        .all(&state.db)
        .await
    {
        Ok(notices) => {
            let responses: Vec<NoticeResponse> =
                notices.into_iter().map(NoticeResponse::from).collect();
            info!("Retrieved {} notices", responses.len());
            Ok(Json(ApiResponse {
                data: responses,
                message: "Notices retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve notices: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a notice
#[utoipa::path(
    delete,
    path = "/api/v1/notices/{notice_id}",
    tag = "notices",
    params(
        ("notice_id" = i32, Path, description = "Notice ID"),
    ),
    responses(
        (status = 200, description = "Notice deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Notice not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn delete_notice(
    _admin: AdminUser,
    Path(notice_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Deleting notice with ID: {}", notice_id);

    match notice::Entity::delete_by_id(notice_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Notice {} deleted", notice_id);
                Ok(Json(ApiResponse {
                    data: format!("Notice {} deleted", notice_id),
                    message: "Notice deleted successfully".to_string(),
                    success: true,
                }))
            } else {
                warn!("Notice with ID {} not found for deletion", notice_id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: format!("Notice with ID {} not found", notice_id),
                        code: "NOTICE_NOT_FOUND".to_string(),
                        success: false,
                    }),
                ))
            }
        }
        Err(db_error) => {
            error!("Failed to delete notice {}: {}", notice_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while deleting notice".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
