use crate::auth::AdminUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::achievement;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request structure for showcasing an achievement
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAchievementRequest {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub achieved_on: NaiveDate,
}

/// Achievement response model
#[derive(Debug, Serialize, ToSchema)]
pub struct AchievementResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub achieved_on: NaiveDate,
}

impl From<achievement::Model> for AchievementResponse {
    fn from(model: achievement::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image_url: model.image_url,
            achieved_on: model.achieved_on,
        }
    }
}

/// Showcase a new achievement
#[utoipa::path(
    post,
    path = "/api/v1/achievements",
    tag = "achievements",
    request_body = CreateAchievementRequest,
    responses(
        (status = 201, description = "Achievement created successfully", body = ApiResponse<AchievementResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn create_achievement(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CreateAchievementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AchievementResponse>>), StatusCode> {
    debug!("Creating achievement: {}", request.title);

    let new_achievement = achievement::ActiveModel {
        title: Set(request.title),
        description: Set(request.description),
        image_url: Set(request.image_url),
        achieved_on: Set(request.achieved_on),
        ..Default::default()
    };

    match new_achievement.insert(&state.db).await {
        Ok(model) => {
            info!("Achievement created with ID: {}", model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: AchievementResponse::from(model),
                    message: "Achievement created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create achievement: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all achievements, newest first (public)
#[utoipa::path(
    get,
    path = "/api/v1/achievements",
    tag = "achievements",
    responses(
        (status = 200, description = "Achievements retrieved successfully", body = ApiResponse<Vec<AchievementResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_achievements(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AchievementResponse>>>, StatusCode> {
    debug!("Fetching all achievements");

    match achievement::Entity::find()
        .order_by_desc(achievement::Column::AchievedOn)
        .all(&state.db)
        .await
    {
        Ok(achievements) => {
            let responses: Vec<AchievementResponse> = achievements
                .into_iter()
                .map(AchievementResponse::from)
                .collect();
            info!("Retrieved {} achievements", responses.len());
            Ok(Json(ApiResponse {
                data: responses,
                message: "Achievements retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve achievements: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Remove an achievement
#[utoipa::path(
    delete,
    path = "/api/v1/achievements/{achievement_id}",
    tag = "achievements",
    params(
        ("achievement_id" = i32, Path, description = "Achievement ID"),
    ),
    responses(
        (status = 200, description = "Achievement deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Achievement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn delete_achievement(
    _admin: AdminUser,
    Path(achievement_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Deleting achievement with ID: {}", achievement_id);

    match achievement::Entity::delete_by_id(achievement_id)
        .exec(&state.db)
        .await
    {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Achievement {} deleted", achievement_id);
                Ok(Json(ApiResponse {
                    data: format!("Achievement {} deleted", achievement_id),
                    message: "Achievement deleted successfully".to_string(),
                    success: true,
                }))
            } else {
                warn!("Achievement with ID {} not found", achievement_id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: format!("Achievement with ID {} not found", achievement_id),
                        code: "ACHIEVEMENT_NOT_FOUND".to_string(),
                        success: false,
                    }),
                ))
            }
        }
        Err(db_error) => {
            error!("Failed to delete achievement {}: {}", achievement_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while deleting achievement".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
