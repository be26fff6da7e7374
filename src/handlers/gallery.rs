use crate::auth::AdminUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use model::entities::gallery_item;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request structure for adding a gallery photo
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateGalleryItemRequest {
    pub image_url: String,
    pub caption: Option<String>,
}

/// Gallery item response model
#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryItemResponse {
    pub id: i32,
    pub caption: Option<String>,
    pub image_url: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<gallery_item::Model> for GalleryItemResponse {
    fn from(model: gallery_item::Model) -> Self {
        Self {
            id: model.id,
            caption: model.caption,
            image_url: model.image_url,
            created_at: model.created_at,
        }
    }
}

/// Add a photo to the gallery
#[utoipa::path(
    post,
    path = "/api/v1/gallery",
    tag = "gallery",
    request_body = CreateGalleryItemRequest,
    responses(
        (status = 201, description = "Photo added successfully", body = ApiResponse<GalleryItemResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn create_gallery_item(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CreateGalleryItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GalleryItemResponse>>), StatusCode> {
    debug!("Adding gallery photo: {}", request.image_url);

    let new_item = gallery_item::ActiveModel {
        caption: Set(request.caption),
        image_url: Set(request.image_url),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_item.insert(&state.db).await {
        Ok(model) => {
            info!("Gallery photo added with ID: {}", model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: GalleryItemResponse::from(model),
                    message: "Photo added successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to add gallery photo: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all gallery photos, newest first (public)
#[utoipa::path(
    get,
    path = "/api/v1/gallery",
    tag = "gallery",
    responses(
        (status = 200, description = "Gallery retrieved successfully", body = ApiResponse<Vec<GalleryItemResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_gallery_items(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<GalleryItemResponse>>>, StatusCode> {
    debug!("Fetching gallery photos");

    match gallery_item::Entity::find()
        .order_by_desc(gallery_item::Column::CreatedAt)
        .all(&state.db)
        .await
    {
        Ok(items) => {
            let responses: Vec<GalleryItemResponse> =
                items.into_iter().map(GalleryItemResponse::from).collect();
            info!("Retrieved {} gallery photos", responses.len());
            Ok(Json(ApiResponse {
                data: responses,
                message: "Gallery retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve gallery: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Remove a photo from the gallery
#[utoipa::path(
    delete,
    path = "/api/v1/gallery/{item_id}",
    tag = "gallery",
    params(
        ("item_id" = i32, Path, description = "Gallery item ID"),
    ),
    responses(
        (status = 200, description = "Photo removed successfully", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Photo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn delete_gallery_item(
    _admin: AdminUser,
    Path(item_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Removing gallery photo with ID: {}", item_id);

    match gallery_item::Entity::delete_by_id(item_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Gallery photo {} removed", item_id);
                Ok(Json(ApiResponse {
                    data: format!("Gallery item {} deleted", item_id),
                    message: "Photo removed successfully".to_string(),
                    success: true,
                }))
            } else {
                warn!("Gallery item with ID {} not found", item_id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: format!("Gallery item with ID {} not found", item_id),
                        code: "GALLERY_ITEM_NOT_FOUND".to_string(),
                        success: false,
                    }),
                ))
            }
        }
        Err(db_error) => {
            error!("Failed to remove gallery photo {}: {}", item_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while removing photo".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
