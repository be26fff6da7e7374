use crate::auth::AdminUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::branch;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request structure for creating a branch
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBranchRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub image_url: Option<String>,
}

/// Request structure for updating a branch
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateBranchRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

/// Branch response model
#[derive(Debug, Serialize, ToSchema)]
pub struct BranchResponse {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub image_url: Option<String>,
}

impl From<branch::Model> for BranchResponse {
    fn from(model: branch::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            phone: model.phone,
            image_url: model.image_url,
        }
    }
}

/// Create a new branch
#[utoipa::path(
    post,
    path = "/api/v1/branches",
    tag = "branches",
    request_body = CreateBranchRequest,
    responses(
        (status = 201, description = "Branch created successfully", body = ApiResponse<BranchResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn create_branch(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CreateBranchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BranchResponse>>), StatusCode> {
    debug!("Creating branch: {}", request.name);

    let new_branch = branch::ActiveModel {
        name: Set(request.name),
        address: Set(request.address),
        phone: Set(request.phone),
        image_url: Set(request.image_url),
        ..Default::default()
    };

    match new_branch.insert(&state.db).await {
        Ok(model) => {
            info!("Branch created with ID: {}", model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: BranchResponse::from(model),
                    message: "Branch created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create branch: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all branches (public)
#[utoipa::path(
    get,
    path = "/api/v1/branches",
    tag = "branches",
    responses(
        (status = 200, description = "Branches retrieved successfully", body = ApiResponse<Vec<BranchResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_branches(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BranchResponse>>>, StatusCode> {
    debug!("Fetching all branches");

    match branch::Entity::find().all(&state.db).await {
        Ok(branches) => {
            let responses: Vec<BranchResponse> =
                branches.into_iter().map(BranchResponse::from).collect();
            info!("Retrieved {} branches", responses.len());
            Ok(Json(ApiResponse {
                data: responses,
                message: "Branches retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve branches: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific branch by ID (public)
#[utoipa::path(
    get,
    path = "/api/v1/branches/{branch_id}",
    tag = "branches",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    responses(
        (status = 200, description = "Branch retrieved successfully", body = ApiResponse<BranchResponse>),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_branch(
    Path(branch_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BranchResponse>>, StatusCode> {
    debug!("Fetching branch with ID: {}", branch_id);

    match branch::Entity::find_by_id(branch_id).one(&state.db).await {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: BranchResponse::from(model),
            message: "Branch retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("Branch with ID {} not found", branch_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve branch {}: {}", branch_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a branch
#[utoipa::path(
    put,
    path = "/api/v1/branches/{branch_id}",
    tag = "branches",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    request_body = UpdateBranchRequest,
    responses(
        (status = 200, description = "Branch updated successfully", body = ApiResponse<BranchResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn update_branch(
    _admin: AdminUser,
    Path(branch_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateBranchRequest>,
) -> Result<Json<ApiResponse<BranchResponse>>, StatusCode> {
    debug!("Updating branch with ID: {}", branch_id);

    let existing = match branch::Entity::find_by_id(branch_id).one(&state.db).await {
        Ok(Some(branch)) => branch,
        Ok(None) => {
            warn!("Branch with ID {} not found for update", branch_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup branch {}: {}", branch_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut active: branch::ActiveModel = existing.into();

    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(address) = request.address {
        active.address = Set(address);
    }
    if let Some(phone) = request.phone {
        active.phone = Set(phone);
    }
    if let Some(image_url) = request.image_url {
        active.image_url = Set(Some(image_url));
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Branch {} updated", branch_id);
            Ok(Json(ApiResponse {
                data: BranchResponse::from(updated),
                message: "Branch updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update branch {}: {}", branch_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a branch
#[utoipa::path(
    delete,
    path = "/api/v1/branches/{branch_id}",
    tag = "branches",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    responses(
        (status = 200, description = "Branch deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Branch still has members", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn delete_branch(
    _admin: AdminUser,
    Path(branch_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Deleting branch with ID: {}", branch_id);

    // Refuse to delete a branch that still has members assigned
    let member_count = match model::entities::user::Entity::find()
        .filter(model::entities::user::Column::BranchId.eq(branch_id))
        .count(&state.db)
        .await
    {
        Ok(count) => count,
        Err(db_error) => {
            error!("Failed to count members of branch {}: {}", branch_id, db_error);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to check branch members".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    if member_count > 0 {
        warn!(
            "Cannot delete branch {} with {} members assigned",
            branch_id, member_count
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "Branch has {} members assigned. Reassign them first.",
                    member_count
                ),
                code: "BRANCH_NOT_EMPTY".to_string(),
                success: false,
            }),
        ));
    }

    match branch::Entity::delete_by_id(branch_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Branch {} deleted", branch_id);
                Ok(Json(ApiResponse {
                    data: format!("Branch {} deleted", branch_id),
                    message: "Branch deleted successfully".to_string(),
                    success: true,
                }))
            } else {
                warn!("Branch with ID {} not found for deletion", branch_id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: "Branch not found".to_string(),
                        code: "BRANCH_NOT_FOUND".to_string(),
                        success: false,
                    }),
                ))
            }
        }
        Err(db_error) => {
            error!("Failed to delete branch {}: {}", branch_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete branch".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
