use crate::auth::AdminUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use model::entities::admission::Gender;
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, SqlErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for creating a user directly (admin action, bypasses the
/// admission workflow; used for trainers, admins and transfers)
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    /// Username (must be unique)
    pub username: String,
    /// Initial plaintext password; stored as a bcrypt hash
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub father_name: String,
    pub mother_name: String,
    pub gender: Gender,
    pub role: Option<UserRole>,
    pub is_admin: Option<bool>,
    pub branch_id: Option<i32>,
    pub image_url: Option<String>,
    pub joined_on: Option<NaiveDate>,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_admin: Option<bool>,
    pub branch_id: Option<i32>,
    pub image_url: Option<String>,
}

/// User response model. Never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub father_name: String,
    pub mother_name: String,
    pub image_url: Option<String>,
    pub gender: Gender,
    pub role: UserRole,
    pub is_admin: bool,
    pub branch_id: Option<i32>,
    pub joined_on: NaiveDate,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            email: model.email,
            phone: model.phone,
            father_name: model.father_name,
            mother_name: model.mother_name,
            image_url: model.image_url,
            gender: model.gender,
            role: model.role,
            is_admin: model.is_admin,
            branch_id: model.branch_id,
            joined_on: model.joined_on,
        }
    }
}

/// Create a new user directly
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn create_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating user with username: {}", request.username);

    let password_hash = match admission::password::hash_password(
        &request.password,
        state.settings.provisioning.bcrypt_cost,
    )
    .await
    {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password for '{}': {}", request.username, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to hash password".to_string(),
                    code: "HASHING_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    let new_user = user::ActiveModel {
        username: Set(request.username.clone()),
        password_hash: Set(password_hash),
        name: Set(request.name),
        email: Set(request.email),
        phone: Set(request.phone),
        father_name: Set(request.father_name),
        mother_name: Set(request.mother_name),
        image_url: Set(request.image_url),
        gender: Set(request.gender),
        role: Set(request.role.unwrap_or_default()),
        is_admin: Set(request.is_admin.unwrap_or(false)),
        branch_id: Set(request.branch_id),
        joined_on: Set(request.joined_on.unwrap_or_else(|| Utc::now().date_naive())),
        ..Default::default()
    };

    match new_user.insert(&state.db).await {
        Ok(user_model) => {
            info!(
                "User created successfully with ID: {}, username: {}",
                user_model.id, user_model.username
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: UserResponse::from(user_model),
                    message: "User created successfully".to_string(),
                    success: true,
                }),
            ))
        }
        Err(db_error) => {
            error!("Failed to create user '{}': {}", request.username, db_error);

            // Distinguish uniqueness conflicts from other database errors
            let error_response = if matches!(
                db_error.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(_))
            ) {
                (
                    StatusCode::CONFLICT,
                    Json(ErrorResponse {
                        error: format!("Username '{}' already exists", request.username),
                        code: "USERNAME_ALREADY_EXISTS".to_string(),
                        success: false,
                    }),
                )
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Internal server error while creating user".to_string(),
                        code: "DATABASE_ERROR".to_string(),
                        success: false,
                    }),
                )
            };

            Err(error_response)
        }
    }
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn get_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, StatusCode> {
    debug!("Fetching all users from database");

    match user::Entity::find().all(&state.db).await {
        Ok(users) => {
            let user_count = users.len();
            let user_responses: Vec<UserResponse> =
                users.into_iter().map(UserResponse::from).collect();

            info!("Successfully retrieved {} users", user_count);
            Ok(Json(ApiResponse {
                data: user_responses,
                message: "Users retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve users from database: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn get_user(
    _admin: AdminUser,
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, StatusCode> {
    debug!("Fetching user with ID: {}", user_id);

    match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(user_model)) => Ok(Json(ApiResponse {
            data: UserResponse::from(user_model),
            message: "User retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("User with ID {} not found", user_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve user with ID {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn update_user(
    _admin: AdminUser,
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, StatusCode> {
    debug!("Updating user with ID: {}", user_id);

    let existing_user = match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("User with ID {} not found for update", user_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup user {} for update: {}", user_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut user_active: user::ActiveModel = existing_user.into();

    // Update only provided fields
    if let Some(name) = request.name {
        user_active.name = Set(name);
    }
    if let Some(email) = request.email {
        user_active.email = Set(email);
    }
    if let Some(phone) = request.phone {
        user_active.phone = Set(phone);
    }
    if let Some(role) = request.role {
        user_active.role = Set(role);
    }
    if let Some(is_admin) = request.is_admin {
        user_active.is_admin = Set(is_admin);
    }
    if let Some(branch_id) = request.branch_id {
        user_active.branch_id = Set(Some(branch_id));
    }
    if let Some(image_url) = request.image_url {
        user_active.image_url = Set(Some(image_url));
    }

    match user_active.update(&state.db).await {
        Ok(updated_user) => {
            info!("User with ID {} updated successfully", user_id);
            Ok(Json(ApiResponse {
                data: UserResponse::from(updated_user),
                message: "User updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update user with ID {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn delete_user(
    _admin: AdminUser,
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    debug!("Attempting to delete user with ID: {}", user_id);

    match user::Entity::delete_by_id(user_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("User with ID {} deleted successfully", user_id);
                Ok(Json(ApiResponse {
                    data: format!("User {} deleted", user_id),
                    message: "User deleted successfully".to_string(),
                    success: true,
                }))
            } else {
                warn!("User with ID {} not found for deletion", user_id);
                Err(StatusCode::NOT_FOUND)
            }
        }
        Err(db_error) => {
            error!("Failed to delete user with ID {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
