use crate::auth::issue_token;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::user::{self, UserRole};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    pub username: String,
    pub role: UserRole,
    pub is_admin: bool,
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Login attempt for username: {}", request.username);

    let user = match user::Entity::find()
        .filter(user::Column::Username.eq(request.username.as_str()))
        .one(&state.db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Same response as a bad password so usernames cannot be probed
            warn!("Login failed: unknown username '{}'", request.username);
            return Err(invalid_credentials());
        }
        Err(db_error) => {
            error!("Failed to look up user '{}': {}", request.username, db_error);
            return Err(internal_error());
        }
    };

    // bcrypt verification is CPU-intensive, keep it off the async runtime
    let password = request.password.clone();
    let password_hash = user.password_hash.clone();
    let verified =
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await;

    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            warn!("Login failed: wrong password for '{}'", request.username);
            return Err(invalid_credentials());
        }
        Ok(Err(e)) => {
            error!("Password verification failed for '{}': {}", request.username, e);
            return Err(internal_error());
        }
        Err(e) => {
            error!("Password verification task failed: {}", e);
            return Err(internal_error());
        }
    }

    let token = match issue_token(&state.settings.jwt_secret, &user) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to issue token for '{}': {}", request.username, e);
            return Err(internal_error());
        }
    };

    info!("User '{}' logged in", user.username);
    Ok(Json(ApiResponse {
        data: LoginResponse {
            token,
            username: user.username,
            role: user.role,
            is_admin: user.is_admin,
        },
        message: "Login successful".to_string(),
        success: true,
    }))
}

fn invalid_credentials() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Invalid username or password".to_string(),
            code: "INVALID_CREDENTIALS".to_string(),
            success: false,
        }),
    )
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error during login".to_string(),
            code: "LOGIN_ERROR".to_string(),
            success: false,
        }),
    )
}
