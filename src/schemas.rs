use crate::config::Settings;
use common::ProvisionedCredentials;
use model::entities::admission::{AdmissionStatus, BloodGroup, Gender};
use model::entities::user::UserRole;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Deployment configuration
    pub settings: Settings,
}

/// API response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Registers the bearer-token scheme referenced by the guarded paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::admissions::submit_admission,
        crate::handlers::admissions::list_admissions,
        crate::handlers::admissions::get_admission,
        crate::handlers::admissions::approve_admission,
        crate::handlers::admissions::reject_admission,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::branches::create_branch,
        crate::handlers::branches::get_branches,
        crate::handlers::branches::get_branch,
        crate::handlers::branches::update_branch,
        crate::handlers::branches::delete_branch,
        crate::handlers::notices::create_notice,
        crate::handlers::notices::get_notices,
        crate::handlers::notices::delete_notice,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::get_payments,
        crate::handlers::payments::get_user_payments,
        crate::handlers::gallery::create_gallery_item,
        crate::handlers::gallery::get_gallery_items,
        crate::handlers::gallery::delete_gallery_item,
        crate::handlers::achievements::create_achievement,
        crate::handlers::achievements::get_achievements,
        crate::handlers::achievements::delete_achievement,
    ),
    components(
        schemas(
            ApiResponse<ProvisionedCredentials>,
            ErrorResponse,
            HealthResponse,
            ProvisionedCredentials,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::admissions::SubmitAdmissionRequest,
            crate::handlers::admissions::AdmissionResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::branches::CreateBranchRequest,
            crate::handlers::branches::UpdateBranchRequest,
            crate::handlers::branches::BranchResponse,
            crate::handlers::notices::CreateNoticeRequest,
            crate::handlers::notices::NoticeResponse,
            crate::handlers::payments::CreatePaymentRequest,
            crate::handlers::payments::PaymentResponse,
            crate::handlers::gallery::CreateGalleryItemRequest,
            crate::handlers::gallery::GalleryItemResponse,
            crate::handlers::achievements::CreateAchievementRequest,
            crate::handlers::achievements::AchievementResponse,
            Gender,
            BloodGroup,
            AdmissionStatus,
            UserRole,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login and session tokens"),
        (name = "admissions", description = "Membership admission workflow"),
        (name = "users", description = "Member account management"),
        (name = "branches", description = "Training branch management"),
        (name = "notices", description = "Notice board"),
        (name = "payments", description = "Membership-fee payments"),
        (name = "gallery", description = "Public photo gallery"),
        (name = "achievements", description = "Tournament and belt achievements"),
    ),
    info(
        title = "Dojo Portal API",
        description = "Martial-arts academy portal - admissions, members and academy content",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
