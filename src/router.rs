use crate::handlers::{
    achievements::{create_achievement, delete_achievement, get_achievements},
    admissions::{
        approve_admission, get_admission, list_admissions, reject_admission, submit_admission,
    },
    auth::login,
    branches::{create_branch, delete_branch, get_branch, get_branches, update_branch},
    gallery::{create_gallery_item, delete_gallery_item, get_gallery_items},
    health::health_check,
    notices::{create_notice, delete_notice, get_notices},
    payments::{create_payment, get_payments, get_user_payments},
    users::{create_user, delete_user, get_user, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/v1/auth/login", post(login))
        // Admission workflow routes
        .route("/api/v1/admissions", post(submit_admission))
        .route("/api/v1/admissions", get(list_admissions))
        .route("/api/v1/admissions/:admission_id", get(get_admission))
        .route("/api/v1/admissions/:admission_id/approve", post(approve_admission))
        .route("/api/v1/admissions/:admission_id/reject", post(reject_admission))
        // User CRUD routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", put(update_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        .route("/api/v1/users/:user_id/payments", get(get_user_payments))
        // Branch CRUD routes
        .route("/api/v1/branches", post(create_branch))
        .route("/api/v1/branches", get(get_branches))
        .route("/api/v1/branches/:branch_id", get(get_branch))
        .route("/api/v1/branches/:branch_id", put(update_branch))
        .route("/api/v1/branches/:branch_id", delete(delete_branch))
        // Notice board routes
        .route("/api/v1/notices", post(create_notice))
        .route("/api/v1/notices", get(get_notices))
        .route("/api/v1/notices/:notice_id", delete(delete_notice))
        // Payment routes
        .route("/api/v1/payments", post(create_payment))
        .route("/api/v1/payments", get(get_payments))
        // Gallery routes
        .route("/api/v1/gallery", post(create_gallery_item))
        .route("/api/v1/gallery", get(get_gallery_items))
        .route("/api/v1/gallery/:item_id", delete(delete_gallery_item))
        // Achievement routes
        .route("/api/v1/achievements", post(create_achievement))
        .route("/api/v1/achievements", get(get_achievements))
        .route("/api/v1/achievements/:achievement_id", delete(delete_achievement))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
