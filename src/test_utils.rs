#[cfg(test)]
pub mod test_utils {
    use crate::config::Settings;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use admission::ProvisioningSettings;
    use axum::Router;
    use axum_test::TestServer;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use model::entities::admission::Gender;
    use model::entities::user::{self, UserRole};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const TEST_ADMIN_USERNAME: &str = "shanto";
    pub const TEST_ADMIN_PASSWORD: &str = "admin123";
    pub const TEST_DEFAULT_MEMBER_PASSWORD: &str = "dojo1234";

    // Low bcrypt cost keeps the test suite fast
    const TEST_BCRYPT_COST: u32 = 4;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, seeded with one admin account
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        let password_hash = bcrypt::hash(TEST_ADMIN_PASSWORD, TEST_BCRYPT_COST)
            .expect("Failed to hash test admin password");

        let admin = user::ActiveModel {
            username: Set(TEST_ADMIN_USERNAME.to_string()),
            password_hash: Set(password_hash),
            name: Set("Test Admin".to_string()),
            email: Set("admin@example.com".to_string()),
            phone: Set("01700000000".to_string()),
            father_name: Set(String::new()),
            mother_name: Set(String::new()),
            image_url: Set(None),
            gender: Set(Gender::Male),
            role: Set(UserRole::Admin),
            is_admin: Set(true),
            branch_id: Set(None),
            joined_on: Set(Utc::now().date_naive()),
            ..Default::default()
        };
        admin.insert(&db).await.expect("Failed to create test admin");

        let settings = Settings {
            jwt_secret: "test-secret".to_string(),
            provisioning: ProvisioningSettings {
                default_password: Some(TEST_DEFAULT_MEMBER_PASSWORD.to_string()),
                bcrypt_cost: Some(TEST_BCRYPT_COST),
            },
        };

        AppState { db, settings }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// Log in as the seeded admin and return a bearer token
    pub async fn admin_token(server: &TestServer) -> String {
        let response = server
            .post("/api/v1/auth/login")
            .json(&serde_json::json!({
                "username": TEST_ADMIN_USERNAME,
                "password": TEST_ADMIN_PASSWORD,
            }))
            .await;
        assert_eq!(response.status_code(), 200, "admin login failed");

        let body: serde_json::Value = response.json();
        body["data"]["token"]
            .as_str()
            .expect("login response carries no token")
            .to_string()
    }
}
