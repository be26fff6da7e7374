use anyhow::{bail, Context, Result};
use chrono::Utc;
use model::entities::admission::Gender;
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, QueryFilter, Set};
use tracing::{debug, error, info};

/// Create an administrator account directly in the database.
///
/// Admins are never provisioned through the admission workflow, so this is
/// the only way to bootstrap the first login.
pub async fn create_admin(
    database_url: &str,
    username: &str,
    password: &str,
    name: &str,
    email: &str,
    gender: &str,
) -> Result<()> {
    info!("Creating admin account '{}'", username);
    debug!("Database URL: {}", database_url);

    let gender = match gender.to_uppercase().as_str() {
        "MALE" => Gender::Male,
        "FEMALE" => Gender::Female,
        other => bail!("Unknown gender '{}', expected MALE or FEMALE", other),
    };

    let db = Database::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&db)
        .await
        .context("Failed to check for existing username")?;
    if existing.is_some() {
        bail!("Username '{}' is already taken", username);
    }

    let password_hash = admission::password::hash_password(password, None)
        .await
        .context("Failed to hash admin password")?;

    let admin = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set(String::new()),
        father_name: Set(String::new()),
        mother_name: Set(String::new()),
        image_url: Set(None),
        gender: Set(gender),
        role: Set(UserRole::Admin),
        is_admin: Set(true),
        branch_id: Set(None),
        joined_on: Set(Utc::now().date_naive()),
        ..Default::default()
    };

    match admin.insert(&db).await {
        Ok(model) => {
            info!("Admin account '{}' created with ID {}", model.username, model.id);
            Ok(())
        }
        Err(e) => {
            error!("Failed to create admin account: {}", e);
            Err(e.into())
        }
    }
}
