use crate::schemas::AppState;
use admission::ProvisioningSettings;
use anyhow::{Context, Result};
use sea_orm::Database;
use std::fmt;

/// Deployment configuration read from the environment.
#[derive(Clone)]
pub struct Settings {
    /// Secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    /// Settings the admission provisioning workflow needs.
    pub provisioning: ProvisioningSettings,
}

// The signing secret must never reach the logs, even through a tracing
// span that records this struct.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("jwt_secret", &"<redacted>")
            .field("provisioning", &self.provisioning)
            .finish()
    }
}

impl Settings {
    /// Load settings from the environment (and `.env` if present).
    ///
    /// `JWT_SECRET` is required. `DEFAULT_MEMBER_PASSWORD` is optional
    /// here; the approval workflow fails with a configuration error if it
    /// is missing when an admission is approved.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = std::env::var("JWT_SECRET")
            .context("JWT_SECRET must be set to sign session tokens")?;

        let default_password = std::env::var("DEFAULT_MEMBER_PASSWORD").ok();
        if default_password.is_none() {
            tracing::warn!(
                "DEFAULT_MEMBER_PASSWORD is not set; admission approval will fail until it is"
            );
        }

        Ok(Self {
            jwt_secret,
            provisioning: ProvisioningSettings {
                default_password,
                bcrypt_cost: None,
            },
        })
    }
}

/// Initialize application state for the given database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    let settings = Settings::from_env()?;

    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    Ok(AppState { db, settings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_debug_redacts_jwt_secret() {
        let settings = Settings {
            jwt_secret: "super-secret-signing-key".to_string(),
            provisioning: ProvisioningSettings::default(),
        };

        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("super-secret-signing-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
