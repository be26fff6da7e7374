//! Bearer-token authentication for the admin surface.
//!
//! Tokens are HS256 JWTs signed with the deployment's `JWT_SECRET`. The
//! [`AdminUser`] extractor rejects requests before any handler logic runs,
//! so admin-only operations cannot have side effects when unauthenticated.

use crate::schemas::{AppState, ErrorResponse};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::user;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Token lifetime.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a session token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub username: String,
    /// Whether the principal may use the admin surface
    pub admin: bool,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Issue a signed session token for a user.
pub fn issue_token(secret: &str, user: &user::Model) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        admin: user.is_admin,
        exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a session token.
pub fn decode_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Extractor for routes that require an authenticated administrator.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing bearer token"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Authorization header is not a bearer token"))?;

        let claims = decode_token(&state.settings.jwt_secret, token).map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            unauthorized("Invalid or expired token")
        })?;

        if !claims.admin {
            warn!(username = %claims.username, "Non-admin token used on admin route");
            return Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "Administrator access required".to_string(),
                    code: "FORBIDDEN".to_string(),
                    success: false,
                }),
            ));
        }

        Ok(AdminUser(claims))
    }
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "UNAUTHORIZED".to_string(),
            success: false,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use model::entities::admission::Gender;
    use model::entities::user::UserRole;

    fn sample_user(is_admin: bool) -> user::Model {
        user::Model {
            id: 1,
            username: "shanto".to_string(),
            password_hash: "$2b$04$placeholderhash".to_string(),
            name: "Shanto Islam".to_string(),
            email: "shanto@example.com".to_string(),
            phone: "01800000002".to_string(),
            father_name: "Rafiq Islam".to_string(),
            mother_name: "Nasima Islam".to_string(),
            image_url: None,
            gender: Gender::Male,
            role: UserRole::Admin,
            is_admin,
            branch_id: None,
            joined_on: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
        }
    }

    #[test]
    fn token_round_trip() {
        let token = issue_token("secret", &sample_user(true)).unwrap();
        let claims = decode_token("secret", &token).unwrap();

        assert_eq!(claims.sub, 1);
        assert_eq!(claims.username, "shanto");
        assert!(claims.admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", &sample_user(true)).unwrap();
        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn admin_flag_is_carried() {
        let token = issue_token("secret", &sample_user(false)).unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert!(!claims.admin);
    }
}
