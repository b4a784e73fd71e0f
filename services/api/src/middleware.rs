//! Authentication middleware for JWT bearer token validation

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use common::error::AppError;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Verifies bearer tokens against the configured HMAC secret
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a verifier for HS256 tokens signed with `secret`
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return the caller's user id
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AppError::Unauthorized)?;
        Ok(token_data.claims.sub)
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token<B>(req: &Request<B>) -> Result<&str, AppError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&req)?;

    let user_id = state.jwt.verify(token).map_err(|e| {
        error!("Failed to validate token");
        e
    })?;

    // Insert the user into the request extensions
    req.extensions_mut().insert(AuthUser { id: user_id });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn token_for(user_id: Uuid, secret: &str, expired: bool) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: if expired { now.saturating_sub(3600) } else { now + 900 },
        };

        encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_a_valid_token() {
        let user_id = Uuid::new_v4();
        let token = token_for(user_id, "secret", false);

        let verifier = JwtVerifier::new("secret");
        assert_eq!(verifier.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn rejects_a_token_with_the_wrong_secret() {
        let token = token_for(Uuid::new_v4(), "secret", false);

        let verifier = JwtVerifier::new("other-secret");
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_an_expired_token() {
        let token = token_for(Uuid::new_v4(), "secret", true);

        let verifier = JwtVerifier::new("secret");
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_a_missing_or_malformed_header() {
        let req = Request::builder().body(()).unwrap();
        assert!(extract_bearer_token(&req).is_err());

        let req = Request::builder()
            .header("Authorization", "Basic abc")
            .body(())
            .unwrap();
        assert!(extract_bearer_token(&req).is_err());
    }
}
