use actix_web::{dev::Payload, Error, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use std::future::{ready, Ready};
use std::time::Duration;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Id of the authenticated user (`user-…`).
    pub sub: String,
    pub exp: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("JWT_SECRET not set")]
    MissingSecret,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

fn secret() -> Result<String, TokenError> {
    env::var("JWT_SECRET").map_err(|_| TokenError::MissingSecret)
}

/// Validate a JWT and return its claims.
fn decode_jwt(token: &str) -> Result<Claims, TokenError> {
    let secret = secret()?;
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Extractor yielding validated `Claims`.
pub struct Auth(pub Claims);

impl Auth {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }
}

impl FromRequest for Auth {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        // Delegate to BearerAuth to parse the header.
        if let Ok(bearer) = BearerAuth::from_request(req, pl).into_inner() {
            match decode_jwt(bearer.token()) {
                Ok(claims) => return ready(Ok(Auth(claims))),
                Err(TokenError::MissingSecret) => {
                    log::error!("JWT_SECRET not set; rejecting authenticated request");
                    return ready(Err(ApiError::Internal.into()));
                }
                Err(_) => return ready(Err(ApiError::Unauthorized.into())),
            }
        }
        ready(Err(ApiError::Unauthorized.into()))
    }
}

/// Create an access token for `user_id`, valid for `ttl`.
pub fn create_access_token(user_id: &str, ttl: Duration) -> Result<String, TokenError> {
    let secret = secret()?;
    let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1));
    let expiration = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;

    let claims = Claims { sub: user_id.to_string(), exp: expiration };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
