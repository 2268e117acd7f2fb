//! Caller resolution from the signed token cookie.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::auth::{Caller, Role};
use crate::domain::types::UserId;
use crate::dto::api::ApiError;
use crate::models::config::ServerConfig;

/// Claims carried by the caller token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// Caller id.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    pub exp: usize,
}

fn default_active() -> bool {
    true
}

/// Reasons a request is rejected before reaching any handler logic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Access denied. No token provided.")]
    MissingToken,
    #[error("Invalid token.")]
    InvalidToken,
    #[error("Token expired.")]
    TokenExpired,
    #[error("Account is deactivated.")]
    Deactivated,
    #[error("Internal server error.")]
    Misconfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError::new(self.to_string()))
    }
}

impl AuthenticatedUser {
    /// Signs the claims with the shared secret.
    pub fn to_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Verifies the signature and expiry of `token`.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, AuthError> {
        decode::<AuthenticatedUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Converts verified claims into the caller identity used by services.
    pub fn to_caller(&self) -> Result<Caller, AuthError> {
        if !self.active {
            return Err(AuthError::Deactivated);
        }

        let id = self
            .sub
            .parse::<i32>()
            .ok()
            .and_then(|raw| UserId::new(raw).ok())
            .ok_or(AuthError::InvalidToken)?;

        Ok(Caller {
            id,
            role: self.role,
            active: self.active,
        })
    }
}

fn caller_from_request(req: &HttpRequest) -> Result<Caller, AuthError> {
    let config = req.app_data::<web::Data<ServerConfig>>().ok_or_else(|| {
        log::error!("ServerConfig is not registered as app data");
        AuthError::Misconfigured
    })?;

    let cookie = req
        .cookie(&config.cookie_name)
        .ok_or(AuthError::MissingToken)?;

    let user = AuthenticatedUser::from_token(cookie.value(), &config.secret)?;
    user.to_caller()
}

impl FromRequest for Caller {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(caller_from_request(req))
    }
}
