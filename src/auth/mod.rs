use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::user;

pub mod middleware;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::AuthService + Send + Sync>;

#[derive(Clone)]
pub struct Config {
    secret: String,
    issuer: String,
    audience: String,
}

impl Config {
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone)]
struct TokenClaims {
    sub: user::Id,
    iss: String,
    aud: String,
    exp: u64,
}

#[derive(Clone, Debug)]
pub struct User {
    id: user::Id,
}

impl User {
    pub fn new(id: user::Id) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized to access the resource")]
    Unauthorized,
    #[error("token is invalid: {0}")]
    InvalidToken(String),
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(e.to_string())
    }
}

impl From<Error> for StatusCode {
    fn from(_: Error) -> Self {
        StatusCode::UNAUTHORIZED
    }
}
