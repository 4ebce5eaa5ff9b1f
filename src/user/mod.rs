use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use service::UserService;

use crate::{state::AppState, uuid_id};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::UserRepository + Send + Sync>;
pub type Service = Arc<dyn UserService + Send + Sync>;

uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/users", post(handler::register).get(handler::find_by_email))
        .route("/users/me", get(handler::find_me).put(handler::update_me))
        .route("/users/{id}", get(handler::find_one))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found: {0}")]
    NotFound(Id),
    #[error("no user registered with email: {0}")]
    EmailNotFound(String),
    #[error("user already exists: {0}")]
    AlreadyExists(Id),
    #[error("email is already taken: {0}")]
    EmailTaken(String),
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("name must not be empty")]
    BlankName,

    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
