use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get},
};
use serde::Serialize;

use crate::{state::AppState, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::FriendRepository + Send + Sync>;
pub type Service = Arc<dyn service::FriendService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/friends", get(handler::find_all).post(handler::add))
        .route("/friends/{id}", delete(handler::remove))
        .route("/friends/{id}/status", get(handler::check))
        .with_state(s)
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    Friends,
    Strangers,
    Inconsistent,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("friend not found: {0}")]
    NotFound(user::Id),
    #[error("already friends with {0}")]
    AlreadyFriends(user::Id),
    #[error("cannot befriend oneself")]
    SelfReference,
    #[error("no user registered with email: {0}")]
    UnknownEmail(String),

    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
}
