use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{group, state::AppState, uuid_id};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::MessageRepository + Send + Sync>;
pub type Service = Arc<dyn service::MessageService + Send + Sync>;

uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/groups/{id}/messages",
            get(handler::find_by_group).post(handler::send),
        )
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("message text is empty")]
    EmptyText,

    #[error(transparent)]
    _Group(#[from] group::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
