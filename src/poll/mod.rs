use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{group, message, state::AppState, uuid_id};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::PollRepository + Send + Sync>;
pub type Service = Arc<dyn service::PollService + Send + Sync>;

uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/polls", get(handler::find_public).post(handler::create))
        .route(
            "/polls/{id}",
            get(handler::find_one).delete(handler::delete),
        )
        .route(
            "/polls/{id}/vote",
            post(handler::vote).delete(handler::remove_vote),
        )
        .route("/groups/{id}/polls", get(handler::find_by_group))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("poll not found: {0}")]
    NotFound(Id),
    #[error("poll is closed: {0}")]
    Closed(Id),
    #[error("option index out of range: {0}")]
    InvalidOption(usize),
    #[error("already voted in this poll")]
    AlreadyVoted,
    #[error("no vote to remove")]
    NotVoted,
    #[error("only the poll creator can do this")]
    NotCreator,
    #[error("poll question must not be empty")]
    EmptyQuestion,
    #[error("poll needs at least two options")]
    TooFewOptions,
    #[error("poll expiration must be in the future")]
    PastExpiration,

    #[error(transparent)]
    _Group(#[from] group::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
