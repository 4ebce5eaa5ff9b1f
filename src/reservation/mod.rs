use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{group, state::AppState, uuid_id};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::ReservationRepository + Send + Sync>;
pub type Service = Arc<dyn service::ReservationService + Send + Sync>;

uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/groups/{id}/reservation",
            get(handler::find_by_group)
                .post(handler::create)
                .delete(handler::delete),
        )
        .route("/groups/{id}/reservation/vote", post(handler::vote))
        .route("/groups/{id}/reservation/status", put(handler::set_status))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no reservation for group: {0}")]
    NotFound(group::Id),
    #[error("group already holds a reservation: {0}")]
    AlreadyExists(group::Id),
    #[error("only the group creator can do this")]
    NotCreator,
    #[error("invalid trip: {0}")]
    InvalidTrip(&'static str),

    #[error(transparent)]
    _Group(#[from] group::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
