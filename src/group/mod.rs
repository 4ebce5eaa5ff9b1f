use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::{state::AppState, user, uuid_id};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::GroupRepository + Send + Sync>;
pub type Service = Arc<dyn service::GroupService + Send + Sync>;

uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/groups", get(handler::find_all).post(handler::create))
        .route(
            "/groups/{id}",
            get(handler::find_one)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/groups/{id}/icon.png", get(handler::icon))
        .route(
            "/groups/{id}/participants",
            axum::routing::post(handler::add_participant),
        )
        .route(
            "/groups/{id}/participants/{user_id}",
            delete(handler::remove_participant),
        )
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("group not found: {0}")]
    NotFound(Id),
    #[error("not a participant of the group")]
    NotMember,
    #[error("only the group creator can do this")]
    NotCreator,
    #[error("group name must not be empty")]
    BlankName,
    #[error("already a participant: {0}")]
    AlreadyParticipant(user::Id),
    #[error("not a participant: {0}")]
    NotParticipant(user::Id),
    #[error("the creator cannot leave the group")]
    CreatorRemoval,
    #[error("selected user does not exist: {0}")]
    UnknownUser(user::Id),
    #[error("could not generate icon: {0}")]
    Icon(String),

    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
}
