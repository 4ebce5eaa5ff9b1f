use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{auth, group, poll};

use super::model::PollDto;
use super::service::PollParams;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotCreator => Self::FORBIDDEN,
            super::Error::AlreadyVoted | super::Error::Closed(_) => Self::CONFLICT,
            super::Error::NotVoted
            | super::Error::InvalidOption(_)
            | super::Error::EmptyQuestion
            | super::Error::TooFewOptions
            | super::Error::PastExpiration => Self::BAD_REQUEST,
            super::Error::_Group(e) => e.into(),
            super::Error::_Message(e) => e.into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub async fn create(
    Extension(auth_user): Extension<auth::User>,
    poll_service: State<poll::Service>,
    Json(params): Json<PollParams>,
) -> crate::Result<(StatusCode, Json<PollDto>)> {
    let poll = poll_service.create(&auth_user, &params).await?;
    Ok((StatusCode::CREATED, Json(poll)))
}

pub async fn find_one(
    Extension(auth_user): Extension<auth::User>,
    poll_service: State<poll::Service>,
    Path(id): Path<poll::Id>,
) -> crate::Result<Json<PollDto>> {
    let poll = poll_service.find_by_id(&auth_user, &id).await?;
    Ok(Json(poll))
}

pub async fn find_public(
    Extension(auth_user): Extension<auth::User>,
    poll_service: State<poll::Service>,
) -> crate::Result<Json<Vec<PollDto>>> {
    let polls = poll_service.find_public(&auth_user).await?;
    Ok(Json(polls))
}

pub async fn find_by_group(
    Extension(auth_user): Extension<auth::User>,
    poll_service: State<poll::Service>,
    Path(group_id): Path<group::Id>,
) -> crate::Result<Json<Vec<PollDto>>> {
    let polls = poll_service.find_by_group(&auth_user, &group_id).await?;
    Ok(Json(polls))
}

#[derive(Deserialize)]
pub struct VoteParams {
    option: usize,
}

pub async fn vote(
    Extension(auth_user): Extension<auth::User>,
    poll_service: State<poll::Service>,
    Path(id): Path<poll::Id>,
    Json(params): Json<VoteParams>,
) -> crate::Result<Json<PollDto>> {
    let poll = poll_service.vote(&auth_user, &id, params.option).await?;
    Ok(Json(poll))
}

pub async fn remove_vote(
    Extension(auth_user): Extension<auth::User>,
    poll_service: State<poll::Service>,
    Path(id): Path<poll::Id>,
) -> crate::Result<Json<PollDto>> {
    let poll = poll_service.remove_vote(&auth_user, &id).await?;
    Ok(Json(poll))
}

pub async fn delete(
    Extension(auth_user): Extension<auth::User>,
    poll_service: State<poll::Service>,
    Path(id): Path<poll::Id>,
) -> crate::Result<StatusCode> {
    poll_service.delete(&auth_user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
