use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{auth, group, reservation};

use super::model::{ItemStatus, ReservationDto, ReservationStatus, Trip};
use super::service::Vote;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::AlreadyExists(_) => Self::CONFLICT,
            super::Error::NotCreator => Self::FORBIDDEN,
            super::Error::InvalidTrip(_) => Self::BAD_REQUEST,
            super::Error::_Group(e) => e.into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub async fn create(
    Extension(auth_user): Extension<auth::User>,
    reservation_service: State<reservation::Service>,
    Path(group_id): Path<group::Id>,
    Json(trip): Json<Trip>,
) -> crate::Result<(StatusCode, Json<ReservationDto>)> {
    let dto = reservation_service
        .create(&auth_user, &group_id, trip)
        .await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

pub async fn find_by_group(
    Extension(auth_user): Extension<auth::User>,
    reservation_service: State<reservation::Service>,
    Path(group_id): Path<group::Id>,
) -> crate::Result<Json<ReservationDto>> {
    let dto = reservation_service
        .find_by_group(&auth_user, &group_id)
        .await?;
    Ok(Json(dto))
}

#[derive(Deserialize)]
pub struct VoteParams {
    status: ItemStatus,
}

pub async fn vote(
    Extension(auth_user): Extension<auth::User>,
    reservation_service: State<reservation::Service>,
    Path(group_id): Path<group::Id>,
    Json(params): Json<VoteParams>,
) -> crate::Result<Json<Vote>> {
    let vote = reservation_service
        .vote(&auth_user, &group_id, params.status)
        .await?;
    Ok(Json(vote))
}

#[derive(Deserialize)]
pub struct StatusParams {
    status: ReservationStatus,
}

pub async fn set_status(
    Extension(auth_user): Extension<auth::User>,
    reservation_service: State<reservation::Service>,
    Path(group_id): Path<group::Id>,
    Json(params): Json<StatusParams>,
) -> crate::Result<Json<ReservationDto>> {
    let dto = reservation_service
        .set_status(&auth_user, &group_id, params.status)
        .await?;
    Ok(Json(dto))
}

pub async fn delete(
    Extension(auth_user): Extension<auth::User>,
    reservation_service: State<reservation::Service>,
    Path(group_id): Path<group::Id>,
) -> crate::Result<StatusCode> {
    reservation_service.delete(&auth_user, &group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
