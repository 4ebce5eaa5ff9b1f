use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{auth, group, user};

use super::model::{Group, GroupUpdate};
use super::service::{GroupParams, Icon};

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotMember | super::Error::NotCreator | super::Error::CreatorRemoval => {
                Self::FORBIDDEN
            }
            super::Error::BlankName
            | super::Error::NotParticipant(_)
            | super::Error::UnknownUser(_) => Self::BAD_REQUEST,
            super::Error::AlreadyParticipant(_) => Self::CONFLICT,
            super::Error::_User(e) => e.into(),
            super::Error::Icon(_) | super::Error::_R2d2(_) | super::Error::_Diesel(_) => {
                Self::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub async fn create(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
    Json(params): Json<GroupParams>,
) -> crate::Result<(StatusCode, Json<Group>)> {
    let group = group_service.create(&auth_user, &params).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn find_all(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
) -> crate::Result<Json<Vec<Group>>> {
    let groups = group_service.find_all(&auth_user).await?;
    Ok(Json(groups))
}

pub async fn find_one(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
    Path(id): Path<group::Id>,
) -> crate::Result<Json<Group>> {
    let group = group_service.find_by_id(&auth_user, &id).await?;
    Ok(Json(group))
}

pub async fn update(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
    Path(id): Path<group::Id>,
    Json(update): Json<GroupUpdate>,
) -> crate::Result<Json<Group>> {
    let group = group_service.update(&auth_user, &id, &update).await?;
    Ok(Json(group))
}

pub async fn delete(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
    Path(id): Path<group::Id>,
) -> crate::Result<StatusCode> {
    group_service.delete(&auth_user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ParticipantParams {
    user_id: user::Id,
}

pub async fn add_participant(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
    Path(id): Path<group::Id>,
    Json(params): Json<ParticipantParams>,
) -> crate::Result<Json<Group>> {
    let group = group_service
        .add_participant(&auth_user, &id, &params.user_id)
        .await?;
    Ok(Json(group))
}

pub async fn remove_participant(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
    Path((id, user_id)): Path<(group::Id, user::Id)>,
) -> crate::Result<Json<Group>> {
    let group = group_service
        .remove_participant(&auth_user, &id, &user_id)
        .await?;
    Ok(Json(group))
}

pub async fn icon(
    Extension(auth_user): Extension<auth::User>,
    group_service: State<group::Service>,
    Path(id): Path<group::Id>,
) -> crate::Result<Response> {
    let response = match group_service.icon(&auth_user, &id).await? {
        Icon::Link(link) => Redirect::temporary(&link).into_response(),
        Icon::Png(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
    };
    Ok(response)
}
