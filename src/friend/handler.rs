use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{auth, friend, user};

use super::{Consistency, model::Friend};

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) | super::Error::UnknownEmail(_) => Self::NOT_FOUND,
            super::Error::AlreadyFriends(_) => Self::CONFLICT,
            super::Error::SelfReference => Self::BAD_REQUEST,
            super::Error::_User(e) => e.into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Deserialize)]
pub struct AddParams {
    email: String,
}

pub async fn add(
    Extension(auth_user): Extension<auth::User>,
    friend_service: State<friend::Service>,
    Json(params): Json<AddParams>,
) -> crate::Result<(StatusCode, Json<Friend>)> {
    let friend = friend_service.add(&auth_user, params.email.trim()).await?;
    Ok((StatusCode::CREATED, Json(friend)))
}

pub async fn find_all(
    Extension(auth_user): Extension<auth::User>,
    friend_service: State<friend::Service>,
) -> crate::Result<Json<Vec<Friend>>> {
    let friends = friend_service.find_all(&auth_user).await?;
    Ok(Json(friends))
}

pub async fn remove(
    Extension(auth_user): Extension<auth::User>,
    friend_service: State<friend::Service>,
    Path(id): Path<user::Id>,
) -> crate::Result<StatusCode> {
    friend_service.remove(&auth_user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct CheckResponse {
    status: Consistency,
}

pub async fn check(
    Extension(auth_user): Extension<auth::User>,
    friend_service: State<friend::Service>,
    Path(id): Path<user::Id>,
) -> crate::Result<Json<CheckResponse>> {
    let status = friend_service.check(&auth_user, &id).await?;
    Ok(Json(CheckResponse { status }))
}
