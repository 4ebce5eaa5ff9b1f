use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::{auth, user};

use super::model::{NewUser, ProfileUpdate, UserDto};

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) | super::Error::EmailNotFound(_) => Self::NOT_FOUND,
            super::Error::AlreadyExists(_) | super::Error::EmailTaken(_) => Self::CONFLICT,
            super::Error::InvalidEmail(_) | super::Error::BlankName => Self::BAD_REQUEST,
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterParams {
    first_name: String,
    last_name: String,
    email: String,
    picture: Option<String>,
}

pub async fn register(
    Extension(auth_user): Extension<auth::User>,
    user_service: State<user::Service>,
    Json(params): Json<RegisterParams>,
) -> crate::Result<(StatusCode, Json<UserDto>)> {
    let new_user = NewUser::new(
        *auth_user.id(),
        params.first_name.trim(),
        params.last_name.trim(),
        params.email.trim(),
        params.picture,
    );

    let user = user_service.register(&new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn find_me(
    Extension(auth_user): Extension<auth::User>,
    user_service: State<user::Service>,
) -> crate::Result<Json<UserDto>> {
    let user = user_service.find_by_id(auth_user.id()).await?;
    Ok(Json(user))
}

pub async fn update_me(
    Extension(auth_user): Extension<auth::User>,
    user_service: State<user::Service>,
    Json(update): Json<ProfileUpdate>,
) -> crate::Result<Json<UserDto>> {
    let user = user_service.update_profile(auth_user.id(), &update).await?;
    Ok(Json(user))
}

pub async fn find_one(
    Path(id): Path<user::Id>,
    user_service: State<user::Service>,
) -> crate::Result<Json<UserDto>> {
    let user = user_service.find_by_id(&id).await?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct FindParams {
    email: String,
}

pub async fn find_by_email(
    Query(params): Query<FindParams>,
    user_service: State<user::Service>,
) -> crate::Result<Json<UserDto>> {
    let user = user_service.find_by_email(params.email.trim()).await?;
    Ok(Json(user))
}
