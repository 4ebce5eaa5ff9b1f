use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{auth, group, message};

use super::model::Message;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::EmptyText => Self::BAD_REQUEST,
            super::Error::_Group(e) => e.into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Deserialize)]
pub struct SendParams {
    text: String,
}

pub async fn send(
    Extension(auth_user): Extension<auth::User>,
    message_service: State<message::Service>,
    Path(group_id): Path<group::Id>,
    Json(params): Json<SendParams>,
) -> crate::Result<(StatusCode, Json<Message>)> {
    let msg = message_service
        .send(&auth_user, &group_id, &params.text)
        .await?;
    Ok((StatusCode::CREATED, Json(msg)))
}

#[derive(Deserialize)]
pub struct FindParams {
    limit: Option<i64>,
    before: Option<DateTime<Utc>>,
}

pub async fn find_by_group(
    Extension(auth_user): Extension<auth::User>,
    message_service: State<message::Service>,
    Path(group_id): Path<group::Id>,
    Query(params): Query<FindParams>,
) -> crate::Result<Json<Vec<Message>>> {
    let msgs = message_service
        .find_by_group(&auth_user, &group_id, params.limit, params.before)
        .await?;
    Ok(Json(msgs))
}
