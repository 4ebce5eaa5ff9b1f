use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;

use crate::{auth, event, flight, friend, group, message, poll, reservation, user};

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    _Auth(#[from] auth::Error),
    _Event(#[from] event::Error),
    _Flight(#[from] flight::Error),
    _Friend(#[from] friend::Error),
    _Group(#[from] group::Error),
    _Message(#[from] message::Error),
    _Poll(#[from] poll::Error),
    _Reservation(#[from] reservation::Error),
    _User(#[from] user::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let status: StatusCode = match self {
            Self::_Auth(e) => e.into(),
            Self::_Event(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::_Flight(e) => e.into(),
            Self::_Friend(e) => e.into(),
            Self::_Group(e) => e.into(),
            Self::_Message(e) => e.into(),
            Self::_Poll(e) => e.into(),
            Self::_Reservation(e) => e.into(),
            Self::_User(e) => e.into(),
        };

        let message = if status.is_server_error() {
            error!("{status}: {message}");
            "Something went wrong".to_owned()
        } else {
            warn!("{status}: {message}");
            message
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
