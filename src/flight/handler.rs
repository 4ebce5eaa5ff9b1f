use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::flight;

use super::service::SearchParams;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::MissingParam(_) => Self::BAD_REQUEST,
            super::Error::Provider(_) | super::Error::_Reqwest(_) => Self::BAD_GATEWAY,
            super::Error::_Url(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    keyword: String,
}

pub async fn autocomplete(
    flight_service: State<flight::Service>,
    Query(params): Query<AutocompleteParams>,
) -> crate::Result<Json<serde_json::Value>> {
    let locations = flight_service.autocomplete(&params.keyword).await?;
    Ok(Json(locations))
}

pub async fn search(
    flight_service: State<flight::Service>,
    Query(params): Query<SearchParams>,
) -> crate::Result<Json<serde_json::Value>> {
    let offers = flight_service.search(&params).await?;
    Ok(Json(offers))
}
