use std::sync::Arc;

use axum::{Router, routing::get};

use crate::state::AppState;

mod handler;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::FlightService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/autocomplete", get(handler::autocomplete))
        .route("/search", get(handler::search))
        .with_state(s)
}

#[derive(Clone)]
pub struct Config {
    base_url: String,
    api_key: String,
}

impl Config {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing query parameter: {0}")]
    MissingParam(&'static str),
    #[error("flight provider answered with {0}")]
    Provider(u16),

    #[error(transparent)]
    _Url(#[from] url::ParseError),
    #[error(transparent)]
    _Reqwest(#[from] reqwest::Error),
}
