use std::env;
use std::str::FromStr;
use std::time::Duration;
use std::{fs::File, net::SocketAddr};

use axum::http::HeaderValue;
use axum_server::tls_openssl::OpenSSLConfig;
use dotenv::dotenv;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin};

use crate::{auth, flight};

pub mod cache;
pub mod db;
pub mod pubsub;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub enum Env {
    Local,
    Dev,
    Stage,
    Production,
}

impl Env {
    pub fn addr(&self) -> SocketAddr {
        match self {
            Env::Local => SocketAddr::from(([127, 0, 0, 1], 8000)),
            Env::Dev | Env::Stage => SocketAddr::from(([0, 0, 0, 0], 8000)),
            Env::Production => SocketAddr::from(([0, 0, 0, 0], 8443)),
        }
    }

    pub fn ssl_config(&self) -> Option<OpenSSLConfig> {
        match self {
            Env::Local | Env::Dev | Env::Stage => None,
            Env::Production => {
                let ssl_config = OpenSSLConfig::from_pem_file(
                    env::var("SSL_CERT_FILE").expect("SSL_CERT_FILE must be set"),
                    env::var("SSL_KEY_FILE").expect("SSL_KEY_FILE must be set"),
                )
                .expect("cert should be present and have read permission");
                Some(ssl_config)
            }
        }
    }

    pub fn allow_origin(&self) -> AllowOrigin {
        match self {
            Env::Local | Env::Dev => AllowOrigin::any(),
            Env::Stage | Env::Production => {
                let origins = env::var("ALLOW_ORIGIN")
                    .expect("ALLOW_ORIGIN must be set")
                    .split(',')
                    .map(HeaderValue::from_str)
                    .map(|r| r.expect("invalid ALLOW_ORIGIN value"))
                    .collect::<Vec<HeaderValue>>();
                AllowOrigin::list(origins)
            }
        }
    }

    pub fn allow_methods(&self) -> AllowMethods {
        AllowMethods::any()
    }

    pub fn allow_headers(&self) -> AllowHeaders {
        AllowHeaders::any()
    }
}

#[derive(Clone)]
pub struct Config {
    pub env: Env,

    pub pg: db::Config,
    pub redis: cache::Config,
    pub pubsub: pubsub::Config,

    pub auth: auth::Config,
    pub flight: flight::Config,
}

impl Default for Config {
    fn default() -> Self {
        dotenv().ok();

        let rust_log = env::var("RUST_LOG").unwrap_or("info".into());
        let level = LevelFilter::from_str(&rust_log).unwrap_or(LevelFilter::Info);
        let log_file = env::var("SERVICE_NAME")
            .map(|pkg| format!("{pkg}.log"))
            .unwrap_or("service.log".into());

        CombinedLogger::init(vec![
            TermLogger::new(
                level,
                simplelog::Config::default(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            ),
            WriteLogger::new(
                level,
                simplelog::Config::default(),
                File::create(log_file).expect("Failed to create log file"),
            ),
        ])
        .expect("Failed to initialize logger");

        let env = env::var("ENV")
            .map(|env| match env.as_str() {
                "local" => Env::Local,
                "dev" => Env::Dev,
                "stg" => Env::Stage,
                "prod" => Env::Production,
                _ => panic!("Invalid environment: {env}"),
            })
            .unwrap_or(Env::Local);

        let auth_cfg = auth::Config::new(
            env::var("AUTH_SECRET").expect("AUTH_SECRET must be set"),
            env::var("AUTH_ISSUER").expect("AUTH_ISSUER must be set"),
            env::var("AUTH_AUDIENCE").expect("AUTH_AUDIENCE must be set"),
        );

        let flight_cfg = flight::Config::new(
            env::var("FLIGHT_API_URL").unwrap_or("https://test.api.amadeus.com".into()),
            env::var("FLIGHT_API_KEY").unwrap_or_default(),
        );

        Self {
            env,
            pg: db::Config::env().unwrap_or_default(),
            redis: cache::Config::env().unwrap_or_default(),
            pubsub: pubsub::Config::env().unwrap_or_default(),
            auth: auth_cfg,
            flight: flight_cfg,
        }
    }
}

pub fn init_http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            panic!("Failed to initialize HTTP client: {e}")
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    _Env(#[from] env::VarError),
    _ParseInt(#[from] std::num::ParseIntError),
    _Redis(#[from] redis::RedisError),
    _R2d2(#[from] r2d2::Error),
    _Nats(#[from] async_nats::ConnectError),
    _Migration(#[from] Box<dyn std::error::Error + Send + Sync>),
}
