use axum::{Router, middleware::from_fn_with_state};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{integration::Env, state::AppState};

pub mod auth;
pub mod error;
pub mod event;
pub mod flight;
pub mod friend;
pub mod group;
pub mod integration;
pub mod message;
pub mod poll;
pub mod reservation;
pub mod schema;
pub mod state;
pub mod user;

pub type Result<T> = std::result::Result<T, error::Error>;

/// Declares a uuid-backed identifier usable both in serde payloads and in
/// diesel queries against `Uuid` columns.
#[macro_export]
macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
            diesel::deserialize::FromSqlRow,
            diesel::expression::AsExpression,
        )]
        #[diesel(sql_type = diesel::sql_types::Uuid)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub const fn get(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Uuid, diesel::pg::Pg> for $name {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                <uuid::Uuid as diesel::serialize::ToSql<
                    diesel::sql_types::Uuid,
                    diesel::pg::Pg,
                >>::to_sql(&self.0, out)
            }
        }

        impl diesel::deserialize::FromSql<diesel::sql_types::Uuid, diesel::pg::Pg> for $name {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                <uuid::Uuid as diesel::deserialize::FromSql<
                    diesel::sql_types::Uuid,
                    diesel::pg::Pg,
                >>::from_sql(bytes)
                .map(Self)
            }
        }
    };
}

/// Declares a `Text`-backed enum column. Variants map to the given literals.
#[macro_export]
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $lit:literal),+ $(,)? }) => {
        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $lit,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($lit => Ok(Self::$variant),)+
                    other => Err(format!("unrecognized {}: {other}", stringify!($name))),
                }
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Text, diesel::pg::Pg> for $name {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                use std::io::Write;
                out.write_all(self.as_str().as_bytes())?;
                Ok(diesel::serialize::IsNull::No)
            }
        }

        impl diesel::deserialize::FromSql<diesel::sql_types::Text, diesel::pg::Pg> for $name {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                let s = std::str::from_utf8(bytes.as_bytes())?;
                s.parse::<$name>().map_err(Into::into)
            }
        }
    };
}

pub fn app(env: &Env, state: AppState) -> Router {
    let protected = Router::new()
        .merge(user::api(state.clone()))
        .merge(friend::api(state.clone()))
        .merge(group::api(state.clone()))
        .merge(message::api(state.clone()))
        .merge(poll::api(state.clone()))
        .merge(reservation::api(state.clone()))
        .merge(flight::api(state.clone()));

    let ws = event::api(state.clone());

    Router::new()
        .nest("/api", protected)
        .merge(ws)
        .route_layer(from_fn_with_state(state.clone(), auth::middleware::authorize))
        .route("/health", axum::routing::get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(env.allow_origin())
                .allow_methods(env.allow_methods())
                .allow_headers(env.allow_headers()),
        )
}
