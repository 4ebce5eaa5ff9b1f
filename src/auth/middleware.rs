use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Authorization, authorization::Bearer},
};
use log::debug;

use crate::auth;

const TOKEN_COOKIE: &str = "access_token";

pub async fn authorize(
    auth_service: State<auth::Service>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    // WS handshakes from browsers carry the token as a cookie
    let token = match (&auth_header, jar.get(TOKEN_COOKIE)) {
        (Some(TypedHeader(Authorization(bearer))), _) => bearer.token().to_owned(),
        (None, Some(cookie)) => cookie.value().to_owned(),
        (None, None) => {
            debug!("no token present for {}", req.uri());
            return Err(auth::Error::Unauthorized.into());
        }
    };

    let id = auth_service.validate(&token)?;
    req.extensions_mut().insert(auth::User::new(id));

    Ok(next.run(req).await)
}
