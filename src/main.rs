use log::{error, info};

use voyage_service::integration;
use voyage_service::state::AppState;

#[tokio::main]
async fn main() {
    let cfg = integration::Config::default();

    let state = match AppState::init(&cfg).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {e}");
            std::process::exit(1);
        }
    };

    let app = voyage_service::app(&cfg.env, state);
    let addr = cfg.env.addr();
    info!("listening on {addr}");

    let served = match cfg.env.ssl_config() {
        Some(ssl) => {
            axum_server::bind_openssl(addr, ssl)
                .serve(app.into_make_service())
                .await
        }
        None => {
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = served {
        error!("server stopped: {e}");
    }
}
