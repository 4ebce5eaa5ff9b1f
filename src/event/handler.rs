use std::sync::Arc;

use axum::{
    Extension,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use log::{debug, error, warn};
use tokio::sync::Notify;

use crate::{auth, event, user};

pub async fn ws(
    Extension(auth_user): Extension<auth::User>,
    ws: WebSocketUpgrade,
    State(event_service): State<event::Service>,
    State(user_service): State<user::Service>,
    State(connections): State<event::Connections>,
) -> Response {
    ws.on_upgrade(move |socket| {
        handle_socket(auth_user, socket, event_service, user_service, connections)
    })
}

async fn handle_socket(
    auth_user: auth::User,
    socket: WebSocket,
    event_service: event::Service,
    user_service: user::Service,
    connections: event::Connections,
) {
    let user_id = *auth_user.id();
    let subject = event::Subject::Notifications(user_id);

    let mut notifications = match event_service.subscribe(&subject).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to subscribe to {subject}, closing WS: {e:?}");
            return;
        }
    };

    if connections.open(&user_id).await {
        if let Err(e) = user_service.set_online(&user_id, true).await {
            error!("failed to mark {user_id} as online: {e:?}");
        }
    }

    let (mut sender, mut receiver) = socket.split();
    let close = Arc::new(Notify::new());

    let mut write_task = {
        let close = close.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = close.notified() => break,
                    next = notifications.next() => match next {
                        Some(n) => {
                            let payload = match serde_json::to_string(&n) {
                                Ok(p) => p,
                                Err(e) => {
                                    error!("failed to serialize notification: {e:?}");
                                    continue;
                                }
                            };
                            if let Err(e) = sender.send(Message::Text(payload.into())).await {
                                error!("failed to write WS frame: {e}");
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        })
    };

    let mut read_task = {
        let close = close.clone();
        tokio::spawn(async move {
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Close(frame)) => {
                        debug!("WS connection closed by client: {frame:?}");
                        break;
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(other) => warn!("ignoring inbound WS frame: {other:?}"),
                    Err(e) => {
                        error!("failed to read WS frame: {e}");
                        break;
                    }
                }
            }
            close.notify_one();
        })
    };

    tokio::select! {
        _ = &mut write_task => read_task.abort(),
        _ = &mut read_task => {
            // read task has notified close, write task exits on its own
            if let Err(e) = write_task.await {
                error!("WS write task failed: {e}");
            }
        },
    }

    if connections.close(&user_id).await {
        if let Err(e) = user_service.set_online(&user_id, false).await {
            error!("failed to mark {user_id} as offline: {e:?}");
        }
    }
    debug!("WS disconnected for {user_id}");
}
