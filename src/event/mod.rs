use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use axum::{Router, routing::get};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    friend::model::Friend,
    group::{self, model::Group},
    message::model::Message,
    poll::{self, model::PollDto},
    reservation::model::ReservationDto,
    state::AppState,
    user::{self, model::OnlineStatus},
};

mod handler;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::EventService + Send + Sync>;
pub type NotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send>>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new().route("/ws", get(handler::ws)).with_state(s)
}

#[derive(Clone, Default)]
pub struct Connections(Arc<Mutex<HashMap<user::Id, usize>>>);

impl Connections {
    /// Returns `true` for the user's first socket.
    pub async fn open(&self, id: &user::Id) -> bool {
        let mut open = self.0.lock().await;
        let count = open.entry(*id).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Returns `true` once the user's last socket is gone.
    pub async fn close(&self, id: &user::Id) -> bool {
        let mut open = self.0.lock().await;
        match open.get_mut(id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                open.remove(id);
                true
            }
            None => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    Notifications(user::Id),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    NewMessage {
        message: Message,
    },
    PollUpdated {
        poll: PollDto,
    },
    PollClosed {
        poll_id: poll::Id,
        winner: Option<String>,
    },
    ReservationUpdated {
        reservation: ReservationDto,
    },
    ReservationDeleted {
        group_id: group::Id,
    },
    GroupUpdated {
        group: Group,
    },
    GroupDeleted {
        group_id: group::Id,
    },
    FriendAdded {
        friend: Friend,
    },
    FriendRemoved {
        friend_id: user::Id,
    },
    OnlineStatusChange(OnlineStatus),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Subscribe(#[from] async_nats::SubscribeError),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn should_report_first_and_last_socket() {
        let connections = Connections::default();
        let jora = user::Id::random();

        assert!(connections.open(&jora).await);
        assert!(!connections.open(&jora).await);

        assert!(!connections.close(&jora).await);
        assert!(connections.close(&jora).await);
        assert!(connections.open(&jora).await);
    }

    #[tokio::test]
    async fn should_track_users_separately() {
        let connections = Connections::default();
        let jora = user::Id::random();
        let valera = user::Id::random();

        connections.open(&jora).await;

        assert!(connections.open(&valera).await);
        assert!(connections.close(&valera).await);
        assert!(!connections.open(&jora).await);
    }
}
