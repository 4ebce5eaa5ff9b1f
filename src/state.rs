use std::sync::Arc;

use axum::extract::FromRef;

use crate::integration::{self, cache, db};
use crate::{auth, event, flight, friend, group, message, poll, reservation, user};

#[derive(Clone)]
pub struct AppState {
    auth_service: auth::Service,
    user_service: user::Service,
    friend_service: friend::Service,
    group_service: group::Service,
    message_service: message::Service,
    poll_service: poll::Service,
    reservation_service: reservation::Service,
    flight_service: flight::Service,
    event_service: event::Service,
    connections: event::Connections,
}

impl AppState {
    pub async fn init(cfg: &integration::Config) -> integration::Result<Self> {
        let pool = cfg.pg.connect();
        db::migrate(&pool)?;

        let redis: cache::Redis = cfg.redis.connect().await;
        let pubsub = cfg.pubsub.connect().await;

        let event_service: event::Service =
            Arc::new(event::service::EventServiceImpl::new(pubsub));

        let user_repo: user::Repository =
            Arc::new(user::repository::PgUserRepository::new(pool.clone()));
        let friend_repo: friend::Repository =
            Arc::new(friend::repository::PgFriendRepository::new(pool.clone()));

        let user_service: user::Service = Arc::new(user::service::UserServiceImpl::new(
            user_repo.clone(),
            friend_repo.clone(),
            event_service.clone(),
            redis.clone(),
        ));

        let friend_service: friend::Service = Arc::new(friend::service::FriendServiceImpl::new(
            friend_repo,
            user_repo.clone(),
            event_service.clone(),
        ));

        let group_service: group::Service = Arc::new(group::service::GroupServiceImpl::new(
            Arc::new(group::repository::PgGroupRepository::new(pool.clone())),
            user_repo,
            event_service.clone(),
            redis,
        ));

        let message_service: message::Service =
            Arc::new(message::service::MessageServiceImpl::new(
                Arc::new(message::repository::PgMessageRepository::new(pool.clone())),
                group_service.clone(),
                event_service.clone(),
            ));

        let poll_service: poll::Service = Arc::new(poll::service::PollServiceImpl::new(
            Arc::new(poll::repository::PgPollRepository::new(pool.clone())),
            group_service.clone(),
            message_service.clone(),
            event_service.clone(),
        ));

        let reservation_service: reservation::Service =
            Arc::new(reservation::service::ReservationServiceImpl::new(
                Arc::new(reservation::repository::PgReservationRepository::new(pool)),
                group_service.clone(),
                event_service.clone(),
            ));

        Ok(Self {
            auth_service: Arc::new(auth::service::AuthServiceImpl::new(&cfg.auth)),
            user_service,
            friend_service,
            group_service,
            message_service,
            poll_service,
            reservation_service,
            flight_service: Arc::new(flight::service::FlightServiceImpl::new(&cfg.flight)),
            event_service,
            connections: event::Connections::default(),
        })
    }
}

impl FromRef<AppState> for auth::Service {
    fn from_ref(s: &AppState) -> Self {
        s.auth_service.clone()
    }
}

impl FromRef<AppState> for user::Service {
    fn from_ref(s: &AppState) -> Self {
        s.user_service.clone()
    }
}

impl FromRef<AppState> for friend::Service {
    fn from_ref(s: &AppState) -> Self {
        s.friend_service.clone()
    }
}

impl FromRef<AppState> for group::Service {
    fn from_ref(s: &AppState) -> Self {
        s.group_service.clone()
    }
}

impl FromRef<AppState> for message::Service {
    fn from_ref(s: &AppState) -> Self {
        s.message_service.clone()
    }
}

impl FromRef<AppState> for poll::Service {
    fn from_ref(s: &AppState) -> Self {
        s.poll_service.clone()
    }
}

impl FromRef<AppState> for reservation::Service {
    fn from_ref(s: &AppState) -> Self {
        s.reservation_service.clone()
    }
}

impl FromRef<AppState> for flight::Service {
    fn from_ref(s: &AppState) -> Self {
        s.flight_service.clone()
    }
}

impl FromRef<AppState> for event::Service {
    fn from_ref(s: &AppState) -> Self {
        s.event_service.clone()
    }
}

impl FromRef<AppState> for event::Connections {
    fn from_ref(s: &AppState) -> Self {
        s.connections.clone()
    }
}
