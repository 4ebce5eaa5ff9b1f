use async_trait::async_trait;
use email_address::EmailAddress;
use log::{debug, error};

use crate::integration::cache;
use crate::{event, friend};

use super::model::{NewUser, OnlineStatus, ProfileUpdate, UserDto};
use super::{Id, Repository};

#[async_trait]
pub trait UserService {
    async fn register(&self, u: &NewUser) -> super::Result<UserDto>;

    async fn find_by_id(&self, id: &Id) -> super::Result<UserDto>;

    async fn find_by_email(&self, email: &str) -> super::Result<UserDto>;

    async fn update_profile(&self, id: &Id, p: &ProfileUpdate) -> super::Result<UserDto>;

    async fn set_online(&self, id: &Id, online: bool) -> super::Result<()>;
}

#[derive(Clone)]
pub struct UserServiceImpl {
    repo: Repository,
    friend_repo: friend::Repository,
    event_service: event::Service,
    redis: cache::Redis,
}

impl UserServiceImpl {
    pub fn new(
        repo: Repository,
        friend_repo: friend::Repository,
        event_service: event::Service,
        redis: cache::Redis,
    ) -> Self {
        Self {
            repo,
            friend_repo,
            event_service,
            redis,
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn register(&self, u: &NewUser) -> super::Result<UserDto> {
        validate_registration(u)?;

        if self.repo.find_by_id(u.id())?.is_some() {
            return Err(super::Error::AlreadyExists(*u.id()));
        }

        if self.repo.find_by_email(u.email())?.is_some() {
            return Err(super::Error::EmailTaken(u.email().to_owned()));
        }

        self.repo.insert(u)?;
        debug!("registered user {}", u.id());

        self.find_by_id(u.id()).await
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<UserDto> {
        if let Some(cached) = self.find_cached(id).await {
            return Ok(cached);
        }

        let dto: UserDto = self
            .repo
            .find_by_id(id)?
            .ok_or(super::Error::NotFound(*id))?
            .into();

        self.cache(&dto).await;
        Ok(dto)
    }

    async fn find_by_email(&self, email: &str) -> super::Result<UserDto> {
        self.repo
            .find_by_email(email)?
            .map(UserDto::from)
            .ok_or(super::Error::EmailNotFound(email.to_owned()))
    }

    async fn update_profile(&self, id: &Id, p: &ProfileUpdate) -> super::Result<UserDto> {
        if p.first_name().trim().is_empty() || p.last_name().trim().is_empty() {
            return Err(super::Error::BlankName);
        }

        if !self.repo.update_profile(id, p)? {
            return Err(super::Error::NotFound(*id));
        }

        self.redis.del(cache::Key::UserInfo(*id)).await;
        self.find_by_id(id).await
    }

    async fn set_online(&self, id: &Id, online: bool) -> super::Result<()> {
        if !self.repo.set_online(id, online)? {
            return Err(super::Error::NotFound(*id));
        }

        self.redis.del(cache::Key::UserInfo(*id)).await;
        self.notify_online_status_change(id, online).await;
        Ok(())
    }
}

// notifications
impl UserServiceImpl {
    async fn notify_online_status_change(&self, id: &Id, online: bool) {
        match self.friend_repo.find_by_user(id) {
            Ok(friends) => {
                let subjects = friends
                    .iter()
                    .map(|f| event::Subject::Notifications(*f.friend_id()))
                    .collect::<Vec<_>>();

                self.event_service
                    .broadcast(
                        &subjects,
                        &event::Notification::OnlineStatusChange(OnlineStatus::new(*id, online)),
                    )
                    .await;
            }
            Err(e) => {
                error!("failed to find friends of {id}: {e:?}");
            }
        }
    }
}

// cache operations
impl UserServiceImpl {
    async fn cache(&self, dto: &UserDto) {
        self.redis
            .json_set_ex(cache::Key::UserInfo(*dto.id()), dto)
            .await;
    }

    async fn find_cached(&self, id: &Id) -> Option<UserDto> {
        self.redis.json_get::<UserDto>(cache::Key::UserInfo(*id)).await
    }
}

fn validate_registration(u: &NewUser) -> super::Result<()> {
    if u.first_name().trim().is_empty() || u.last_name().trim().is_empty() {
        return Err(super::Error::BlankName);
    }

    if !EmailAddress::is_valid(u.email()) {
        return Err(super::Error::InvalidEmail(u.email().to_owned()));
    }

    Ok(())
}
