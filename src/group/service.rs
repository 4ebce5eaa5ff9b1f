use std::collections::HashSet;

use async_trait::async_trait;
use identicon_rs::Identicon;
use log::{debug, warn};
use serde::Deserialize;

use crate::integration::cache;
use crate::{auth, event, user};

use super::model::{Group, GroupUpdate, NewGroup};
use super::{Id, Repository};

#[derive(Deserialize, Clone, Debug)]
pub struct GroupParams {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    participants: Vec<user::Id>,
    icon: Option<String>,
}

impl GroupParams {
    pub fn new(name: impl Into<String>, participants: Vec<user::Id>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            participants,
            icon: None,
        }
    }
}

pub enum Icon {
    Link(String),
    Png(Vec<u8>),
}

#[async_trait]
pub trait GroupService {
    async fn create(&self, auth_user: &auth::User, params: &GroupParams) -> super::Result<Group>;

    async fn find_by_id(&self, auth_user: &auth::User, id: &Id) -> super::Result<Group>;

    async fn find_all(&self, auth_user: &auth::User) -> super::Result<Vec<Group>>;

    async fn update(
        &self,
        auth_user: &auth::User,
        id: &Id,
        update: &GroupUpdate,
    ) -> super::Result<Group>;

    async fn add_participant(
        &self,
        auth_user: &auth::User,
        id: &Id,
        user_id: &user::Id,
    ) -> super::Result<Group>;

    async fn remove_participant(
        &self,
        auth_user: &auth::User,
        id: &Id,
        user_id: &user::Id,
    ) -> super::Result<Group>;

    async fn delete(&self, auth_user: &auth::User, id: &Id) -> super::Result<()>;

    async fn icon(&self, auth_user: &auth::User, id: &Id) -> super::Result<Icon>;

    async fn find_participants(&self, id: &Id) -> super::Result<HashSet<user::Id>>;

    async fn check_member(&self, id: &Id, user_id: &user::Id) -> super::Result<()> {
        let participants = self.find_participants(id).await?;
        if participants.contains(user_id) {
            Ok(())
        } else {
            Err(super::Error::NotMember)
        }
    }
}

#[derive(Clone)]
pub struct GroupServiceImpl {
    repo: Repository,
    user_repo: user::Repository,
    event_service: event::Service,
    redis: cache::Redis,
}

impl GroupServiceImpl {
    pub fn new(
        repo: Repository,
        user_repo: user::Repository,
        event_service: event::Service,
        redis: cache::Redis,
    ) -> Self {
        Self {
            repo,
            user_repo,
            event_service,
            redis,
        }
    }
}

#[async_trait]
impl GroupService for GroupServiceImpl {
    async fn create(&self, auth_user: &auth::User, params: &GroupParams) -> super::Result<Group> {
        if params.name.trim().is_empty() {
            return Err(super::Error::BlankName);
        }

        let new_group = NewGroup::new(
            params.name.trim(),
            params.description.trim(),
            *auth_user.id(),
            &params.participants,
            params.icon.clone(),
        );
        self.ensure_users_exist(new_group.participants())?;

        self.repo.insert(&new_group)?;
        debug!("created group {} '{}'", new_group.id(), new_group.name());

        let group = Group::from(new_group);
        self.notify(&group, &event::Notification::GroupUpdated { group: group.clone() })
            .await;
        Ok(group)
    }

    async fn find_by_id(&self, auth_user: &auth::User, id: &Id) -> super::Result<Group> {
        let group = self.find(id)?;
        if !group.is_participant(auth_user.id()) {
            return Err(super::Error::NotMember);
        }
        Ok(group)
    }

    async fn find_all(&self, auth_user: &auth::User) -> super::Result<Vec<Group>> {
        self.repo.find_by_participant(auth_user.id())
    }

    async fn update(
        &self,
        auth_user: &auth::User,
        id: &Id,
        update: &GroupUpdate,
    ) -> super::Result<Group> {
        let mut group = self.find_by_id(auth_user, id).await?;
        if update.name().is_some_and(|n| n.trim().is_empty()) {
            return Err(super::Error::BlankName);
        }
        if update.is_empty() {
            return Ok(group);
        }

        group.apply(update);
        self.repo.update(id, update)?;

        self.notify(&group, &event::Notification::GroupUpdated { group: group.clone() })
            .await;
        Ok(group)
    }

    async fn add_participant(
        &self,
        auth_user: &auth::User,
        id: &Id,
        user_id: &user::Id,
    ) -> super::Result<Group> {
        let mut group = self.find_by_id(auth_user, id).await?;
        self.ensure_users_exist(&[*user_id])?;

        group.add_participant(*user_id)?;
        self.repo.set_participants(id, group.participants())?;
        self.redis.del(cache::Key::Participants(*id)).await;

        self.notify(&group, &event::Notification::GroupUpdated { group: group.clone() })
            .await;
        Ok(group)
    }

    async fn remove_participant(
        &self,
        auth_user: &auth::User,
        id: &Id,
        user_id: &user::Id,
    ) -> super::Result<Group> {
        let mut group = self.find(id)?;

        group.remove_participant(user_id, auth_user.id())?;
        self.repo.set_participants(id, group.participants())?;
        self.redis.del(cache::Key::Participants(*id)).await;

        let notification = event::Notification::GroupUpdated {
            group: group.clone(),
        };
        self.notify(&group, &notification).await;
        self.event_service
            .publish(&event::Subject::Notifications(*user_id), &notification)
            .await;
        Ok(group)
    }

    async fn delete(&self, auth_user: &auth::User, id: &Id) -> super::Result<()> {
        let group = self.find_by_id(auth_user, id).await?;
        if !group.is_creator(auth_user.id()) {
            return Err(super::Error::NotCreator);
        }

        if !self.repo.delete(id)? {
            return Err(super::Error::NotFound(*id));
        }
        self.redis.del(cache::Key::Participants(*id)).await;
        debug!("deleted group {id}");

        self.notify(&group, &event::Notification::GroupDeleted { group_id: *id })
            .await;
        Ok(())
    }

    async fn icon(&self, auth_user: &auth::User, id: &Id) -> super::Result<Icon> {
        let group = self.find_by_id(auth_user, id).await?;
        if let Some(link) = group.icon() {
            return Ok(Icon::Link(link.to_owned()));
        }

        Identicon::new(&id.to_string())
            .export_png_data()
            .map(Icon::Png)
            .map_err(|e| super::Error::Icon(e.to_string()))
    }

    async fn find_participants(&self, id: &Id) -> super::Result<HashSet<user::Id>> {
        let cache_key = cache::Key::Participants(*id);
        if let Some(members) = self.redis.smembers::<HashSet<user::Id>>(cache_key.clone()).await {
            if !members.is_empty() {
                return Ok(members);
            }
        }

        let group = self.find(id)?;
        let members = group.participants().iter().copied().collect::<HashSet<_>>();

        self.redis
            .sadd(cache_key.clone(), group.participants().to_vec())
            .await;
        self.redis.expire(cache_key).await;

        Ok(members)
    }
}

impl GroupServiceImpl {
    fn find(&self, id: &Id) -> super::Result<Group> {
        self.repo.find_by_id(id)?.ok_or(super::Error::NotFound(*id))
    }

    fn ensure_users_exist(&self, ids: &[user::Id]) -> super::Result<()> {
        let found = self.user_repo.find_by_ids(ids)?;
        match ids.iter().find(|id| !found.iter().any(|u| u.id() == *id)) {
            Some(missing) => {
                warn!("group participant {missing} does not exist");
                Err(super::Error::UnknownUser(*missing))
            }
            None => Ok(()),
        }
    }

    async fn notify(&self, group: &Group, notification: &event::Notification) {
        let subjects = group
            .participants()
            .iter()
            .map(|p| event::Subject::Notifications(*p))
            .collect::<Vec<_>>();

        self.event_service.broadcast(&subjects, notification).await;
    }
}
