use async_trait::async_trait;
use log::debug;

use crate::{auth, event, user};

use super::model::{Friend, consistency};
use super::{Consistency, Repository};

#[async_trait]
pub trait FriendService {
    async fn add(&self, auth_user: &auth::User, email: &str) -> super::Result<Friend>;

    async fn remove(&self, auth_user: &auth::User, friend_id: &user::Id) -> super::Result<()>;

    async fn find_all(&self, auth_user: &auth::User) -> super::Result<Vec<Friend>>;

    async fn check(&self, auth_user: &auth::User, peer: &user::Id) -> super::Result<Consistency>;
}

#[derive(Clone)]
pub struct FriendServiceImpl {
    repo: Repository,
    user_repo: user::Repository,
    event_service: event::Service,
}

impl FriendServiceImpl {
    pub fn new(repo: Repository, user_repo: user::Repository, event_service: event::Service) -> Self {
        Self {
            repo,
            user_repo,
            event_service,
        }
    }
}

#[async_trait]
impl FriendService for FriendServiceImpl {
    async fn add(&self, auth_user: &auth::User, email: &str) -> super::Result<Friend> {
        let me = self
            .user_repo
            .find_by_id(auth_user.id())?
            .ok_or(user::Error::NotFound(*auth_user.id()))?;

        let peer = self
            .user_repo
            .find_by_email(email)?
            .ok_or(super::Error::UnknownEmail(email.to_owned()))?;

        if me.id() == peer.id() {
            return Err(super::Error::SelfReference);
        }

        let forward = self.repo.find(me.id(), peer.id())?;
        let backward = self.repo.find(peer.id(), me.id())?;
        match consistency(forward.as_ref(), backward.as_ref()) {
            Consistency::Friends => return Err(super::Error::AlreadyFriends(*peer.id())),
            Consistency::Inconsistent => {
                debug!("repairing half-linked friendship {} <-> {}", me.id(), peer.id());
                self.repo.delete_pair(me.id(), peer.id())?;
            }
            Consistency::Strangers => {}
        }

        let pair = Friend::pair((*me.id(), me.email()), (*peer.id(), peer.email()));
        self.repo.insert_pair(&pair)?;
        let [mine, theirs] = pair;

        self.event_service
            .publish(
                &event::Subject::Notifications(*peer.id()),
                &event::Notification::FriendAdded { friend: theirs },
            )
            .await;

        Ok(mine)
    }

    async fn remove(&self, auth_user: &auth::User, friend_id: &user::Id) -> super::Result<()> {
        let deleted = self.repo.delete_pair(auth_user.id(), friend_id)?;
        if deleted == 0 {
            return Err(super::Error::NotFound(*friend_id));
        }

        self.event_service
            .publish(
                &event::Subject::Notifications(*friend_id),
                &event::Notification::FriendRemoved {
                    friend_id: *auth_user.id(),
                },
            )
            .await;

        Ok(())
    }

    async fn find_all(&self, auth_user: &auth::User) -> super::Result<Vec<Friend>> {
        self.repo.find_by_user(auth_user.id())
    }

    async fn check(&self, auth_user: &auth::User, peer: &user::Id) -> super::Result<Consistency> {
        let forward = self.repo.find(auth_user.id(), peer)?;
        let backward = self.repo.find(peer, auth_user.id())?;
        Ok(consistency(forward.as_ref(), backward.as_ref()))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::event::service::test::RecordingEventService;
    use crate::friend::Error;
    use crate::friend::repository::FriendRepository;
    use crate::friend::repository::test::InMemoryFriendRepository;
    use crate::user::model::NewUser;
    use crate::user::repository::test::InMemoryUserRepository;

    use super::*;

    struct Fixture {
        repo: Arc<InMemoryFriendRepository>,
        events: Arc<RecordingEventService>,
        service: FriendServiceImpl,
        jora: auth::User,
        valera: auth::User,
    }

    fn fixture() -> Fixture {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let users = InMemoryUserRepository::with(&[
            NewUser::new(jora, "Jora", "Kardan", "jora@voyage.io", None),
            NewUser::new(valera, "Valera", "Kardan", "valera@voyage.io", None),
        ]);

        let repo = Arc::new(InMemoryFriendRepository::default());
        let events = Arc::new(RecordingEventService::default());
        let service = FriendServiceImpl::new(repo.clone(), Arc::new(users), events.clone());

        Fixture {
            repo,
            events,
            service,
            jora: auth::User::new(jora),
            valera: auth::User::new(valera),
        }
    }

    #[tokio::test]
    async fn should_add_both_sides_and_notify_peer() {
        let f = fixture();

        let mine = f.service.add(&f.jora, "valera@voyage.io").await.unwrap();

        assert_eq!(mine.user_id(), f.jora.id());
        assert_eq!(mine.friend_id(), f.valera.id());
        assert_eq!(
            f.service.check(&f.valera, f.jora.id()).await.unwrap(),
            Consistency::Friends
        );

        let published = f.events.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, event::Subject::Notifications(*f.valera.id()));
        assert!(matches!(
            &published[0].1,
            event::Notification::FriendAdded { friend } if friend.friend_id() == f.jora.id()
        ));
    }

    #[tokio::test]
    async fn should_not_befriend_oneself() {
        let f = fixture();

        let actual = f.service.add(&f.jora, "jora@voyage.io").await;

        assert!(matches!(actual, Err(Error::SelfReference)));
    }

    #[tokio::test]
    async fn should_reject_unknown_email() {
        let f = fixture();

        let actual = f.service.add(&f.jora, "radu@voyage.io").await;

        assert!(matches!(actual, Err(Error::UnknownEmail(e)) if e == "radu@voyage.io"));
    }

    #[tokio::test]
    async fn should_not_add_twice() {
        let f = fixture();
        f.service.add(&f.jora, "valera@voyage.io").await.unwrap();

        let actual = f.service.add(&f.valera, "jora@voyage.io").await;

        assert!(matches!(actual, Err(Error::AlreadyFriends(id)) if id == *f.jora.id()));
    }

    #[tokio::test]
    async fn should_repair_half_linked_friendship() {
        let f = fixture();
        f.repo
            .insert_one(Friend::new(*f.jora.id(), *f.valera.id(), "valera@voyage.io"));
        assert_eq!(
            f.service.check(&f.jora, f.valera.id()).await.unwrap(),
            Consistency::Inconsistent
        );

        f.service.add(&f.jora, "valera@voyage.io").await.unwrap();

        assert_eq!(
            f.service.check(&f.jora, f.valera.id()).await.unwrap(),
            Consistency::Friends
        );
        assert_eq!(f.service.find_all(&f.jora).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_remove_both_sides() {
        let f = fixture();
        f.service.add(&f.jora, "valera@voyage.io").await.unwrap();

        f.service.remove(&f.valera, f.jora.id()).await.unwrap();

        assert!(f.repo.find_by_user(f.jora.id()).unwrap().is_empty());
        assert!(f.repo.find_by_user(f.valera.id()).unwrap().is_empty());
        assert!(matches!(
            f.events.published().last(),
            Some((_, event::Notification::FriendRemoved { friend_id })) if friend_id == f.valera.id()
        ));
    }

    #[tokio::test]
    async fn should_not_remove_stranger() {
        let f = fixture();

        let actual = f.service.remove(&f.jora, f.valera.id()).await;

        assert!(matches!(actual, Err(Error::NotFound(id)) if id == *f.valera.id()));
    }
}
