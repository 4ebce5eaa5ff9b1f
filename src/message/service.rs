use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::{auth, event, group, user};

use super::Repository;
use super::model::Message;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[async_trait]
pub trait MessageService {
    async fn send(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        text: &str,
    ) -> super::Result<Message>;

    async fn post_system(&self, group_id: &group::Id, text: &str) -> super::Result<Message>;

    async fn find_by_group(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        limit: Option<i64>,
        before: Option<DateTime<Utc>>,
    ) -> super::Result<Vec<Message>>;
}

#[derive(Clone)]
pub struct MessageServiceImpl {
    repo: Repository,
    group_service: group::Service,
    event_service: event::Service,
}

impl MessageServiceImpl {
    pub fn new(
        repo: Repository,
        group_service: group::Service,
        event_service: event::Service,
    ) -> Self {
        Self {
            repo,
            group_service,
            event_service,
        }
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn send(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        text: &str,
    ) -> super::Result<Message> {
        if text.trim().is_empty() {
            return Err(super::Error::EmptyText);
        }
        self.group_service
            .check_member(group_id, auth_user.id())
            .await?;

        let msg = Message::new(*group_id, auth_user.id(), text);
        self.repo.insert(&msg)?;

        self.notify(&msg, Some(auth_user.id())).await;
        Ok(msg)
    }

    async fn post_system(&self, group_id: &group::Id, text: &str) -> super::Result<Message> {
        if text.trim().is_empty() {
            return Err(super::Error::EmptyText);
        }

        let msg = Message::system(*group_id, text);
        self.repo.insert(&msg)?;
        debug!("posted system message to group {group_id}");

        self.notify(&msg, None).await;
        Ok(msg)
    }

    async fn find_by_group(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        limit: Option<i64>,
        before: Option<DateTime<Utc>>,
    ) -> super::Result<Vec<Message>> {
        self.group_service
            .check_member(group_id, auth_user.id())
            .await?;

        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        self.repo.find_by_group(group_id, limit, before)
    }
}

impl MessageServiceImpl {
    async fn notify(&self, msg: &Message, skip: Option<&user::Id>) {
        let participants = match self.group_service.find_participants(msg.group_id()).await {
            Ok(participants) => participants,
            Err(e) => {
                error!("failed to notify participants of group {}: {e:?}", msg.group_id());
                return;
            }
        };

        let subjects = participants
            .into_iter()
            .filter(|p| Some(p) != skip)
            .map(event::Subject::Notifications)
            .collect::<Vec<_>>();

        self.event_service
            .broadcast(
                &subjects,
                &event::Notification::NewMessage {
                    message: msg.clone(),
                },
            )
            .await;
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingMessageService {
        posted: Mutex<Vec<Message>>,
    }

    impl RecordingMessageService {
        pub fn posted(&self) -> Vec<Message> {
            self.posted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageService for RecordingMessageService {
        async fn send(
            &self,
            auth_user: &auth::User,
            group_id: &group::Id,
            text: &str,
        ) -> crate::message::Result<Message> {
            let msg = Message::new(*group_id, auth_user.id(), text);
            self.posted.lock().unwrap().push(msg.clone());
            Ok(msg)
        }

        async fn post_system(
            &self,
            group_id: &group::Id,
            text: &str,
        ) -> crate::message::Result<Message> {
            let msg = Message::system(*group_id, text);
            self.posted.lock().unwrap().push(msg.clone());
            Ok(msg)
        }

        async fn find_by_group(
            &self,
            _: &auth::User,
            group_id: &group::Id,
            _: Option<i64>,
            _: Option<DateTime<Utc>>,
        ) -> crate::message::Result<Vec<Message>> {
            let posted = self.posted.lock().unwrap();
            Ok(posted
                .iter()
                .filter(|m| m.group_id() == group_id)
                .cloned()
                .collect())
        }
    }

    mod service {
        use std::collections::HashSet;
        use std::sync::Arc;

        use crate::event::service::test::RecordingEventService;
        use crate::group::service::test::FakeGroupService;
        use crate::message::Error;
        use crate::message::repository::test::InMemoryMessageRepository;

        use super::super::*;

        struct Fixture {
            repo: Arc<InMemoryMessageRepository>,
            events: Arc<RecordingEventService>,
            service: MessageServiceImpl,
            group_id: group::Id,
            jora: auth::User,
            valera: auth::User,
            radu: auth::User,
        }

        fn fixture_with(configure: impl FnOnce(&mut FakeGroupService)) -> Fixture {
            let [jora, valera, radu] = [(); 3].map(|_| auth::User::new(user::Id::random()));
            let mut groups = FakeGroupService::default();
            let group_id = groups.add_group(*jora.id(), &[*valera.id(), *radu.id()]);
            configure(&mut groups);

            let repo = Arc::new(InMemoryMessageRepository::default());
            let events = Arc::new(RecordingEventService::default());
            let service = MessageServiceImpl::new(repo.clone(), Arc::new(groups), events.clone());

            Fixture {
                repo,
                events,
                service,
                group_id,
                jora,
                valera,
                radu,
            }
        }

        fn fixture() -> Fixture {
            fixture_with(|_| {})
        }

        fn recipients(events: &RecordingEventService) -> HashSet<user::Id> {
            events
                .published()
                .into_iter()
                .map(|(event::Subject::Notifications(id), _)| id)
                .collect()
        }

        #[tokio::test]
        async fn should_send_to_other_participants() {
            let f = fixture();

            let msg = f
                .service
                .send(&f.jora, &f.group_id, " boarding at 7 ")
                .await
                .unwrap();

            assert_eq!(msg.text(), "boarding at 7");
            assert_eq!(msg.sender(), Some(f.jora.id()));
            assert_eq!(
                recipients(&f.events),
                HashSet::from([*f.valera.id(), *f.radu.id()])
            );
        }

        #[tokio::test]
        async fn should_reject_outsider() {
            let f = fixture();
            let outsider = auth::User::new(user::Id::random());

            let actual = f.service.send(&outsider, &f.group_id, "hi").await;

            assert!(matches!(
                actual,
                Err(Error::_Group(crate::group::Error::NotMember))
            ));
            assert_eq!(f.repo.count(), 0);
        }

        #[tokio::test]
        async fn should_reject_empty_text() {
            let f = fixture();

            let actual = f.service.send(&f.jora, &f.group_id, " \n ").await;

            assert!(matches!(actual, Err(Error::EmptyText)));
            assert_eq!(f.repo.count(), 0);
        }

        #[tokio::test]
        async fn should_post_system_message_to_everyone() {
            let f = fixture();

            let msg = f
                .service
                .post_system(&f.group_id, "Poll closed")
                .await
                .unwrap();

            assert!(msg.is_system());
            assert_eq!(
                recipients(&f.events),
                HashSet::from([*f.jora.id(), *f.valera.id(), *f.radu.id()])
            );
        }

        #[tokio::test]
        async fn should_keep_sent_message_when_participant_lookup_fails() {
            let f = fixture_with(FakeGroupService::fail_participant_lookup);

            let actual = f.service.send(&f.jora, &f.group_id, "hi").await;

            assert!(actual.is_ok());
            assert_eq!(f.repo.count(), 1);
            assert!(f.events.published().is_empty());
        }

        #[tokio::test]
        async fn should_return_latest_messages_oldest_first() {
            let f = fixture();
            for text in ["one", "two", "three"] {
                f.service.send(&f.jora, &f.group_id, text).await.unwrap();
            }

            let latest = f
                .service
                .find_by_group(&f.valera, &f.group_id, Some(2), None)
                .await
                .unwrap();

            let texts = latest.iter().map(|m| m.text()).collect::<Vec<_>>();
            assert_eq!(texts, vec!["two", "three"]);

            let outsider = auth::User::new(user::Id::random());
            let hidden = f
                .service
                .find_by_group(&outsider, &f.group_id, None, None)
                .await;
            assert!(hidden.is_err());
        }
    }
}
