use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::Deserialize;

use crate::{auth, event, group, message};

use super::model::{Ballot, Poll, PollDto};
use super::{Id, Repository};

#[derive(Deserialize, Clone, Debug)]
pub struct PollParams {
    question: String,
    options: Vec<String>,
    group_id: Option<group::Id>,
    expires_at: Option<DateTime<Utc>>,
}

impl PollParams {
    pub fn new(
        question: impl Into<String>,
        options: &[&str],
        group_id: Option<group::Id>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            group_id,
            expires_at,
        }
    }
}

#[async_trait]
pub trait PollService {
    async fn create(&self, auth_user: &auth::User, params: &PollParams) -> super::Result<PollDto>;

    async fn find_by_id(&self, auth_user: &auth::User, id: &Id) -> super::Result<PollDto>;

    async fn find_by_group(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
    ) -> super::Result<Vec<PollDto>>;

    async fn find_public(&self, auth_user: &auth::User) -> super::Result<Vec<PollDto>>;

    async fn vote(
        &self,
        auth_user: &auth::User,
        id: &Id,
        option: usize,
    ) -> super::Result<PollDto>;

    async fn remove_vote(&self, auth_user: &auth::User, id: &Id) -> super::Result<PollDto>;

    async fn delete(&self, auth_user: &auth::User, id: &Id) -> super::Result<()>;
}

#[derive(Clone)]
pub struct PollServiceImpl {
    repo: Repository,
    group_service: group::Service,
    message_service: message::Service,
    event_service: event::Service,
}

impl PollServiceImpl {
    pub fn new(
        repo: Repository,
        group_service: group::Service,
        message_service: message::Service,
        event_service: event::Service,
    ) -> Self {
        Self {
            repo,
            group_service,
            message_service,
            event_service,
        }
    }
}

#[async_trait]
impl PollService for PollServiceImpl {
    async fn create(&self, auth_user: &auth::User, params: &PollParams) -> super::Result<PollDto> {
        if let Some(group_id) = &params.group_id {
            self.group_service
                .check_member(group_id, auth_user.id())
                .await?;
        }

        let poll = Poll::new(
            *auth_user.id(),
            params.group_id,
            &params.question,
            &params.options,
            params.expires_at,
            Utc::now(),
        )?;
        self.repo.insert(&poll)?;
        debug!("created poll {} in {:?}", poll.id(), poll.group_id());

        self.notify_updated(&poll).await;
        Ok(poll.into())
    }

    async fn find_by_id(&self, auth_user: &auth::User, id: &Id) -> super::Result<PollDto> {
        let poll = self.find(id)?;
        self.authorize(auth_user, &poll).await?;

        let poll = self.evaluate(poll, Utc::now()).await?;
        self.view(auth_user, poll)
    }

    async fn find_by_group(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
    ) -> super::Result<Vec<PollDto>> {
        self.group_service
            .check_member(group_id, auth_user.id())
            .await?;

        let polls = self.repo.find_by_group(group_id)?;
        self.evaluate_all(auth_user, polls).await
    }

    async fn find_public(&self, auth_user: &auth::User) -> super::Result<Vec<PollDto>> {
        let polls = self.repo.find_public()?;
        self.evaluate_all(auth_user, polls).await
    }

    async fn vote(
        &self,
        auth_user: &auth::User,
        id: &Id,
        option: usize,
    ) -> super::Result<PollDto> {
        let poll = self.find(id)?;
        self.authorize(auth_user, &poll).await?;

        self.evaluate(poll, Utc::now()).await?;

        let poll = self.repo.vote(id, auth_user.id(), option)?;
        self.notify_updated(&poll).await;

        let ballot = Ballot::new(*id, *auth_user.id(), option);
        Ok(PollDto::from(poll).with_vote(Some(&ballot)))
    }

    async fn remove_vote(&self, auth_user: &auth::User, id: &Id) -> super::Result<PollDto> {
        let poll = self.find(id)?;
        self.authorize(auth_user, &poll).await?;

        self.evaluate(poll, Utc::now()).await?;

        let poll = self.repo.unvote(id, auth_user.id())?;
        self.notify_updated(&poll).await;

        Ok(poll.into())
    }

    async fn delete(&self, auth_user: &auth::User, id: &Id) -> super::Result<()> {
        let poll = self.find(id)?;
        if poll.creator().ne(auth_user.id()) {
            return Err(super::Error::NotCreator);
        }

        if !self.repo.delete(id)? {
            return Err(super::Error::NotFound(*id));
        }
        debug!("deleted poll {id}");
        Ok(())
    }
}

impl PollServiceImpl {
    fn find(&self, id: &Id) -> super::Result<Poll> {
        self.repo.find_by_id(id)?.ok_or(super::Error::NotFound(*id))
    }

    async fn authorize(&self, auth_user: &auth::User, poll: &Poll) -> super::Result<()> {
        if let Some(group_id) = poll.group_id() {
            self.group_service
                .check_member(group_id, auth_user.id())
                .await?;
        }
        Ok(())
    }

    fn view(&self, auth_user: &auth::User, poll: Poll) -> super::Result<PollDto> {
        let ballot = self.repo.find_ballot(poll.id(), auth_user.id())?;
        Ok(PollDto::from(poll).with_vote(ballot.as_ref()))
    }

    async fn evaluate_all(
        &self,
        auth_user: &auth::User,
        polls: Vec<Poll>,
    ) -> super::Result<Vec<PollDto>> {
        let now = Utc::now();
        let mut dtos = Vec::with_capacity(polls.len());
        for poll in polls {
            let poll = self.evaluate(poll, now).await?;
            dtos.push(self.view(auth_user, poll)?);
        }
        Ok(dtos)
    }

    async fn evaluate(&self, poll: Poll, now: DateTime<Utc>) -> super::Result<Poll> {
        if !poll.should_close(now) {
            return Ok(poll);
        }

        match self.repo.close(poll.id())? {
            Some(closed) => {
                info!("poll {} expired", closed.id());
                self.on_closed(&closed).await;
                Ok(closed)
            }
            None => self.find(poll.id()),
        }
    }

    async fn on_closed(&self, poll: &Poll) {
        if let Some(group_id) = poll.group_id() {
            let announcement = poll.closing_announcement();
            if let Err(e) = self
                .message_service
                .post_system(group_id, &announcement)
                .await
            {
                error!("failed to announce closure of poll {}: {e:?}", poll.id());
            }
        }

        let notification = event::Notification::PollClosed {
            poll_id: *poll.id(),
            winner: poll.winner().map(|(option, _)| option.to_owned()),
        };
        let subjects = self.subjects(poll).await;
        self.event_service.broadcast(&subjects, &notification).await;
    }

    async fn notify_updated(&self, poll: &Poll) {
        let notification = event::Notification::PollUpdated {
            poll: poll.clone().into(),
        };
        let subjects = self.subjects(poll).await;
        self.event_service.broadcast(&subjects, &notification).await;
    }

    async fn subjects(&self, poll: &Poll) -> Vec<event::Subject> {
        let Some(group_id) = poll.group_id() else {
            return vec![event::Subject::Notifications(*poll.creator())];
        };

        match self.group_service.find_participants(group_id).await {
            Ok(participants) => participants
                .into_iter()
                .map(event::Subject::Notifications)
                .collect(),
            Err(e) => {
                error!("failed to find participants of group {group_id}: {e:?}");
                vec![]
            }
        }
    }
}
