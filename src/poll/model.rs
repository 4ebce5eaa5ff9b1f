use chrono::{DateTime, Utc};
use diesel::prelude::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::{group, user};

use super::Id;

#[derive(Queryable, Selectable, Identifiable, Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::polls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Poll {
    id: Id,
    group_id: Option<group::Id>,
    creator: user::Id,
    question: String,
    options: Vec<String>,
    votes: Vec<i32>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    closed: bool,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::poll_votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ballot {
    poll_id: Id,
    user_id: user::Id,
    option_index: i32,
}

impl Ballot {
    pub fn new(poll_id: Id, user_id: user::Id, option: usize) -> Self {
        Self {
            poll_id,
            user_id,
            option_index: option as i32,
        }
    }

    pub const fn user_id(&self) -> &user::Id {
        &self.user_id
    }

    pub fn option(&self) -> usize {
        self.option_index as usize
    }
}

impl Poll {
    pub fn new(
        creator: user::Id,
        group_id: Option<group::Id>,
        question: &str,
        options: &[String],
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> super::Result<Self> {
        let question = question.trim();
        if question.is_empty() {
            return Err(super::Error::EmptyQuestion);
        }

        let options = options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();
        if options.len() < 2 {
            return Err(super::Error::TooFewOptions);
        }

        if expires_at.is_some_and(|e| e <= now) {
            return Err(super::Error::PastExpiration);
        }

        Ok(Self {
            id: Id::random(),
            group_id,
            creator,
            question: question.to_owned(),
            votes: vec![0; options.len()],
            options,
            created_at: now,
            expires_at,
            closed: false,
        })
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn group_id(&self) -> Option<&group::Id> {
        self.group_id.as_ref()
    }

    pub const fn creator(&self) -> &user::Id {
        &self.creator
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn votes(&self) -> &[i32] {
        &self.votes
    }

    pub const fn closed(&self) -> bool {
        self.closed
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now > e)
    }

    pub fn should_close(&self, now: DateTime<Utc>) -> bool {
        !self.closed && self.is_expired(now)
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    fn ensure_open(&self, now: DateTime<Utc>) -> super::Result<()> {
        if self.closed || self.is_expired(now) {
            return Err(super::Error::Closed(self.id));
        }
        Ok(())
    }

    pub fn cast_vote(
        &mut self,
        option: usize,
        prior: Option<&Ballot>,
        now: DateTime<Utc>,
    ) -> super::Result<()> {
        self.ensure_open(now)?;
        if option >= self.options.len() {
            return Err(super::Error::InvalidOption(option));
        }
        if prior.is_some() {
            return Err(super::Error::AlreadyVoted);
        }

        self.votes[option] += 1;
        Ok(())
    }

    pub fn remove_vote(&mut self, prior: Option<&Ballot>, now: DateTime<Utc>) -> super::Result<()> {
        self.ensure_open(now)?;
        let ballot = prior.ok_or(super::Error::NotVoted)?;

        if let Some(count) = self.votes.get_mut(ballot.option()) {
            *count = (*count - 1).max(0);
        }
        Ok(())
    }

    pub fn winner(&self) -> Option<(&str, i32)> {
        let mut best: Option<(usize, i32)> = None;
        for (i, count) in self.votes.iter().enumerate().take(self.options.len()) {
            if best.is_none_or(|(_, top)| *count > top) {
                best = Some((i, *count));
            }
        }
        best.map(|(i, count)| (self.options[i].as_str(), count))
    }

    pub fn closing_announcement(&self) -> String {
        match self.winner() {
            Some((option, count)) => format!(
                "Poll \"{}\" has ended. Winning option: \"{option}\" ({count} {})",
                self.question,
                if count == 1 { "vote" } else { "votes" }
            ),
            None => format!("Poll \"{}\" has ended.", self.question),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PollDto {
    id: Id,
    group_id: Option<group::Id>,
    creator: user::Id,
    question: String,
    options: Vec<String>,
    votes: Vec<i32>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    closed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    my_vote: Option<usize>,
}

impl PollDto {
    pub fn with_vote(mut self, ballot: Option<&Ballot>) -> Self {
        self.my_vote = ballot.map(Ballot::option);
        self
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn votes(&self) -> &[i32] {
        &self.votes
    }

    pub const fn closed(&self) -> bool {
        self.closed
    }

    pub const fn my_vote(&self) -> Option<usize> {
        self.my_vote
    }
}

impl From<Poll> for PollDto {
    fn from(p: Poll) -> Self {
        Self {
            id: p.id,
            group_id: p.group_id,
            creator: p.creator,
            question: p.question,
            options: p.options,
            votes: p.votes,
            created_at: p.created_at,
            expires_at: p.expires_at,
            closed: p.closed,
            my_vote: None,
        }
    }
}
