use chrono::Utc;
use diesel::Connection;
use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::PgConnection;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::r2d2::ConnectionManager;

use crate::schema::{poll_votes, polls};
use crate::{group, user};

use super::Id;
use super::model::{Ballot, Poll};

pub trait PollRepository {
    fn insert(&self, poll: &Poll) -> super::Result<()>;

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Poll>>;

    fn find_by_group(&self, group_id: &group::Id) -> super::Result<Vec<Poll>>;

    fn find_public(&self) -> super::Result<Vec<Poll>>;

    fn find_ballot(&self, id: &Id, user_id: &user::Id) -> super::Result<Option<Ballot>>;

    fn vote(&self, id: &Id, user_id: &user::Id, option: usize) -> super::Result<Poll>;

    fn unvote(&self, id: &Id, user_id: &user::Id) -> super::Result<Poll>;

    /// `None` when the poll was already closed by someone else.
    fn close(&self, id: &Id) -> super::Result<Option<Poll>>;

    fn delete(&self, id: &Id) -> super::Result<bool>;
}

pub struct PgPollRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgPollRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

fn lock_poll(conn: &mut PgConnection, id: &Id) -> super::Result<Poll> {
    polls::table
        .find(id)
        .select(Poll::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(super::Error::NotFound(*id))
}

fn find_ballot(conn: &mut PgConnection, id: &Id, user_id: &user::Id) -> super::Result<Option<Ballot>> {
    let ballot = poll_votes::table
        .find((id, user_id))
        .select(Ballot::as_select())
        .first(conn)
        .optional()?;

    Ok(ballot)
}

impl PollRepository for PgPollRepository {
    fn insert(&self, poll: &Poll) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(polls::table)
            .values(poll)
            .execute(&mut conn)?;

        Ok(())
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Poll>> {
        let mut conn = self.pool.get()?;

        let poll = polls::table
            .find(id)
            .select(Poll::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(poll)
    }

    fn find_by_group(&self, group_id: &group::Id) -> super::Result<Vec<Poll>> {
        let mut conn = self.pool.get()?;

        let polls = polls::table
            .filter(polls::group_id.eq(group_id))
            .order(polls::created_at.desc())
            .select(Poll::as_select())
            .load(&mut conn)?;

        Ok(polls)
    }

    fn find_public(&self) -> super::Result<Vec<Poll>> {
        let mut conn = self.pool.get()?;

        let polls = polls::table
            .filter(polls::group_id.is_null())
            .order(polls::created_at.desc())
            .select(Poll::as_select())
            .load(&mut conn)?;

        Ok(polls)
    }

    fn find_ballot(&self, id: &Id, user_id: &user::Id) -> super::Result<Option<Ballot>> {
        let mut conn = self.pool.get()?;
        find_ballot(&mut conn, id, user_id)
    }

    fn vote(&self, id: &Id, user_id: &user::Id, option: usize) -> super::Result<Poll> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, super::Error, _>(|conn| {
            let mut poll = lock_poll(conn, id)?;
            let prior = find_ballot(conn, id, user_id)?;

            poll.cast_vote(option, prior.as_ref(), Utc::now())?;

            diesel::update(polls::table.find(id))
                .set(polls::votes.eq(poll.votes().to_vec()))
                .execute(conn)?;
            diesel::insert_into(poll_votes::table)
                .values(&Ballot::new(*id, *user_id, option))
                .execute(conn)?;

            Ok(poll)
        })
    }

    fn unvote(&self, id: &Id, user_id: &user::Id) -> super::Result<Poll> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, super::Error, _>(|conn| {
            let mut poll = lock_poll(conn, id)?;
            let prior = find_ballot(conn, id, user_id)?;

            poll.remove_vote(prior.as_ref(), Utc::now())?;

            diesel::update(polls::table.find(id))
                .set(polls::votes.eq(poll.votes().to_vec()))
                .execute(conn)?;
            diesel::delete(poll_votes::table.find((id, user_id))).execute(conn)?;

            Ok(poll)
        })
    }

    fn close(&self, id: &Id) -> super::Result<Option<Poll>> {
        let mut conn = self.pool.get()?;

        let closed = diesel::update(
            polls::table
                .filter(polls::id.eq(id))
                .filter(polls::closed.eq(false)),
        )
        .set(polls::closed.eq(true))
        .returning(Poll::as_returning())
        .get_result(&mut conn)
        .optional()?;

        Ok(closed)
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(polls::table.find(id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryPollRepository {
        polls: Mutex<HashMap<Id, Poll>>,
        ballots: Mutex<HashMap<(Id, user::Id), Ballot>>,
    }

    impl PollRepository for InMemoryPollRepository {
        fn insert(&self, poll: &Poll) -> crate::poll::Result<()> {
            self.polls.lock().unwrap().insert(*poll.id(), poll.clone());
            Ok(())
        }

        fn find_by_id(&self, id: &Id) -> crate::poll::Result<Option<Poll>> {
            Ok(self.polls.lock().unwrap().get(id).cloned())
        }

        fn find_by_group(&self, group_id: &group::Id) -> crate::poll::Result<Vec<Poll>> {
            let polls = self.polls.lock().unwrap();
            Ok(polls
                .values()
                .filter(|p| p.group_id() == Some(group_id))
                .cloned()
                .collect())
        }

        fn find_public(&self) -> crate::poll::Result<Vec<Poll>> {
            let polls = self.polls.lock().unwrap();
            Ok(polls
                .values()
                .filter(|p| p.group_id().is_none())
                .cloned()
                .collect())
        }

        fn find_ballot(&self, id: &Id, user_id: &user::Id) -> crate::poll::Result<Option<Ballot>> {
            Ok(self.ballots.lock().unwrap().get(&(*id, *user_id)).cloned())
        }

        fn vote(&self, id: &Id, user_id: &user::Id, option: usize) -> crate::poll::Result<Poll> {
            let mut polls = self.polls.lock().unwrap();
            let mut ballots = self.ballots.lock().unwrap();
            let poll = polls
                .get_mut(id)
                .ok_or(crate::poll::Error::NotFound(*id))?;

            poll.cast_vote(option, ballots.get(&(*id, *user_id)), Utc::now())?;
            ballots.insert((*id, *user_id), Ballot::new(*id, *user_id, option));

            Ok(poll.clone())
        }

        fn unvote(&self, id: &Id, user_id: &user::Id) -> crate::poll::Result<Poll> {
            let mut polls = self.polls.lock().unwrap();
            let mut ballots = self.ballots.lock().unwrap();
            let poll = polls
                .get_mut(id)
                .ok_or(crate::poll::Error::NotFound(*id))?;

            poll.remove_vote(ballots.get(&(*id, *user_id)), Utc::now())?;
            ballots.remove(&(*id, *user_id));

            Ok(poll.clone())
        }

        fn close(&self, id: &Id) -> crate::poll::Result<Option<Poll>> {
            let mut polls = self.polls.lock().unwrap();
            match polls.get_mut(id) {
                Some(p) if !p.closed() => {
                    p.close();
                    Ok(Some(p.clone()))
                }
                _ => Ok(None),
            }
        }

        fn delete(&self, id: &Id) -> crate::poll::Result<bool> {
            self.ballots.lock().unwrap().retain(|(poll_id, _), _| poll_id != id);
            Ok(self.polls.lock().unwrap().remove(id).is_some())
        }
    }
}

#[cfg(test)]
mod pg_test {
    use chrono::Duration;

    use crate::group::model::NewGroup;
    use crate::integration::db::test::TestContainer;
    use crate::integration::db::Pool;
    use crate::poll::Error;
    use crate::schema::{groups, users};
    use crate::user::model::NewUser;

    use super::*;

    fn insert_user(pool: &Pool) -> user::Id {
        let id = user::Id::random();
        let mut conn = pool.get().unwrap();
        diesel::insert_into(users::table)
            .values(&NewUser::new(id, "First", "Last", &format!("{id}@voyage.io"), None))
            .execute(&mut conn)
            .unwrap();
        id
    }

    fn insert_poll(pool: &Pool, creator: user::Id) -> Poll {
        let group = NewGroup::new("Trip", "", creator, &[], None);
        let mut conn = pool.get().unwrap();
        diesel::insert_into(groups::table)
            .values(&group)
            .execute(&mut conn)
            .unwrap();

        Poll::new(
            creator,
            Some(*group.id()),
            "Where to?",
            &["Lisbon".to_string(), "Porto".to_string()],
            Some(Utc::now() + Duration::hours(1)),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_vote_and_unvote() {
        let tc = TestContainer::init().await;
        let repo = PgPollRepository::new(tc.pool.clone());
        let jora = insert_user(&tc.pool);
        let poll = insert_poll(&tc.pool, jora);
        repo.insert(&poll).unwrap();

        let voted = repo.vote(poll.id(), &jora, 1).unwrap();
        assert_eq!(voted.votes(), &[0, 1]);
        assert_eq!(
            repo.find_ballot(poll.id(), &jora).unwrap().map(|b| b.option()),
            Some(1)
        );

        let again = repo.vote(poll.id(), &jora, 0);
        assert!(matches!(again, Err(Error::AlreadyVoted)));

        let unvoted = repo.unvote(poll.id(), &jora).unwrap();
        assert_eq!(unvoted.votes(), &[0, 0]);
        assert!(repo.find_ballot(poll.id(), &jora).unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_close_only_once() {
        let tc = TestContainer::init().await;
        let repo = PgPollRepository::new(tc.pool.clone());
        let jora = insert_user(&tc.pool);
        let poll = insert_poll(&tc.pool, jora);
        repo.insert(&poll).unwrap();

        let voter = insert_user(&tc.pool);
        repo.vote(poll.id(), &voter, 1).unwrap();

        let closed = repo.close(poll.id()).unwrap().unwrap();
        assert!(closed.closed());
        assert_eq!(closed.votes(), &[0, 1]);

        assert!(repo.close(poll.id()).unwrap().is_none());
        assert!(repo.find_by_id(poll.id()).unwrap().unwrap().closed());
    }
}
