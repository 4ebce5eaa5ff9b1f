use chrono::{DateTime, Utc};
use diesel::ExpressionMethods;
use diesel::PgConnection;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::r2d2::ConnectionManager;

use crate::group;
use crate::schema::messages;

use super::model::Message;

pub trait MessageRepository {
    fn insert(&self, msg: &Message) -> super::Result<()>;

    /// Latest `limit` messages strictly older than `before`, oldest first.
    fn find_by_group(
        &self,
        group_id: &group::Id,
        limit: i64,
        before: Option<DateTime<Utc>>,
    ) -> super::Result<Vec<Message>>;
}

pub struct PgMessageRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgMessageRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl MessageRepository for PgMessageRepository {
    fn insert(&self, msg: &Message) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(messages::table)
            .values(msg)
            .execute(&mut conn)?;

        Ok(())
    }

    fn find_by_group(
        &self,
        group_id: &group::Id,
        limit: i64,
        before: Option<DateTime<Utc>>,
    ) -> super::Result<Vec<Message>> {
        let mut conn = self.pool.get()?;

        let mut query = messages::table
            .filter(messages::group_id.eq(group_id))
            .into_boxed();
        if let Some(before) = before {
            query = query.filter(messages::created_at.lt(before));
        }

        let mut msgs = query
            .order(messages::created_at.desc())
            .limit(limit)
            .select(Message::as_select())
            .load(&mut conn)?;
        msgs.reverse();

        Ok(msgs)
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryMessageRepository {
        messages: Mutex<Vec<Message>>,
    }

    impl InMemoryMessageRepository {
        pub fn count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }
    }

    impl MessageRepository for InMemoryMessageRepository {
        fn insert(&self, msg: &Message) -> crate::message::Result<()> {
            self.messages.lock().unwrap().push(msg.clone());
            Ok(())
        }

        fn find_by_group(
            &self,
            group_id: &group::Id,
            limit: i64,
            before: Option<DateTime<Utc>>,
        ) -> crate::message::Result<Vec<Message>> {
            let messages = self.messages.lock().unwrap();
            let mut msgs = messages
                .iter()
                .filter(|m| m.group_id() == group_id)
                .filter(|m| before.is_none_or(|b| *m.created_at() < b))
                .cloned()
                .collect::<Vec<_>>();
            msgs.sort_by_key(|m| *m.created_at());

            let skip = msgs.len().saturating_sub(limit as usize);
            Ok(msgs.split_off(skip))
        }
    }
}
