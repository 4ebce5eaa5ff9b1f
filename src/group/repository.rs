use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;

use crate::schema::groups;
use crate::user;

use super::Id;
use super::model::{Group, GroupUpdate, NewGroup};

pub trait GroupRepository {
    fn insert(&self, group: &NewGroup) -> super::Result<()>;

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Group>>;

    fn find_by_participant(&self, user_id: &user::Id) -> super::Result<Vec<Group>>;

    fn update(&self, id: &Id, update: &GroupUpdate) -> super::Result<bool>;

    fn set_participants(&self, id: &Id, participants: &[user::Id]) -> super::Result<bool>;

    fn delete(&self, id: &Id) -> super::Result<bool>;
}

pub struct PgGroupRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgGroupRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl GroupRepository for PgGroupRepository {
    fn insert(&self, g: &NewGroup) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(groups::table)
            .values(g)
            .execute(&mut conn)?;

        Ok(())
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Option<Group>> {
        let mut conn = self.pool.get()?;

        let g = groups::table
            .find(id)
            .select(Group::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(g)
    }

    fn find_by_participant(&self, user_id: &user::Id) -> super::Result<Vec<Group>> {
        let mut conn = self.pool.get()?;

        let groups = groups::table
            .filter(groups::participants.contains(vec![*user_id]))
            .order(groups::created_at.desc())
            .select(Group::as_select())
            .load(&mut conn)?;

        Ok(groups)
    }

    fn update(&self, id: &Id, update: &GroupUpdate) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(groups::table.find(id))
            .set(update)
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    fn set_participants(&self, id: &Id, participants: &[user::Id]) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(groups::table.find(id))
            .set(groups::participants.eq(participants.to_vec()))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(groups::table.find(id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
