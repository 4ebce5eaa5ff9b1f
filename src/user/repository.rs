use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::PgConnection;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::r2d2::ConnectionManager;

use crate::schema::users;

use super::Id;
use super::model::{NewUser, ProfileUpdate, User};

pub trait UserRepository {
    fn insert(&self, user: &NewUser) -> super::Result<()>;

    fn find_by_id(&self, id: &Id) -> super::Result<Option<User>>;

    fn find_by_email(&self, email: &str) -> super::Result<Option<User>>;

    fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>>;

    fn update_profile(&self, id: &Id, p: &ProfileUpdate) -> super::Result<bool>;

    fn set_online(&self, id: &Id, online: bool) -> super::Result<bool>;
}

pub struct PgUserRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgUserRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn insert(&self, u: &NewUser) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(users::table)
            .values(u)
            .execute(&mut conn)?;

        Ok(())
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Option<User>> {
        let mut conn = self.pool.get()?;

        let u = users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(u)
    }

    fn find_by_email(&self, email: &str) -> super::Result<Option<User>> {
        let mut conn = self.pool.get()?;

        let u = users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(u)
    }

    fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>> {
        let mut conn = self.pool.get()?;

        let users = users::table
            .filter(users::id.eq_any(ids))
            .select(User::as_select())
            .load(&mut conn)?;

        Ok(users)
    }

    fn update_profile(&self, id: &Id, p: &ProfileUpdate) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(users::table.find(id))
            .set(p)
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    fn set_online(&self, id: &Id, online: bool) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(users::table.find(id))
            .set(users::online.eq(online))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }
}
