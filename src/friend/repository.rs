use diesel::BoolExpressionMethods;
use diesel::Connection;
use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::PgConnection;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::r2d2::ConnectionManager;

use crate::schema::friends;
use crate::user;

use super::model::Friend;

pub trait FriendRepository {
    fn find(&self, user_id: &user::Id, friend_id: &user::Id) -> super::Result<Option<Friend>>;

    fn find_by_user(&self, user_id: &user::Id) -> super::Result<Vec<Friend>>;

    fn insert_pair(&self, pair: &[Friend; 2]) -> super::Result<()>;

    fn delete_pair(&self, a: &user::Id, b: &user::Id) -> super::Result<usize>;
}

pub struct PgFriendRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgFriendRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl FriendRepository for PgFriendRepository {
    fn find(&self, user_id: &user::Id, friend_id: &user::Id) -> super::Result<Option<Friend>> {
        let mut conn = self.pool.get()?;

        let f = friends::table
            .find((user_id, friend_id))
            .select(Friend::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(f)
    }

    fn find_by_user(&self, user_id: &user::Id) -> super::Result<Vec<Friend>> {
        let mut conn = self.pool.get()?;

        let friends = friends::table
            .filter(friends::user_id.eq(user_id))
            .order(friends::friend_email.asc())
            .select(Friend::as_select())
            .load(&mut conn)?;

        Ok(friends)
    }

    fn insert_pair(&self, pair: &[Friend; 2]) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        conn.transaction(|conn| {
            diesel::insert_into(friends::table)
                .values(&pair[..])
                .execute(conn)
        })?;

        Ok(())
    }

    fn delete_pair(&self, a: &user::Id, b: &user::Id) -> super::Result<usize> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(
            friends::table.filter(
                (friends::user_id.eq(a).and(friends::friend_id.eq(b)))
                    .or(friends::user_id.eq(b).and(friends::friend_id.eq(a))),
            ),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod pg_test {
    use crate::integration::db::test::TestContainer;
    use crate::schema::users;
    use crate::user::model::NewUser;

    use super::*;

    fn insert_user(pool: &r2d2::Pool<ConnectionManager<PgConnection>>, email: &str) -> user::Id {
        let id = user::Id::random();
        let mut conn = pool.get().unwrap();
        diesel::insert_into(users::table)
            .values(&NewUser::new(id, "First", "Last", email, None))
            .execute(&mut conn)
            .unwrap();
        id
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_insert_and_find_both_sides() {
        let tc = TestContainer::init().await;
        let repo = PgFriendRepository::new(tc.pool.clone());

        let jora = insert_user(&tc.pool, "jora@voyage.io");
        let valera = insert_user(&tc.pool, "valera@voyage.io");
        let pair = Friend::pair((jora, "jora@voyage.io"), (valera, "valera@voyage.io"));

        repo.insert_pair(&pair).unwrap();

        assert_eq!(repo.find(&jora, &valera).unwrap().unwrap(), pair[0]);
        assert_eq!(repo.find(&valera, &jora).unwrap().unwrap(), pair[1]);
        assert_eq!(repo.find_by_user(&jora).unwrap(), vec![pair[0].clone()]);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_delete_both_sides() {
        let tc = TestContainer::init().await;
        let repo = PgFriendRepository::new(tc.pool.clone());

        let jora = insert_user(&tc.pool, "jora@voyage.io");
        let valera = insert_user(&tc.pool, "valera@voyage.io");
        repo.insert_pair(&Friend::pair(
            (jora, "jora@voyage.io"),
            (valera, "valera@voyage.io"),
        ))
        .unwrap();

        let deleted = repo.delete_pair(&valera, &jora).unwrap();

        assert_eq!(deleted, 2);
        assert!(repo.find(&jora, &valera).unwrap().is_none());
        assert!(repo.find(&valera, &jora).unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_not_insert_half_of_a_pair() {
        let tc = TestContainer::init().await;
        let repo = PgFriendRepository::new(tc.pool.clone());

        let jora = insert_user(&tc.pool, "jora@voyage.io");
        let ghost = user::Id::random();

        let res = repo.insert_pair(&Friend::pair(
            (jora, "jora@voyage.io"),
            (ghost, "ghost@voyage.io"),
        ));

        assert!(res.is_err());
        assert!(repo.find_by_user(&jora).unwrap().is_empty());
    }
}
