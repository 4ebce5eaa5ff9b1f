use diesel::Connection;
use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::PgConnection;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::r2d2::ConnectionManager;
use diesel::result::DatabaseErrorKind;

use crate::schema::{reservation_items, reservations};
use crate::{group, user};

use super::Id;
use super::model::{Item, ItemStatus, Reservation, ReservationStatus};

pub trait ReservationRepository {
    fn insert(&self, r: &Reservation) -> super::Result<()>;

    fn find_by_group(&self, group_id: &group::Id) -> super::Result<Option<Reservation>>;

    fn find_items(&self, id: &Id) -> super::Result<Vec<Item>>;

    fn vote(
        &self,
        group_id: &group::Id,
        user_id: &user::Id,
        selected: ItemStatus,
    ) -> super::Result<(ItemStatus, Vec<Item>)>;

    fn set_status(&self, group_id: &group::Id, status: ReservationStatus) -> super::Result<bool>;

    fn delete(&self, group_id: &group::Id) -> super::Result<bool>;
}

pub struct PgReservationRepository {
    pool: r2d2::Pool<ConnectionManager<PgConnection>>,
}

impl PgReservationRepository {
    pub fn new(pool: r2d2::Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

fn load_items(conn: &mut PgConnection, id: &Id) -> super::Result<Vec<Item>> {
    let items = reservation_items::table
        .filter(reservation_items::reservation_id.eq(id))
        .select(Item::as_select())
        .load(conn)?;

    Ok(items)
}

impl ReservationRepository for PgReservationRepository {
    fn insert(&self, r: &Reservation) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        match diesel::insert_into(reservations::table)
            .values(r)
            .execute(&mut conn)
        {
            Ok(_) => Ok(()),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(super::Error::AlreadyExists(*r.group_id()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_by_group(&self, group_id: &group::Id) -> super::Result<Option<Reservation>> {
        let mut conn = self.pool.get()?;

        let r = reservations::table
            .filter(reservations::group_id.eq(group_id))
            .select(Reservation::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(r)
    }

    fn find_items(&self, id: &Id) -> super::Result<Vec<Item>> {
        let mut conn = self.pool.get()?;
        load_items(&mut conn, id)
    }

    fn vote(
        &self,
        group_id: &group::Id,
        user_id: &user::Id,
        selected: ItemStatus,
    ) -> super::Result<(ItemStatus, Vec<Item>)> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, super::Error, _>(|conn| {
            let reservation = reservations::table
                .filter(reservations::group_id.eq(group_id))
                .select(Reservation::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(super::Error::NotFound(*group_id))?;

            let current = reservation_items::table
                .find((reservation.id(), user_id))
                .select(reservation_items::status)
                .first::<ItemStatus>(conn)
                .optional()?
                .unwrap_or(ItemStatus::Pending);
            let next = current.toggle(selected);

            diesel::insert_into(reservation_items::table)
                .values(&Item::new(*reservation.id(), *user_id, next))
                .on_conflict((reservation_items::reservation_id, reservation_items::user_id))
                .do_update()
                .set(reservation_items::status.eq(next))
                .execute(conn)?;

            let items = load_items(conn, reservation.id())?;
            Ok((next, items))
        })
    }

    fn set_status(&self, group_id: &group::Id, status: ReservationStatus) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(reservations::table.filter(reservations::group_id.eq(group_id)))
            .set(reservations::status.eq(status))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    fn delete(&self, group_id: &group::Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted =
            diesel::delete(reservations::table.filter(reservations::group_id.eq(group_id)))
                .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryReservationRepository {
        reservations: Mutex<HashMap<group::Id, Reservation>>,
        items: Mutex<Vec<Item>>,
    }

    impl ReservationRepository for InMemoryReservationRepository {
        fn insert(&self, r: &Reservation) -> crate::reservation::Result<()> {
            let mut reservations = self.reservations.lock().unwrap();
            if reservations.contains_key(r.group_id()) {
                return Err(crate::reservation::Error::AlreadyExists(*r.group_id()));
            }
            reservations.insert(*r.group_id(), r.clone());
            Ok(())
        }

        fn find_by_group(
            &self,
            group_id: &group::Id,
        ) -> crate::reservation::Result<Option<Reservation>> {
            Ok(self.reservations.lock().unwrap().get(group_id).cloned())
        }

        fn find_items(&self, _: &Id) -> crate::reservation::Result<Vec<Item>> {
            Ok(self.items.lock().unwrap().clone())
        }

        fn vote(
            &self,
            group_id: &group::Id,
            user_id: &user::Id,
            selected: ItemStatus,
        ) -> crate::reservation::Result<(ItemStatus, Vec<Item>)> {
            let reservations = self.reservations.lock().unwrap();
            let reservation = reservations
                .get(group_id)
                .ok_or(crate::reservation::Error::NotFound(*group_id))?;

            let mut items = self.items.lock().unwrap();
            let next = match items.iter_mut().find(|i| i.user_id() == user_id) {
                Some(item) => {
                    let next = item.status().toggle(selected);
                    item.set_status(next);
                    next
                }
                None => {
                    let next = ItemStatus::Pending.toggle(selected);
                    items.push(Item::new(*reservation.id(), *user_id, next));
                    next
                }
            };

            Ok((next, items.clone()))
        }

        fn set_status(
            &self,
            group_id: &group::Id,
            status: ReservationStatus,
        ) -> crate::reservation::Result<bool> {
            let mut reservations = self.reservations.lock().unwrap();
            Ok(reservations
                .get_mut(group_id)
                .map(|r| r.set_status(status))
                .is_some())
        }

        fn delete(&self, group_id: &group::Id) -> crate::reservation::Result<bool> {
            self.items.lock().unwrap().clear();
            Ok(self.reservations.lock().unwrap().remove(group_id).is_some())
        }
    }
}
