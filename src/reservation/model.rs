use chrono::{DateTime, Utc};
use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::{group, text_enum, user};

use super::Id;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, FromSqlRow, AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Confirmed,
    Cancel,
    Change,
}

text_enum!(ItemStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancel => "cancel",
    Change => "change",
});

impl ItemStatus {
    pub fn toggle(self, selected: ItemStatus) -> ItemStatus {
        if self == selected {
            ItemStatus::Pending
        } else {
            selected
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, FromSqlRow, AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

text_enum!(ReservationStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
});

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Trip {
    price: f64,
    currency: String,
    departure: String,
    arrival: String,
    duration: String,
}

impl Trip {
    pub fn new(
        price: f64,
        currency: impl Into<String>,
        departure: impl Into<String>,
        arrival: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            price,
            currency: currency.into(),
            departure: departure.into(),
            arrival: arrival.into(),
            duration: duration.into(),
        }
    }

    pub fn validate(&self) -> super::Result<()> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(super::Error::InvalidTrip("price must be a non-negative amount"));
        }
        if self.currency.trim().is_empty() {
            return Err(super::Error::InvalidTrip("currency is required"));
        }
        if self.departure.trim().is_empty() || self.arrival.trim().is_empty() {
            return Err(super::Error::InvalidTrip("departure and arrival are required"));
        }
        Ok(())
    }
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reservation {
    id: Id,
    group_id: group::Id,
    price: f64,
    currency: String,
    departure: String,
    arrival: String,
    duration: String,
    status: ReservationStatus,
    created_by: user::Id,
    created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(group_id: group::Id, trip: Trip, created_by: user::Id) -> Self {
        Self {
            id: Id::random(),
            group_id,
            price: trip.price,
            currency: trip.currency.trim().to_uppercase(),
            departure: trip.departure.trim().to_owned(),
            arrival: trip.arrival.trim().to_owned(),
            duration: trip.duration.trim().to_owned(),
            status: ReservationStatus::Pending,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn group_id(&self) -> &group::Id {
        &self.group_id
    }

    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ReservationStatus) {
        self.status = status;
    }
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::reservation_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Item {
    reservation_id: Id,
    user_id: user::Id,
    status: ItemStatus,
}

impl Item {
    pub fn new(reservation_id: Id, user_id: user::Id, status: ItemStatus) -> Self {
        Self {
            reservation_id,
            user_id,
            status,
        }
    }

    pub const fn user_id(&self) -> &user::Id {
        &self.user_id
    }

    pub const fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    confirmed: usize,
    cancelled: usize,
    change: usize,
    pending: usize,
}

impl Summary {
    pub fn of(items: &[Item]) -> Self {
        items.iter().fold(Self::default(), |mut s, item| {
            match item.status {
                ItemStatus::Confirmed => s.confirmed += 1,
                ItemStatus::Cancel => s.cancelled += 1,
                ItemStatus::Change => s.change += 1,
                ItemStatus::Pending => s.pending += 1,
            }
            s
        })
    }

    pub const fn total(&self) -> usize {
        self.confirmed + self.cancelled + self.change + self.pending
    }

    pub const fn confirmed(&self) -> usize {
        self.confirmed
    }

    pub const fn cancelled(&self) -> usize {
        self.cancelled
    }

    pub const fn change(&self) -> usize {
        self.change
    }

    pub const fn pending(&self) -> usize {
        self.pending
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReservationDto {
    id: Id,
    group_id: group::Id,
    #[serde(flatten)]
    trip: Trip,
    status: ReservationStatus,
    created_by: user::Id,
    created_at: DateTime<Utc>,
    items: Vec<Item>,
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    my_status: Option<ItemStatus>,
}

impl ReservationDto {
    pub fn new(r: Reservation, items: Vec<Item>) -> Self {
        Self {
            id: r.id,
            group_id: r.group_id,
            trip: Trip {
                price: r.price,
                currency: r.currency,
                departure: r.departure,
                arrival: r.arrival,
                duration: r.duration,
            },
            status: r.status,
            created_by: r.created_by,
            created_at: r.created_at,
            summary: Summary::of(&items),
            items,
            my_status: None,
        }
    }

    pub fn seen_by(mut self, user_id: &user::Id) -> Self {
        let status = self
            .items
            .iter()
            .find(|i| i.user_id.eq(user_id))
            .map_or(ItemStatus::Pending, Item::status);
        self.my_status = Some(status);
        self
    }

    pub const fn group_id(&self) -> &group::Id {
        &self.group_id
    }

    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    pub const fn my_status(&self) -> Option<ItemStatus> {
        self.my_status
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn items(statuses: &[ItemStatus]) -> Vec<Item> {
        let reservation_id = Id::random();
        statuses
            .iter()
            .map(|s| Item::new(reservation_id, user::Id::random(), *s))
            .collect()
    }

    #[test]
    fn should_overwrite_with_different_stance() {
        assert_eq!(
            ItemStatus::Pending.toggle(ItemStatus::Confirmed),
            ItemStatus::Confirmed
        );
        assert_eq!(
            ItemStatus::Confirmed.toggle(ItemStatus::Change),
            ItemStatus::Change
        );
    }

    #[test]
    fn should_revert_to_pending_on_same_stance() {
        assert_eq!(
            ItemStatus::Confirmed.toggle(ItemStatus::Confirmed),
            ItemStatus::Pending
        );
        assert_eq!(ItemStatus::Cancel.toggle(ItemStatus::Cancel), ItemStatus::Pending);
    }

    #[test]
    fn should_end_in_last_stance_unless_repeated() {
        let calls = [
            ItemStatus::Confirmed,
            ItemStatus::Cancel,
            ItemStatus::Change,
            ItemStatus::Change,
            ItemStatus::Confirmed,
        ];

        let mut state = ItemStatus::Pending;
        let mut trace = vec![];
        for c in calls {
            state = state.toggle(c);
            trace.push(state);
        }

        assert_eq!(
            trace,
            vec![
                ItemStatus::Confirmed,
                ItemStatus::Cancel,
                ItemStatus::Change,
                ItemStatus::Pending,
                ItemStatus::Confirmed,
            ]
        );
    }

    #[test]
    fn should_count_every_recorded_item() {
        let items = items(&[
            ItemStatus::Confirmed,
            ItemStatus::Confirmed,
            ItemStatus::Cancel,
            ItemStatus::Change,
            ItemStatus::Pending,
        ]);

        let summary = Summary::of(&items);

        assert_eq!(summary.confirmed(), 2);
        assert_eq!(summary.cancelled(), 1);
        assert_eq!(summary.change(), 1);
        assert_eq!(summary.pending(), 1);
        assert_eq!(summary.total(), items.len());
    }

    #[test]
    fn should_summarize_nothing() {
        assert_eq!(Summary::of(&[]), Summary::default());
    }

    #[test]
    fn should_default_own_stance_to_pending() {
        let reservation = Reservation::new(
            group::Id::random(),
            Trip::new(120.5, "eur", "OTP", "LIS", "PT4H"),
            user::Id::random(),
        );
        let voter = user::Id::random();
        let items = vec![Item::new(*reservation.id(), voter, ItemStatus::Change)];

        let dto = ReservationDto::new(reservation, items);

        assert_eq!(
            dto.clone().seen_by(&voter).my_status(),
            Some(ItemStatus::Change)
        );
        assert_eq!(
            dto.seen_by(&user::Id::random()).my_status(),
            Some(ItemStatus::Pending)
        );
    }

    #[test]
    fn should_reject_negative_price() {
        let trip = Trip::new(-1.0, "EUR", "OTP", "LIS", "PT4H");

        assert!(trip.validate().is_err());
    }

    #[test]
    fn should_parse_stored_status() {
        assert_eq!("cancel".parse::<ItemStatus>(), Ok(ItemStatus::Cancel));
        assert!("maybe".parse::<ItemStatus>().is_err());
        assert_eq!(ItemStatus::Change.as_str(), "change");
    }
}
