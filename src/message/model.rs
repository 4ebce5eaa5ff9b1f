use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::{group, user};

use super::Id;

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    id: Id,
    group_id: group::Id,
    sender: Option<user::Id>,
    text: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(group_id: group::Id, sender: &user::Id, text: &str) -> Self {
        Self {
            id: Id::random(),
            group_id,
            sender: Some(*sender),
            text: text.trim().to_owned(),
            created_at: Utc::now(),
        }
    }

    pub fn system(group_id: group::Id, text: &str) -> Self {
        Self {
            id: Id::random(),
            group_id,
            sender: None,
            text: text.trim().to_owned(),
            created_at: Utc::now(),
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn group_id(&self) -> &group::Id {
        &self.group_id
    }

    pub const fn sender(&self) -> Option<&user::Id> {
        self.sender.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn is_system(&self) -> bool {
        self.sender.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_trim_text() {
        let sender = user::Id::random();

        let msg = Message::new(group::Id::random(), &sender, "  see you at the gate \n");

        assert_eq!(msg.text(), "see you at the gate");
        assert_eq!(msg.sender(), Some(&sender));
        assert!(!msg.is_system());
    }

    #[test]
    fn should_have_no_sender_when_system() {
        let msg = Message::system(group::Id::random(), "Poll closed");

        assert!(msg.is_system());
        assert_eq!(msg.sender(), None);
    }
}
