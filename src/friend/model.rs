use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::user;

use super::Consistency;

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::friends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Friend {
    user_id: user::Id,
    friend_id: user::Id,
    friend_email: String,
}

impl Friend {
    pub fn new(user_id: user::Id, friend_id: user::Id, friend_email: impl Into<String>) -> Self {
        Self {
            user_id,
            friend_id,
            friend_email: friend_email.into(),
        }
    }

    pub fn pair(a: (user::Id, &str), b: (user::Id, &str)) -> [Friend; 2] {
        assert_ne!(a.0, b.0);
        [Friend::new(a.0, b.0, b.1), Friend::new(b.0, a.0, a.1)]
    }

    pub const fn user_id(&self) -> &user::Id {
        &self.user_id
    }

    pub const fn friend_id(&self) -> &user::Id {
        &self.friend_id
    }

    pub fn friend_email(&self) -> &str {
        &self.friend_email
    }
}

pub fn consistency(forward: Option<&Friend>, backward: Option<&Friend>) -> Consistency {
    match (forward, backward) {
        (Some(f), Some(b)) if f.user_id == b.friend_id && f.friend_id == b.user_id => {
            Consistency::Friends
        }
        (None, None) => Consistency::Strangers,
        _ => Consistency::Inconsistent,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_mirror_pair() {
        let jora = user::Id::random();
        let valera = user::Id::random();

        let [forward, backward] = Friend::pair((jora, "jora@voyage.io"), (valera, "valera@voyage.io"));

        assert_eq!(forward.user_id(), &jora);
        assert_eq!(forward.friend_id(), &valera);
        assert_eq!(forward.friend_email(), "valera@voyage.io");
        assert_eq!(backward.user_id(), &valera);
        assert_eq!(backward.friend_id(), &jora);
        assert_eq!(backward.friend_email(), "jora@voyage.io");
    }

    #[test]
    #[should_panic]
    fn should_panic_when_pairing_with_oneself() {
        let jora = user::Id::random();
        Friend::pair((jora, "jora@voyage.io"), (jora, "jora@voyage.io"));
    }

    #[test]
    fn should_be_friends_when_both_records_exist() {
        let [f, b] = Friend::pair(
            (user::Id::random(), "jora@voyage.io"),
            (user::Id::random(), "valera@voyage.io"),
        );

        assert_eq!(consistency(Some(&f), Some(&b)), Consistency::Friends);
    }

    #[test]
    fn should_be_strangers_when_no_records_exist() {
        assert_eq!(consistency(None, None), Consistency::Strangers);
    }

    #[test]
    fn should_be_inconsistent_when_one_side_is_missing() {
        let [f, b] = Friend::pair(
            (user::Id::random(), "jora@voyage.io"),
            (user::Id::random(), "valera@voyage.io"),
        );

        assert_eq!(consistency(Some(&f), None), Consistency::Inconsistent);
        assert_eq!(consistency(None, Some(&b)), Consistency::Inconsistent);
    }

    #[test]
    fn should_be_inconsistent_when_records_do_not_mirror() {
        let jora = user::Id::random();
        let [f, _] = Friend::pair((jora, "jora@voyage.io"), (user::Id::random(), "valera@voyage.io"));
        let [_, other] = Friend::pair((jora, "jora@voyage.io"), (user::Id::random(), "radu@voyage.io"));

        assert_eq!(consistency(Some(&f), Some(&other)), Consistency::Inconsistent);
    }
}
