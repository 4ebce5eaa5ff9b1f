use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::user;

use super::Id;

#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Group {
    id: Id,
    name: String,
    description: String,
    participants: Vec<user::Id>,
    creator: user::Id,
    created_at: DateTime<Utc>,
    icon: Option<String>,
}

impl Group {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn participants(&self) -> &[user::Id] {
        &self.participants
    }

    pub const fn creator(&self) -> &user::Id {
        &self.creator
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn apply(&mut self, update: &GroupUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(icon) = &update.icon {
            self.icon = Some(icon.clone());
        }
    }

    #[cfg(test)]
    pub fn replace_participants(&mut self, participants: &[user::Id]) {
        self.participants = participants.to_vec();
    }

    pub fn is_participant(&self, user_id: &user::Id) -> bool {
        self.participants.contains(user_id)
    }

    pub fn is_creator(&self, user_id: &user::Id) -> bool {
        self.creator.eq(user_id)
    }

    pub fn add_participant(&mut self, user_id: user::Id) -> super::Result<()> {
        if self.is_participant(&user_id) {
            return Err(super::Error::AlreadyParticipant(user_id));
        }
        self.participants.push(user_id);
        Ok(())
    }

    pub fn remove_participant(
        &mut self,
        target: &user::Id,
        requested_by: &user::Id,
    ) -> super::Result<()> {
        if !self.is_participant(requested_by) {
            return Err(super::Error::NotMember);
        }
        if !self.is_participant(target) {
            return Err(super::Error::NotParticipant(*target));
        }
        if self.is_creator(target) {
            return Err(super::Error::CreatorRemoval);
        }
        if !self.is_creator(requested_by) && target.ne(requested_by) {
            return Err(super::Error::NotCreator);
        }

        self.participants.retain(|p| p.ne(target));
        Ok(())
    }
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::groups)]
pub struct NewGroup {
    id: Id,
    name: String,
    description: String,
    participants: Vec<user::Id>,
    creator: user::Id,
    created_at: DateTime<Utc>,
    icon: Option<String>,
}

impl NewGroup {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        creator: user::Id,
        requested: &[user::Id],
        icon: Option<String>,
    ) -> Self {
        Self {
            id: Id::random(),
            name: name.into(),
            description: description.into(),
            participants: normalize_participants(&creator, requested),
            creator,
            created_at: Utc::now(),
            icon,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn participants(&self) -> &[user::Id] {
        &self.participants
    }
}

impl From<NewGroup> for Group {
    fn from(g: NewGroup) -> Self {
        Self {
            id: g.id,
            name: g.name,
            description: g.description,
            participants: g.participants,
            creator: g.creator,
            created_at: g.created_at,
            icon: g.icon,
        }
    }
}

#[derive(AsChangeset, Deserialize, Clone, Debug, Default)]
#[diesel(table_name = crate::schema::groups)]
pub struct GroupUpdate {
    name: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

impl GroupUpdate {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.icon.is_none()
    }
}

pub fn normalize_participants(creator: &user::Id, requested: &[user::Id]) -> Vec<user::Id> {
    let mut participants = Vec::with_capacity(requested.len() + 1);
    participants.push(*creator);
    for p in requested {
        if !participants.contains(p) {
            participants.push(*p);
        }
    }
    participants
}

#[cfg(test)]
mod test {
    use crate::group::Error;

    use super::*;

    fn group(creator: user::Id, others: &[user::Id]) -> Group {
        Group {
            id: Id::random(),
            name: "Lisbon".into(),
            description: String::new(),
            participants: normalize_participants(&creator, others),
            creator,
            created_at: Utc::now(),
            icon: None,
        }
    }

    #[test]
    fn should_put_creator_first_and_drop_duplicates() {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let radu = user::Id::random();

        let actual = normalize_participants(&jora, &[valera, jora, radu, valera]);

        assert_eq!(actual, vec![jora, valera, radu]);
    }

    #[test]
    fn should_apply_partial_update() {
        let mut g = group(user::Id::random(), &[]);
        let update: GroupUpdate = serde_json::from_str(r#"{"name":"Porto"}"#).unwrap();

        g.apply(&update);

        assert_eq!(g.name(), "Porto");
        assert_eq!(g.description, "");
        assert_eq!(g.icon(), None);
    }

    #[test]
    fn should_add_participant() {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let mut g = group(jora, &[]);

        g.add_participant(valera).unwrap();

        assert_eq!(g.participants(), &[jora, valera]);
    }

    #[test]
    fn should_not_add_participant_twice() {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let mut g = group(jora, &[valera]);

        let actual = g.add_participant(valera);

        assert!(matches!(actual, Err(Error::AlreadyParticipant(id)) if id == valera));
    }

    #[test]
    fn should_let_creator_remove_participant() {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let mut g = group(jora, &[valera]);

        g.remove_participant(&valera, &jora).unwrap();

        assert_eq!(g.participants(), &[jora]);
    }

    #[test]
    fn should_let_participant_leave() {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let mut g = group(jora, &[valera]);

        g.remove_participant(&valera, &valera).unwrap();

        assert!(!g.is_participant(&valera));
    }

    #[test]
    fn should_not_let_participant_remove_others() {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let radu = user::Id::random();
        let mut g = group(jora, &[valera, radu]);

        let actual = g.remove_participant(&radu, &valera);

        assert!(matches!(actual, Err(Error::NotCreator)));
        assert!(g.is_participant(&radu));
    }

    #[test]
    fn should_not_remove_creator() {
        let jora = user::Id::random();
        let mut g = group(jora, &[user::Id::random()]);

        let actual = g.remove_participant(&jora, &jora);

        assert!(matches!(actual, Err(Error::CreatorRemoval)));
    }

    #[test]
    fn should_not_let_outsider_remove() {
        let jora = user::Id::random();
        let valera = user::Id::random();
        let mut g = group(jora, &[valera]);

        let actual = g.remove_participant(&valera, &user::Id::random());

        assert!(matches!(actual, Err(Error::NotMember)));
    }
}
