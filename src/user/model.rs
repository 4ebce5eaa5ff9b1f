use diesel::prelude::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    id: Id,
    first_name: String,
    last_name: String,
    email: String,
    picture: Option<String>,
    online: bool,
}

impl User {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub const fn online(&self) -> bool {
        self.online
    }
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    id: Id,
    first_name: String,
    last_name: String,
    email: String,
    picture: Option<String>,
}

impl NewUser {
    pub fn new(
        id: Id,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        picture: Option<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            picture,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl From<NewUser> for User {
    fn from(u: NewUser) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            picture: u.picture,
            online: false,
        }
    }
}

#[derive(AsChangeset, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct ProfileUpdate {
    first_name: String,
    last_name: String,
    picture: Option<String>,
}

impl ProfileUpdate {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserDto {
    id: Id,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
    online: bool,
}

impl UserDto {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            picture: u.picture,
            online: u.online,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OnlineStatus {
    id: Id,
    online: bool,
}

impl OnlineStatus {
    pub fn new(id: Id, online: bool) -> Self {
        Self { id, online }
    }
}
