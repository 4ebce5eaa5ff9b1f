use std::env;
use std::fmt::{self, Display};

use log::error;
use redis::{AsyncCommands, FromRedisValue, ToRedisArgs};
use serde::{Serialize, de::DeserializeOwned};

use crate::{group, user};

use super::Result;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 6379,
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let host = env::var("REDIS_HOST")?;
        let port = env::var("REDIS_PORT")?.parse()?;
        Ok(Self { host, port })
    }

    pub async fn connect(&self) -> Redis {
        match init(self).await {
            Ok(con) => Redis { con: Some(con) },
            Err(e) => panic!("Failed to connect to Redis: {e}"),
        }
    }
}

async fn init(config: &Config) -> Result<redis::aio::ConnectionManager> {
    let con = redis::Client::open(format!("redis://{}:{}", config.host, config.port))?
        .get_connection_manager()
        .await?;

    Ok(con)
}

#[derive(Clone, Debug)]
pub enum Key {
    UserInfo(user::Id),
    Participants(group::Id),
}

impl Key {
    fn ttl(&self) -> i64 {
        match self {
            Key::UserInfo(_) => 3600,
            Key::Participants(_) => 600,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::UserInfo(id) => write!(f, "userinfo:{id}"),
            Key::Participants(id) => write!(f, "group:{id}:participants"),
        }
    }
}

impl ToRedisArgs for Key {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + redis::RedisWrite,
    {
        out.write_arg(self.to_string().as_bytes());
    }
}

/// Without a connection every read misses and every write is dropped.
#[derive(Clone)]
pub struct Redis {
    con: Option<redis::aio::ConnectionManager>,
}

impl Redis {
    pub fn disconnected() -> Self {
        Self { con: None }
    }

    pub async fn json_get<T: DeserializeOwned>(&self, key: Key) -> Option<T> {
        let mut con = self.con.clone()?;
        let raw: Option<String> = match con.get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("failed to get {key}: {e:?}");
                return None;
            }
        };

        raw.and_then(|r| match serde_json::from_str(&r) {
            Ok(v) => Some(v),
            Err(e) => {
                error!("failed to deserialize {key}: {e:?}");
                None
            }
        })
    }

    pub async fn json_set_ex<T: Serialize>(&self, key: Key, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!("failed to serialize {key}: {e:?}");
                return;
            }
        };

        let Some(mut con) = self.con.clone() else {
            return;
        };
        let ttl = key.ttl() as u64;
        let res: redis::RedisResult<()> = con.set_ex(&key, raw, ttl).await;
        if let Err(e) = res {
            error!("failed to set {key}: {e:?}");
        }
    }

    pub async fn smembers<T: FromRedisValue>(&self, key: Key) -> Option<T> {
        let mut con = self.con.clone()?;
        match con.smembers(&key).await {
            Ok(members) => Some(members),
            Err(e) => {
                error!("failed to get members of {key}: {e:?}");
                None
            }
        }
    }

    pub async fn sadd<V: ToRedisArgs + Send + Sync>(&self, key: Key, members: V) {
        let Some(mut con) = self.con.clone() else {
            return;
        };
        let res: redis::RedisResult<()> = con.sadd(&key, members).await;
        if let Err(e) = res {
            error!("failed to add members to {key}: {e:?}");
        }
    }

    pub async fn expire(&self, key: Key) {
        let Some(mut con) = self.con.clone() else {
            return;
        };
        let res: redis::RedisResult<()> = con.expire(&key, key.ttl()).await;
        if let Err(e) = res {
            error!("failed to set expiry of {key}: {e:?}");
        }
    }

    pub async fn del(&self, key: Key) {
        let Some(mut con) = self.con.clone() else {
            return;
        };
        let res: redis::RedisResult<()> = con.del(&key).await;
        if let Err(e) = res {
            error!("failed to delete {key}: {e:?}");
        }
    }
}

impl ToRedisArgs for user::Id {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + redis::RedisWrite,
    {
        out.write_arg(self.to_string().as_bytes());
    }
}

impl FromRedisValue for user::Id {
    fn from_redis_value(v: &redis::Value) -> redis::RedisResult<Self> {
        let raw: String = redis::from_redis_value(v)?;
        uuid::Uuid::parse_str(&raw).map(Self::from).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "invalid user id",
                e.to_string(),
            ))
        })
    }
}
