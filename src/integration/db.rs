use std::env;
use std::time::Duration;

use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::info;

use super::Result;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
    user: String,
    password: String,
    db: String,
    url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 5432,
            user: String::from("postgres"),
            password: String::from("postgres"),
            db: String::from("voyage"),
            url: None,
        }
    }
}

impl Config {
    /// `DATABASE_URL` wins over the individual `PG_*` variables.
    pub fn env() -> Result<Self> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(Self {
                url: Some(url),
                ..Self::default()
            });
        }

        let host = env::var("PG_HOST")?;
        let port = env::var("PG_PORT")?.parse()?;
        let user = env::var("PG_USER")?;
        let password = env::var("PG_PASSWORD")?;
        let db = env::var("PG_DB")?;
        Ok(Self {
            host,
            port,
            user,
            password,
            db,
            url: None,
        })
    }

    fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.db
        )
    }

    pub fn connect(&self) -> Pool {
        let manager = ConnectionManager::<PgConnection>::new(self.url());

        match r2d2::Pool::builder()
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
        {
            Ok(pool) => pool,
            Err(e) => panic!("Failed to connect to Postgres: {e}"),
        }
    }
}

pub fn migrate(pool: &Pool) -> Result<()> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    info!("applied {} migration(s)", applied.len());
    Ok(())
}

#[cfg(test)]
pub mod test {
    use testcontainers_modules::postgres::Postgres;
    use testcontainers_modules::testcontainers::ContainerAsync;
    use testcontainers_modules::testcontainers::runners::AsyncRunner;

    use super::{Config, Pool, migrate};

    pub struct TestContainer {
        _node: ContainerAsync<Postgres>,
        pub pool: Pool,
    }

    impl TestContainer {
        pub async fn init() -> Self {
            let node = Postgres::default().start().await.unwrap();

            let config = Config {
                host: node.get_host().await.unwrap().to_string(),
                port: node.get_host_port_ipv4(5432).await.unwrap(),
                user: String::from("postgres"),
                password: String::from("postgres"),
                db: String::from("postgres"),
                url: None,
            };

            let pool = config.connect();
            migrate(&pool).unwrap();

            Self { _node: node, pool }
        }
    }
}
