use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::debug;

use crate::user;

use super::{Config, TokenClaims};

pub trait AuthService {
    fn validate(&self, token: &str) -> super::Result<user::Id>;
}

pub struct AuthServiceImpl {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthServiceImpl {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

impl AuthService for AuthServiceImpl {
    fn validate(&self, token: &str) -> super::Result<user::Id> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        debug!("token validated for {}", data.claims.sub);
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod test {
    use std::time::{SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{EncodingKey, Header, encode};

    use crate::auth::{Config, Error, TokenClaims};
    use crate::user;

    use super::*;

    const SECRET: &str = "s3cr3t";

    fn config() -> Config {
        Config::new(SECRET, "https://idp.voyage.test", "voyage")
    }

    fn token(sub: user::Id, aud: &str, exp_offset: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;

        let claims = TokenClaims {
            sub,
            iss: "https://idp.voyage.test".into(),
            aud: aud.into(),
            exp: (now + exp_offset) as u64,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn should_validate_token() {
        let service = AuthServiceImpl::new(&config());
        let sub = user::Id::random();

        let actual = service.validate(&token(sub, "voyage", 600)).unwrap();

        assert_eq!(actual, sub);
    }

    #[test]
    fn should_reject_expired_token() {
        let service = AuthServiceImpl::new(&config());

        let actual = service.validate(&token(user::Id::random(), "voyage", -600));

        assert!(matches!(actual, Err(Error::InvalidToken(_))));
    }

    #[test]
    fn should_reject_foreign_audience() {
        let service = AuthServiceImpl::new(&config());

        let actual = service.validate(&token(user::Id::random(), "elsewhere", 600));

        assert!(matches!(actual, Err(Error::InvalidToken(_))));
    }

    #[test]
    fn should_reject_garbage() {
        let service = AuthServiceImpl::new(&config());

        assert!(service.validate("not.a.token").is_err());
    }
}
