use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,  // expiration time
}

/// The authenticated caller. Tokens are issued elsewhere; this service only
/// verifies them and reads the user id from `sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
}

impl Identity {
    pub fn from_token(token: &str, secret: &str) -> Result<Self, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| {
            log::debug!("Rejected bearer token: {}", err);
            AppError::Unauthorized
        })?;

        let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| AppError::Unauthorized)?;
        Ok(Identity { user_id })
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let result = match (token, req.app_data::<Data<Config>>()) {
            (Some(token), Some(config)) => Identity::from_token(token, &config.jwt_secret),
            (_, None) => {
                log::error!("Config missing from app data; cannot verify tokens");
                Err(AppError::Unauthorized)
            }
            (None, _) => Err(AppError::Unauthorized),
        };

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret";

    fn token_for(sub: &str, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    #[test]
    fn reads_the_user_id_from_sub() {
        let user_id = Uuid::new_v4();
        let identity = Identity::from_token(&token_for(&user_id.to_string(), SECRET), SECRET).unwrap();
        assert_eq!(identity.user_id, user_id);
    }

    #[test]
    fn rejects_a_foreign_signature() {
        let token = token_for(&Uuid::new_v4().to_string(), "other-secret");
        assert!(matches!(
            Identity::from_token(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_a_non_uuid_subject() {
        let token = token_for("someone", SECRET);
        assert!(matches!(
            Identity::from_token(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }
}
