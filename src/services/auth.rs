use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web::Data, Error as ActixError, FromRequest,
    HttpRequest,
};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::StaffRole;
use crate::reports::filter::{CallerScope, StaffFilter};
use crate::reports::store::{RecordStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // staff id
    pub email: String,
    pub role: StaffRole,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn new(staff_id: Uuid, email: &str, role: StaffRole, valid_for: Duration) -> Self {
        Self {
            sub: staff_id,
            email: email.to_string(),
            role,
            exp: (Utc::now() + valid_for).timestamp().max(0) as usize,
        }
    }

    pub fn staff_id(&self) -> Uuid {
        self.sub
    }

    pub fn encode(&self, secret: &str) -> Result<String> {
        let token = encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(token_data.claims)
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return ready(Err(ErrorUnauthorized(
                "Missing or invalid authorization header",
            )));
        };

        // Get the config from app data
        let Some(config) = req.app_data::<Data<Config>>() else {
            log::error!("Config missing from app data; cannot verify tokens");
            return ready(Err(ErrorUnauthorized("Invalid token")));
        };

        match Claims::decode(token, &config.jwt_secret) {
            Ok(claims) => ready(Ok(claims)),
            Err(err) => {
                log::warn!("Rejected bearer token: {}", err);
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}

/// What the token holder may report on: HR and admins see everyone,
/// supervisors see themselves and the staff they supervise, staff see
/// only themselves.
pub async fn resolve_scope(
    claims: &Claims,
    store: &dyn RecordStore,
) -> Result<CallerScope, StoreError> {
    match claims.role {
        role if role.has_full_access() => Ok(CallerScope::Full),
        StaffRole::Supervisor => {
            let supervised = store
                .fetch_staff(&StaffFilter::supervised_by(claims.sub))
                .await?;
            log::debug!(
                "Supervisor {} covers {} staff",
                claims.sub,
                supervised.len()
            );
            Ok(CallerScope::restricted(
                std::iter::once(claims.sub).chain(supervised.into_iter().map(|s| s.id)),
            ))
        }
        _ => Ok(CallerScope::restricted([claims.sub])),
    }
}
