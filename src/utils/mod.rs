use actix_web::{web, FromRequest};
use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use futures_util::future::LocalBoxFuture;
use rand::rngs::OsRng;
use serde::{de::Deserializer, Deserialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::error;

lazy_static::lazy_static! {
  static ref ARGON2: Argon2<'static> = Argon2::default();
}

pub fn hash_password(password: &str) -> Result<String, error::SystemError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = ARGON2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> Result<bool, error::SystemError> {
    let parsed_hash = PasswordHash::new(hash)?;
    match ARGON2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(error::SystemError::HashError(e)),
    }
}

/// Splits an `Authorization: Basic <base64(email:password)>` header into its
/// credential pair. Every malformed shape collapses into `Unauthorized`.
pub fn decode_basic_credentials(header: &str) -> Result<(String, String), error::SystemError> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| error::SystemError::unauthorized("authorization scheme is not Basic"))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| error::SystemError::unauthorized("credentials are not valid base64"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| error::SystemError::unauthorized("credentials are not valid UTF-8"))?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or_else(|| error::SystemError::unauthorized("credentials missing ':' separator"))?;

    Ok((email.to_string(), password.to_string()))
}

/// Parent references accept the root sentinel (`0`, `"0"`, `null`, absent) as
/// well as a UUID string. Anything else is a deserialization error.
pub fn de_parent_id<'de, D>(de: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(de)? {
        None => Ok(None),
        Some(Raw::Num(0)) => Ok(None),
        Some(Raw::Num(_)) => Err(serde::de::Error::custom("parent_id must be 0 or a UUID")),
        Some(Raw::Text(s)) if s == "0" => Ok(None),
        Some(Raw::Text(s)) => Uuid::parse_str(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::bad_request(e.to_string()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::bad_request(e.to_string()))?;
            Ok(ValidatedJson(model))
        })
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Query::<T>::from_request(req, payload);

        Box::pin(async move {
            let query = fut.await.map_err(|e| error::Error::bad_request(e.to_string()))?;
            query.validate().map_err(|e| error::Error::bad_request(e.to_string()))?;
            Ok(ValidatedQuery(query.into_inner()))
        })
    }
}
