//! Registration, login and bearer-token authentication.
//!
//! Passwords are stored as Argon2 PHC strings. A successful login returns a
//! signed HS256 token carrying the user's id, e-mail and name. Handlers that
//! need a caller take an [`AuthUser`], which is the only way to obtain an
//! [`OwnerId`] from a request.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::RequestPartsExt;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::queries::users;
use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{OwnerId, User};
use crate::state::AppState;
use crate::validation::Validator;

/// The contents of a bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub nombre: String,
    /// Expiry as a Unix timestamp.
    pub exp: usize,
    /// Issue time as a Unix timestamp.
    pub iat: usize,
}

/// Signing keys and token lifetime.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            nombre: user.name.clone(),
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token creation failed: {e}")))
    }

    /// Decode and check a token. Any malformed, expired or mis-signed token
    /// yields `None` without saying why.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                None
            }
        }
    }
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub owner: OwnerId,
    pub email: String,
    pub name: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    AppError::Unauthorized("Token no proporcionado".into())
                } else {
                    AppError::Forbidden("Token inválido o expirado".into())
                }
            })?;

        let claims = state.tokens.verify(bearer.token()).ok_or_else(|| {
            tracing::warn!("Request with an invalid or expired token");
            AppError::Forbidden("Token inválido o expirado".into())
        })?;

        Ok(AuthUser {
            owner: OwnerId::new(claims.id),
            email: claims.email,
            name: claims.nombre,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub nombre: Option<Value>,
    pub email: Option<Value>,
    pub password: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<Value>,
    pub password: Option<Value>,
}

async fn hash_in_background(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterBody>,
) -> AppResult<impl IntoResponse> {
    let mut v = Validator::new();
    let name = v.text_min_len(
        "nombre",
        body.nombre.as_ref(),
        2,
        "El nombre debe tener al menos 2 caracteres",
    );
    let email = v.email("email", body.email.as_ref(), "Email inválido");
    let password = v.password(
        "password",
        body.password.as_ref(),
        6,
        "La contraseña debe tener al menos 6 caracteres",
    );
    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(v.into_error());
    };

    let password_hash = hash_in_background(password).await?;
    let user = with_conn(&state.db, move |conn| {
        users::create_user(conn, &name, &email, &password_hash)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Usuario registrado exitosamente",
            "usuario": user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginBody>,
) -> AppResult<Json<Value>> {
    let mut v = Validator::new();
    let email = v.email("email", body.email.as_ref(), "Email inválido");
    let password = v.password(
        "password",
        body.password.as_ref(),
        1,
        "La contraseña es requerida",
    );
    let (Some(email), Some(password)) = (email, password) else {
        return Err(v.into_error());
    };

    let credentials = with_conn(&state.db, move |conn| {
        Ok(users::find_credentials_by_email(conn, &email)?)
    })
    .await?;

    let invalid = || AppError::Unauthorized("Credenciales inválidas".into());
    let Some(credentials) = credentials else {
        tracing::warn!("Login attempt for an unknown e-mail");
        return Err(invalid());
    };

    let hash = credentials.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?;
    if !valid {
        tracing::warn!(user_id = credentials.user.id, "Login attempt with a wrong password");
        return Err(invalid());
    }

    let token = state.tokens.issue(&credentials.user)?;
    tracing::info!(user_id = credentials.user.id, "User logged in");

    Ok(Json(json!({
        "usuario": credentials.user,
        "token": token,
    })))
}

pub async fn profile(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<User>> {
    let owner = auth.owner;
    let user = with_conn(&state.db, move |conn| Ok(users::get_user(conn, owner)?))
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 42,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            created_at: "2024-01-01 00:00:00".into(),
        }
    }

    #[test]
    fn test_token_round_trip_keeps_identity() {
        let keys = TokenKeys::new("secret", 7);
        let token = keys.issue(&sample_user()).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.nombre, "Ana");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = TokenKeys::new("one", 7).issue(&sample_user()).unwrap();
        assert!(TokenKeys::new("two", 7).verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = TokenKeys::new("secret", 7);
        let past = (Utc::now() - Duration::days(1)).timestamp() as usize;
        let claims = Claims {
            id: 1,
            email: "a@example.com".into(),
            nombre: "A".into(),
            exp: past,
            iat: past - 60,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(TokenKeys::new("secret", 7).verify("not.a.token").is_none());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }
}
