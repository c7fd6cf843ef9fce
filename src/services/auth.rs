//! Authentication service: password hashing, JWT issuance, login, and user provisioning.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::user::{CreateUser, RoleSet, User};

/// Failed logins allowed before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 3;

const LOCKOUT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims embedded in access and refresh tokens.
///
/// Roles are deliberately absent: they are read from `users` on every request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: Uuid,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned on successful login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Signing secret and lifetimes used when issuing tokens.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub access_secs: i64,
    pub refresh_secs: i64,
}

impl From<&AppConfig> for TokenSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            access_secs: config.jwt_access_token_expiry_secs,
            refresh_secs: config.jwt_refresh_token_expiry_secs,
        }
    }
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn sign(user: &User, kind: TokenKind, lifetime_secs: i64, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        kind,
        exp: (now + Duration::seconds(lifetime_secs)).timestamp(),
        iat: now.timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
}

/// Issue an access and refresh token for `user`.
pub fn issue_tokens(user: &User, settings: &TokenSettings) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: sign(user, TokenKind::Access, settings.access_secs, &settings.secret)?,
        refresh_token: sign(user, TokenKind::Refresh, settings.refresh_secs, &settings.secret)?,
        token_type: "Bearer".to_string(),
        expires_in: settings.access_secs,
    })
}

/// Decode a token and check it is of the expected kind.
pub fn decode_token(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, AppError> {
    let claims = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)?;

    if claims.kind != expected {
        return Err(AppError::Unauthorized);
    }
    Ok(claims)
}

/// Counter and lock deadline to store after one more failed attempt.
fn record_failure(previous_attempts: i32, now: DateTime<Utc>) -> (i32, Option<DateTime<Utc>>) {
    let attempts = previous_attempts + 1;
    let locked_until =
        (attempts >= MAX_FAILED_ATTEMPTS).then(|| now + Duration::minutes(LOCKOUT_MINUTES));
    (attempts, locked_until)
}

fn is_locked(user: &User, now: DateTime<Utc>) -> bool {
    user.locked_until.is_some_and(|until| until > now)
}

/// Create a user with a hashed password. Emails are stored lower-cased.
pub async fn create_user(pool: &PgPool, input: &CreateUser) -> Result<User, AppError> {
    let roles: RoleSet = input.roles.iter().copied().collect();
    if roles.is_empty() {
        return Err(AppError::Validation("At least one role is required".to_string()));
    }

    if let Some(manager_id) = input.manager_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(manager_id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(AppError::Validation("manager_id does not name a user".to_string()));
        }
    }

    let password_hash = hash_password(&input.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, name, roles, manager_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(input.email.trim().to_ascii_lowercase())
    .bind(&password_hash)
    .bind(input.name.trim())
    .bind(roles.to_tags())
    .bind(input.manager_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Email already exists".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(user_id = %user.id, roles = ?user.roles, "User created");
    Ok(user)
}

/// Authenticate by email and password. Every failure answers 401.
pub async fn login(
    pool: &PgPool,
    settings: &TokenSettings,
    email: &str,
    password: &str,
) -> Result<TokenPair, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.trim().to_ascii_lowercase())
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let now = Utc::now();
    if is_locked(&user, now) || !user.is_active {
        return Err(AppError::Unauthorized);
    }

    if !verify_password(password, &user.password_hash)? {
        let (attempts, locked_until) = record_failure(user.failed_login_attempts, now);
        sqlx::query(
            "UPDATE users SET failed_login_attempts = $1, locked_until = $2 WHERE id = $3",
        )
        .bind(attempts)
        .bind(locked_until)
        .bind(user.id)
        .execute(pool)
        .await?;
        if locked_until.is_some() {
            tracing::warn!(user_id = %user.id, attempts, "Account locked after failed logins");
        }
        return Err(AppError::Unauthorized);
    }

    sqlx::query(
        "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, last_login = NOW() WHERE id = $1",
    )
    .bind(user.id)
    .execute(pool)
    .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    issue_tokens(&user, settings)
}

/// Exchange a refresh token for a new pair. The user must still be active.
pub async fn refresh(
    pool: &PgPool,
    settings: &TokenSettings,
    refresh_token: &str,
) -> Result<TokenPair, AppError> {
    let claims = decode_token(refresh_token, &settings.secret, TokenKind::Refresh)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = true")
        .bind(claims.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    issue_tokens(&user, settings)
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
}
