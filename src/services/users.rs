use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::{is_unique_violation, JournalError};
use crate::models::User;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Verified against when the email is unknown, so a miss costs the same as a
/// wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("no account has this password").unwrap_or_default());

#[derive(FromRow)]
struct Credentials {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    created_at: String,
}

impl Credentials {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, JournalError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| JournalError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

pub fn validate_registration(username: &str, email: &str, password: &str) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    if username.trim().is_empty() {
        errors.insert("username".to_string(), "Username is required".to_string());
    }

    let email = email.trim();
    if email.is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        errors.insert("email".to_string(), "Email address is not valid".to_string());
    }

    if password.len() < MIN_PASSWORD_LEN {
        errors.insert(
            "password".to_string(),
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    errors
}

/// Registers a new user with a salted argon2 password hash.
pub async fn register(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, JournalError> {
    let errors = validate_registration(username, email, password);
    if !errors.is_empty() {
        return Err(JournalError::Validation(errors));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    let password_hash = hash_password(password)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)"
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&password_hash)
    .bind(&user.created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            JournalError::DuplicateUser
        } else {
            JournalError::Database(e)
        }
    })?;

    tx.commit().await?;
    Ok(user)
}

/// Looks up the user by email and checks the password. An unknown email and
/// a wrong password both yield `None`.
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<Option<User>, JournalError> {
    let credentials: Option<Credentials> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;

    match credentials {
        Some(c) if verify_password(password, &c.password_hash) => Ok(Some(c.into_user())),
        Some(_) => Ok(None),
        None => {
            verify_password(password, &DUMMY_HASH);
            Ok(None)
        }
    }
}
