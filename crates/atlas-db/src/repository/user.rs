//! # User Repository
//!
//! Cashier accounts and password hashing for HTTP Basic authentication.
//!
//! Passwords are stored as argon2 hashes; verification parses the stored
//! PHC string, so hash parameters can evolve without migrating rows.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atlas_core::User;

/// Repository for cashier accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets an active user by login, or None.
    pub async fn get_by_login(&self, login: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, is_active, created_at
            FROM users
            WHERE login = ?1 AND is_active = 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Creates a user with the given cleartext password (seed/admin use).
    pub async fn create(&self, login: &str, password: &str) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            login: login.to_string(),
            password_hash: hash_password(password)?,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(login = %user.login, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, login, password_hash, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
