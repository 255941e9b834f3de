//! User account storage.
//!
//! Passwords are stored as SHA-256 digests. The original service this
//! replaces kept passwords in plaintext and enforced uniqueness on the
//! password value itself; both behaviors were dropped during the SQLite
//! migration as deliberate correctness fixes (login semantics are
//! otherwise unchanged).

use crate::error::StoreError;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use uuid::Uuid;

/// A user profile as returned to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Admin")]
    pub is_admin: bool,
}

/// Optional field updates for [`update_user`]. `None` fields are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserParams {
    pub email: Option<String>,
    pub password: Option<String>,
    pub admin: Option<bool>,
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Returns `true` if `value` has the shape of an email address.
pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Hex-encoded SHA-256 digest used for password storage and comparison.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Registers a new user and returns the generated user id.
///
/// # Errors
///
/// `Validation` for missing fields or a malformed email, `Conflict` if the
/// email is already registered.
pub fn register_user(conn: &Connection, email: &str, password: &str) -> Result<String, StoreError> {
    if email.is_empty() || password.is_empty() {
        return Err(StoreError::Validation(
            "Email and password are required.".to_string(),
        ));
    }
    if !is_email(email) {
        return Err(StoreError::Validation("Invalid email format.".to_string()));
    }

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1",
        [email],
        |row| row.get(0),
    )?;
    if exists {
        return Err(StoreError::Conflict("Email is already in use.".to_string()));
    }

    let user_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO users (id, email, password_hash, is_admin) VALUES (?1, ?2, ?3, 0)",
        params![user_id, email, hash_password(password)],
    )?;

    Ok(user_id)
}

/// Verifies credentials and returns the matching profile.
///
/// Both unknown-email and wrong-password cases return the same
/// `Unauthorized` message so callers cannot probe which emails exist.
pub fn login_user(conn: &Connection, email: &str, password: &str) -> Result<UserProfile, StoreError> {
    if email.is_empty() || password.is_empty() {
        return Err(StoreError::Validation(
            "Email and password are required.".to_string(),
        ));
    }

    let row: Option<(String, String, bool)> = conn
        .query_row(
            "SELECT id, password_hash, is_admin FROM users WHERE email = ?1",
            [email],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((user_id, stored_hash, is_admin)) = row else {
        return Err(StoreError::Unauthorized(
            "Invalid email or password.".to_string(),
        ));
    };

    if stored_hash != hash_password(password) {
        return Err(StoreError::Unauthorized(
            "Invalid email or password.".to_string(),
        ));
    }

    Ok(UserProfile {
        user_id,
        email: email.to_string(),
        is_admin,
    })
}

/// Deletes a user by id.
pub fn delete_user(conn: &Connection, user_id: &str) -> Result<(), StoreError> {
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
    if deleted == 0 {
        return Err(StoreError::NotFound(format!(
            "User with ID {user_id} not found."
        )));
    }
    Ok(())
}

/// Updates a user's email, password, or admin flag with a single atomic
/// UPDATE. Only fields that are `Some` are modified.
pub fn update_user(
    conn: &Connection,
    user_id: &str,
    updates: &UpdateUserParams,
) -> Result<(), StoreError> {
    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(email) = &updates.email {
        if !is_email(email) {
            return Err(StoreError::Validation("Invalid email format.".to_string()));
        }
        set_parts.push(format!("email = ?{}", idx));
        values.push(Box::new(email.clone()));
        idx += 1;
    }
    if let Some(password) = &updates.password {
        if password.is_empty() {
            return Err(StoreError::Validation(
                "Password must not be empty.".to_string(),
            ));
        }
        set_parts.push(format!("password_hash = ?{}", idx));
        values.push(Box::new(hash_password(password)));
        idx += 1;
    }
    if let Some(admin) = updates.admin {
        set_parts.push(format!("is_admin = ?{}", idx));
        values.push(Box::new(admin));
        idx += 1;
    }

    if set_parts.is_empty() {
        return Err(StoreError::Validation("No fields to update.".to_string()));
    }

    let sql = format!(
        "UPDATE users SET {} WHERE id = ?{}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(user_id.to_string()));

    let updated = conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
    if updated == 0 {
        return Err(StoreError::NotFound(format!(
            "User with ID {user_id} not found."
        )));
    }
    Ok(())
}

/// Fetches a profile by user id.
pub fn get_user_by_id(conn: &Connection, user_id: &str) -> Result<UserProfile, StoreError> {
    conn.query_row(
        "SELECT id, email, is_admin FROM users WHERE id = ?1",
        [user_id],
        |row| {
            Ok(UserProfile {
                user_id: row.get(0)?,
                email: row.get(1)?,
                is_admin: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("User with ID {user_id} not found.")))
}

/// Lists every registered user.
///
/// # Errors
///
/// `NotFound` when the user table is empty.
pub fn get_all_users(conn: &Connection) -> Result<Vec<UserProfile>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, email, is_admin FROM users ORDER BY email ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(UserProfile {
            user_id: row.get(0)?,
            email: row.get(1)?,
            is_admin: row.get(2)?,
        })
    })?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    if users.is_empty() {
        return Err(StoreError::NotFound(
            "No users found in the database.".to_string(),
        ));
    }
    Ok(users)
}

/// Resolves an email to its user id.
pub fn get_user_id_by_email(conn: &Connection, email: &str) -> Result<String, StoreError> {
    conn.query_row("SELECT id FROM users WHERE email = ?1", [email], |row| {
        row.get(0)
    })
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("No user found for email {email}.")))
}

/// Flips the admin flag for the user with the given email.
///
/// When `requesting_user_id` is supplied, that user must currently be an
/// admin; otherwise the call is refused with `PermissionDenied`.
///
/// Returns the target's user id and the new admin status.
pub fn toggle_admin_status_by_email(
    conn: &Connection,
    requesting_user_id: Option<&str>,
    email: &str,
) -> Result<(String, bool), StoreError> {
    if let Some(requester) = requesting_user_id {
        let is_admin: Option<bool> = conn
            .query_row(
                "SELECT is_admin FROM users WHERE id = ?1",
                [requester],
                |row| row.get(0),
            )
            .optional()?;
        if !is_admin.unwrap_or(false) {
            return Err(StoreError::PermissionDenied(
                "Only admins can toggle admin status.".to_string(),
            ));
        }
    }

    let target: Option<(String, bool)> = conn
        .query_row(
            "SELECT id, is_admin FROM users WHERE email = ?1",
            [email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((user_id, current)) = target else {
        return Err(StoreError::NotFound(format!(
            "No user found for email {email}."
        )));
    };

    let new_status = !current;
    conn.execute(
        "UPDATE users SET is_admin = ?1 WHERE id = ?2",
        params![new_status, user_id],
    )?;

    Ok((user_id, new_status))
}
