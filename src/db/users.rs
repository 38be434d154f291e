//! User account repository.

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::DatabaseError;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

/// Insert a new user. Duplicate username/email surfaces as
/// [`DatabaseError::ConstraintViolation`].
pub fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, DatabaseError> {
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now().naive_utc(),
    };

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.password_hash,
            user.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation("username or email already registered".into())
        }
        other => DatabaseError::Sqlite(other),
    })?;

    Ok(user)
}

/// Find a user by username or email (the login identifier).
pub fn find_by_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT id, username, email, password_hash, created_at
             FROM users WHERE username = ?1 OR email = ?1",
            params![identifier],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn username_exists(conn: &Connection, username: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(4)?;
    Ok(User {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn insert_and_find_by_username_or_email() {
        let conn = open_memory_database().unwrap();
        let user = insert_user(&conn, "ada", "ada@example.com", "hash").unwrap();

        let by_name = find_by_identifier(&conn, "ada").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_name.email, "ada@example.com");

        let by_email = find_by_identifier(&conn, "ada@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[test]
    fn unknown_identifier_finds_nothing() {
        let conn = open_memory_database().unwrap();
        assert!(find_by_identifier(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_a_constraint_violation() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, "ada", "ada@example.com", "hash").unwrap();

        let err = insert_user(&conn, "ada", "other@example.com", "hash").unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn duplicate_email_is_a_constraint_violation() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, "ada", "ada@example.com", "hash").unwrap();

        let err = insert_user(&conn, "grace", "ada@example.com", "hash").unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn exists_checks() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, "ada", "ada@example.com", "hash").unwrap();

        assert!(username_exists(&conn, "ada").unwrap());
        assert!(!username_exists(&conn, "grace").unwrap());
        assert!(email_exists(&conn, "ada@example.com").unwrap());
        assert!(!email_exists(&conn, "grace@example.com").unwrap());
    }
}
