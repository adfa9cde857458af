// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User record operations: existence checks and notification tokens.

use rusqlite::params;
use valet_core::ValetError;

use crate::database::{Database, map_tr_err};

/// Insert a new user record. Fails if the uid or username already exists.
pub async fn create_user(db: &Database, uid: &str, username: &str) -> Result<(), ValetError> {
    let uid = uid.to_string();
    let username = username.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (uid, username) VALUES (?1, ?2)",
                params![uid, username],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Returns true if a user record exists for `uid`.
pub async fn user_exists(db: &Database, uid: &str) -> Result<bool, ValetError> {
    let uid = uid.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE uid = ?1",
                params![uid],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Store (or replace) the user's notification token.
///
/// Errors if the user does not exist: an unknown uid at this boundary is
/// an authorization failure upstream, not a row to create.
pub async fn set_notification_token(
    db: &Database,
    uid: &str,
    token: &str,
) -> Result<(), ValetError> {
    let owned_uid = uid.to_string();
    let token = token.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE users SET notification_token = ?2 WHERE uid = ?1",
                params![owned_uid, token],
            )?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)?;

    if updated == 0 {
        return Err(ValetError::Storage {
            source: format!("no user record for uid {uid} while storing token").into(),
        });
    }
    Ok(())
}

/// Returns the user's notification token. `None` when the user has no
/// token registered (a valid state) or the token is empty.
pub async fn notification_token(db: &Database, uid: &str) -> Result<Option<String>, ValetError> {
    let uid = uid.to_string();
    db.connection()
        .call(move |conn| {
            let token: Option<Option<String>> = conn
                .query_row(
                    "SELECT notification_token FROM users WHERE uid = ?1",
                    params![uid],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(token.flatten().filter(|t| !t.is_empty()))
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_check_user() {
        let (db, _dir) = setup_db().await;

        create_user(&db, "alice-uid", "alice").await.unwrap();
        assert!(user_exists(&db, "alice-uid").await.unwrap());
        assert!(!user_exists(&db, "nobody").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (db, _dir) = setup_db().await;

        create_user(&db, "u1", "alice").await.unwrap();
        assert!(create_user(&db, "u2", "alice").await.is_err());
    }

    #[tokio::test]
    async fn notification_token_roundtrip() {
        let (db, _dir) = setup_db().await;

        create_user(&db, "bob-uid", "bob").await.unwrap();
        assert_eq!(notification_token(&db, "bob-uid").await.unwrap(), None);

        set_notification_token(&db, "bob-uid", "fcm-token-1")
            .await
            .unwrap();
        assert_eq!(
            notification_token(&db, "bob-uid").await.unwrap(),
            Some("fcm-token-1".to_string())
        );

        // Re-registration replaces the token.
        set_notification_token(&db, "bob-uid", "fcm-token-2")
            .await
            .unwrap();
        assert_eq!(
            notification_token(&db, "bob-uid").await.unwrap(),
            Some("fcm-token-2".to_string())
        );
    }

    #[tokio::test]
    async fn token_for_unknown_user_errors_on_set_not_on_get() {
        let (db, _dir) = setup_db().await;

        assert!(set_notification_token(&db, "ghost", "tok").await.is_err());
        // Reading for an unknown uid is None, not an error: callers treat
        // missing tokens as "skip notification".
        assert_eq!(notification_token(&db, "ghost").await.unwrap(), None);
    }
}
