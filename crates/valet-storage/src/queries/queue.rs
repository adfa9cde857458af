// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user durable message queue: append and atomic drain.
//!
//! Every mutation flows through the single serialized connection, and
//! drain runs SELECT + DELETE inside one transaction, so read-then-clear
//! is never observable as two steps. An enqueue racing a drain lands
//! wholly before the drain (included in the result) or wholly after it
//! (left in the now-empty queue), never in between.

use rusqlite::params;
use valet_core::{DeliveryPayload, ValetError};

use crate::database::{Database, map_queue_err};

/// Append a payload to the tail of the user's queue. Returns the queue
/// entry id.
pub async fn enqueue(db: &Database, uid: &str, payload: &DeliveryPayload) -> Result<i64, ValetError> {
    let uid = uid.to_string();
    let payload_json = serde_json::to_string(payload).map_err(|e| ValetError::QueueStore {
        source: Box::new(e),
    })?;

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO message_queue (uid, payload) VALUES (?1, ?2)",
                params![uid, payload_json],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_queue_err)
}

/// Atomically read the user's entire queue in insertion order and clear it.
///
/// Returns the payloads oldest-first. Entries whose stored JSON no longer
/// parses are dropped with a warning rather than wedging the whole queue.
pub async fn drain(db: &Database, uid: &str) -> Result<Vec<DeliveryPayload>, ValetError> {
    let uid = uid.to_string();

    let rows: Vec<String> = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let rows = {
                let mut stmt = tx.prepare(
                    "SELECT payload FROM message_queue WHERE uid = ?1 ORDER BY id ASC",
                )?;
                stmt.query_map(params![uid], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?
            };

            tx.execute("DELETE FROM message_queue WHERE uid = ?1", params![uid])?;
            tx.commit()?;

            Ok(rows)
        })
        .await
        .map_err(map_queue_err)?;

    let mut payloads = Vec::with_capacity(rows.len());
    for raw in rows {
        match serde_json::from_str::<DeliveryPayload>(&raw) {
            Ok(payload) => payloads.push(payload),
            Err(e) => {
                tracing::warn!(error = %e, "dropping undecodable queue entry");
            }
        }
    }
    Ok(payloads)
}

/// Number of pending entries in the user's queue.
pub async fn len(db: &Database, uid: &str) -> Result<usize, ValetError> {
    let uid = uid.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM message_queue WHERE uid = ?1",
                params![uid],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
        .map_err(map_queue_err)
}
