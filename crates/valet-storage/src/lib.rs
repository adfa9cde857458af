// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Valet assistant backend.
//!
//! Holds user records (including push notification tokens) and the
//! per-user durable message queue that backs offline delivery. All writes
//! go through one serialized connection so the queue's atomic
//! read-then-clear drain holds under concurrent access.

pub mod adapter;
pub mod database;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
