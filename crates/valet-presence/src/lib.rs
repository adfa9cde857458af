// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence tracking for the Valet assistant backend.
//!
//! Records, for each user, whether a live connection exists anywhere in
//! the worker fleet, plus the connection-id-to-uid reverse mapping needed
//! to clean up on disconnect. Backed by Redis in production
//! ([`RedisPresence`]) and by a process-local map for tests and
//! single-worker runs ([`MemoryPresence`]).
//!
//! Presence is ephemeral by design: it is never stored on the user record,
//! and `mark_offline` must succeed from connection-teardown notification
//! alone so abnormal disconnects cannot leave a user permanently marked
//! online.

pub mod memory;
pub mod redis_store;

pub use memory::MemoryPresence;
pub use redis_store::RedisPresence;
