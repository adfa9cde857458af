// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the single serialized connection.

pub mod queue;
pub mod users;
