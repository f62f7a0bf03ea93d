// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::tenant::UserId;

/// Boundary to the notification subsystem. Fire-and-forget: workflow
/// operations never await delivery and never fail because of it.
pub trait NotificationDispatch: Send + Sync {
    fn dispatch(&self, recipient: UserId, message: &str);
}
