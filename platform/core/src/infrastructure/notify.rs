// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use tracing::info;

use crate::domain::notify::NotificationDispatch;
use crate::domain::tenant::UserId;

/// Notification dispatcher that logs instead of delivering. Stands in for
/// the out-of-scope email/SMS subsystem in development and tests.
#[derive(Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationDispatch for TracingNotifier {
    fn dispatch(&self, recipient: UserId, message: &str) {
        info!(recipient = %recipient, message, "notification dispatched");
    }
}
