// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

/// Outbound notification channel used for operator-facing messages.
///
/// Delivery to the actual chat webhooks is owned by the messaging layer;
/// implementations only have to hand the message over.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> anyhow::Result<()>;
}
