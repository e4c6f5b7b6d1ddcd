// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Reload signals for configuration consumers
//
// In-process broadcast of ConfigEvent using tokio broadcast channels.
// The queue bridge that forwards these to remote agents subscribes here.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::document::ConfigDomain;
use crate::domain::events::ConfigEvent;
use crate::domain::notifier::Notifier;

/// Event bus for publishing and subscribing to configuration events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<ConfigEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before slow
    /// subscribers start lagging
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (256)
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ConfigEvent) {
        debug!("Publishing config event: {:?}", event);

        // send() only fails when nobody is subscribed
        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("No subscribers listening to config event");
        }
    }

    /// Subscribe to all configuration events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe and filter for one configuration domain
    pub fn subscribe_domain(&self, domain: ConfigDomain) -> DomainEventReceiver {
        DomainEventReceiver {
            receiver: self.sender.subscribe(),
            domain,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiver for all configuration events
pub struct EventReceiver {
    receiver: broadcast::Receiver<ConfigEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<ConfigEvent, EventBusError> {
        self.receiver.recv().await.map_err(map_recv_error)
    }

    /// Try to receive an event without waiting
    pub fn try_recv(&mut self) -> Result<ConfigEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver for document changes of a single domain
pub struct DomainEventReceiver {
    receiver: broadcast::Receiver<ConfigEvent>,
    domain: ConfigDomain,
}

impl DomainEventReceiver {
    /// Receive the next `DocumentChanged` event for the subscribed domain
    pub async fn recv(&mut self) -> Result<ConfigEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(map_recv_error)?;
            if let ConfigEvent::DocumentChanged { domain, .. } = &event {
                if *domain == self.domain {
                    return Ok(event);
                }
            }
        }
    }
}

fn map_recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus closed")]
    Closed,
    #[error("Receiver lagged by {0} events")]
    Lagged(u64),
    #[error("No events available")]
    Empty,
}

/// [`Notifier`] that hands messages to whoever delivers notifications by
/// publishing them on the bus.
pub struct EventBusNotifier {
    bus: EventBus,
}

impl EventBusNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Notifier for EventBusNotifier {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        self.bus.publish(ConfigEvent::NotificationRequested {
            message: message.to_string(),
            requested_at: Utc::now(),
        });
        Ok(())
    }
}
