// src/server/reload.rs

//! Reload notification channel.
//!
//! Pipelines call [`ReloadHub::notify`] when they finish writing; every
//! connected browser holds a subscription through the SSE endpoint and
//! refreshes on the next event. Notifications have no payload: "something
//! under the build tree changed" is the whole message.

use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<()>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Push a reload notification. With no browser connected this is a
    /// no-op.
    pub fn notify(&self) {
        let receivers = self.tx.send(()).unwrap_or(0);
        debug!(receivers, "reload notification sent");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_notifications() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();
        hub.notify();
        rx.recv().await.unwrap();
    }

    #[test]
    fn notify_without_subscribers_is_fine() {
        ReloadHub::new().notify();
    }
}
