use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::Drawer;

/// Background refresh of a [`Drawer`]. Runs until stopped or dropped.
pub struct Poller {
    close: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Refreshes the unread total right away, then calls
    /// [`Drawer::poll_tick`] every `period`.
    pub fn spawn(drawer: Drawer, period: Duration) -> Self {
        let close = Arc::new(Notify::new());
        let handle = tokio::spawn(run(drawer, period, close.clone()));

        Self {
            close,
            handle: Some(handle),
        }
    }

    pub async fn stop(mut self) {
        self.close.notify_one();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("drawer poller failed: {e}");
                }
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(drawer: Drawer, period: Duration, close: Arc<Notify>) {
    drawer.refresh_unread().await;

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = close.notified() => {
                debug!("drawer poller stopped");
                break;
            }
            _ = ticker.tick() => drawer.poll_tick().await,
        }
    }
}
