//! Long-poll loop feeding the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use dispatch::Dispatcher;

use crate::api::UpdateSource;
use crate::config::BotConfig;

const RETRY_PAUSE: Duration = Duration::from_secs(3);

/// Signals a running [`Poller`] to stop after its current iteration.
#[derive(Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// getUpdates loop.
///
/// The offset advances to `last update_id + 1` after each successful fetch,
/// before the batch is dispatched, so a handler failure never causes a
/// redelivery. Transport errors are logged and retried after a short pause.
pub struct Poller {
    source: Arc<dyn UpdateSource>,
    dispatcher: Arc<Dispatcher>,
    poll_timeout_secs: u64,
    batch_limit: u32,
    stop_rx: watch::Receiver<bool>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        dispatcher: Arc<Dispatcher>,
        config: &BotConfig,
    ) -> (Self, StopHandle) {
        let (tx, stop_rx) = watch::channel(false);
        let poller = Poller {
            source,
            dispatcher,
            poll_timeout_secs: config.poll_timeout_secs,
            batch_limit: config.batch_limit,
            stop_rx,
        };
        (poller, StopHandle { tx: Arc::new(tx) })
    }

    /// Runs until the stop handle fires. Never returns on transport errors.
    pub async fn run(mut self) {
        info!(
            timeout = self.poll_timeout_secs,
            limit = self.batch_limit,
            "step: starting long-poll loop"
        );
        let mut offset: i64 = 0;

        loop {
            if *self.stop_rx.borrow() {
                break;
            }

            let batch = tokio::select! {
                _ = self.stop_rx.changed() => break,
                batch = self.source.get_updates(offset, self.batch_limit, self.poll_timeout_secs) => batch,
            };

            match batch {
                Ok(updates) => {
                    if updates.is_empty() {
                        continue;
                    }
                    if let Some(last) = updates.last() {
                        offset = last.update_id + 1;
                    }
                    self.dispatcher.process_new_updates(updates).await;
                }
                Err(err) => {
                    error!(error = %err, "polling failed, retrying");
                    tokio::select! {
                        _ = self.stop_rx.changed() => break,
                        _ = tokio::time::sleep(RETRY_PAUSE) => {}
                    }
                }
            }
        }

        info!("step: long-poll loop stopped");
    }
}
