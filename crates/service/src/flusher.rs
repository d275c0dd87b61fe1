//! Background task that flushes dirty store state on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::store::Store;

pub struct FlushWorker {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FlushWorker {
    pub fn spawn(store: Arc<Store>, interval: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;
            info!(interval_secs = interval.as_secs_f64(), "flush worker started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // a stop request abandons an in-flight flush; the final flush on shutdown redoes it
                        tokio::select! {
                            res = store.flush_if_dirty() => match res {
                                Ok(Some(report)) => debug!(revision = report.revision, bytes = report.bytes, "timer_flush"),
                                Ok(None) => {}
                                Err(e) => warn!(error = %e, "timer flush failed, will retry"),
                            },
                            _ = &mut stop_rx => {
                                debug!("timer flush abandoned on stop");
                                break;
                            }
                        }
                    }
                    _ = &mut stop_rx => break,
                }
            }
            info!("flush worker stopped");
        });
        Self { stop_tx: Some(stop_tx), handle: Some(handle) }
    }

    /// Signal the task and wait for it to exit. An in-flight flush is dropped, not awaited.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "flush worker join failed");
            }
        }
    }
}

impl Drop for FlushWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
