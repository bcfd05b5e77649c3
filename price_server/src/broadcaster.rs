//! Periodic price broadcast.
//!
//! `BroadcastLoop` runs a background thread that, on every timer tick, advances the
//! simulated prices and hands each subscribed session its slice of the table (see
//! `ServerState::broadcast_cycle`). Cycles run one after another on that single
//! thread; the timer channel holds at most one pending tick, so a slow cycle delays
//! the next one instead of stacking them up.

use crate::state::ServerState;
use crossbeam_channel::{Sender, bounded, select, tick};
use log::{debug, error, info};
use price_common::{Result, StreamError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Background broadcast task.
pub struct BroadcastLoop;

/// Handle of a running broadcast thread.
pub struct BroadcastHandle {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl BroadcastLoop {
    /// Start the broadcast thread with one cycle every `interval`.
    pub fn start(state: Arc<ServerState>, interval: Duration) -> BroadcastHandle {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::spawn(move || {
            let ticker = tick(interval);
            info!("Broadcast loop started, interval {:?}", interval);

            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => match state.broadcast_cycle() {
                        Ok(delivered) => debug!("Broadcast cycle delivered {} messages", delivered),
                        Err(e) => error!("Broadcast cycle failed: {}", e),
                    },
                }
            }
            info!("Broadcast loop stopped");
        });

        BroadcastHandle { stop_tx, handle }
    }
}

impl BroadcastHandle {
    /// Signal the thread to stop and wait for it to finish.
    pub fn stop(self) -> Result<()> {
        let _ = self.stop_tx.try_send(());
        self.handle
            .join()
            .map_err(|_| StreamError::ChannelRecv("broadcast thread panicked".into()))
    }
}
