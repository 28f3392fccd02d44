//! Connection-health supervision: the signal dispatcher, the system-state
//! poller and the reconnect loop. Each runs as a task over the shared
//! [`ClientInner`](crate::client::ClientInner); decisions (link down, caches
//! flushed, reconnect) live on the inner client itself.

use crate::client::ClientInner;
use crate::link::LinkSignal;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Drains one link's signal stream: notifications to the dispatch map,
/// router notes to the supervisor, the closed signal to link-down handling.
/// Ends with the link.
pub(crate) async fn dispatcher_loop(
    inner: Arc<ClientInner>,
    mut signals: mpsc::UnboundedReceiver<LinkSignal>,
) {
    while let Some(signal) = signals.recv().await {
        match signal {
            LinkSignal::Notification(notification) => {
                inner.dispatch_notification(notification).await;
            }
            LinkSignal::RouterNote(note) => {
                inner.on_router_note(note.state).await;
            }
            LinkSignal::Closed(reason) => {
                inner.handle_link_down(&reason).await;
                return;
            }
        }
    }
}

/// Polls the system service's ADS state every `check_state_interval`.
///
/// A state away from `Run` (after having seen `Run`) and a poll failing for
/// longer than `connection_down_delay` both declare the link down.
pub(crate) async fn state_poller_loop(inner: Arc<ClientInner>) {
    let interval = inner.settings().check_state_interval;
    let down_delay = inner.settings().connection_down_delay;
    let mut last_ok = Instant::now();

    loop {
        sleep(interval).await;
        if !inner.is_connected() {
            return;
        }

        match inner.read_system_state().await {
            Ok(response) => {
                last_ok = Instant::now();
                let left_run = inner.note_system_state(response.ads_state);
                if left_run {
                    warn!(state = %response.ads_state, "system manager left Run");
                    inner.handle_link_down("system manager left Run").await;
                    return;
                }
            }
            Err(e) => {
                debug!(error = %e, "system state poll failed");
                if last_ok.elapsed() > down_delay {
                    inner
                        .handle_link_down("system state polling failed continuously")
                        .await;
                    return;
                }
            }
        }
    }
}

/// Retries a full reconnect every `reconnect_interval` until it succeeds or
/// the client is closed. On success the quarantined subscriptions are
/// re-registered and `Reconnect` is emitted.
pub(crate) async fn reconnect_loop(inner: Arc<ClientInner>) {
    let interval = inner.settings().reconnect_interval;

    loop {
        sleep(interval).await;
        if inner.is_closed() {
            return;
        }

        match inner.try_reconnect().await {
            Ok(()) => return,
            Err(e) => {
                debug!(error = %e, "reconnect attempt failed, re-arming");
            }
        }
    }
}
