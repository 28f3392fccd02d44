//! Out-of-band events emitted by the engine.

use adskit_core::ads::AdsState;
use adskit_core::ams::RouterState;
use tokio::sync::broadcast;

/// Capacity of the event channel. Slow receivers miss old events rather than
/// backpressure the engine.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Kind tag for [`ClientEvent::ClientError`] diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A response arrived for an invoke id with no pending request.
    StaleResponse,
    /// A notification sample referenced an unknown handle.
    UnknownNotificationHandle,
    /// A notification payload failed to parse; only that packet was dropped.
    NotificationParseError,
    /// A received packet was addressed to someone else and was dropped.
    MisroutedPacket,
    /// A quarantined subscription could not be re-registered after a
    /// reconnect or symbol-version change.
    ResubscriptionFailed,
}

/// Events a client emits while running. Subscribe via
/// [`AdsClient::events`](crate::AdsClient::events).
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Connection is up and the local port is registered.
    Connect,
    /// Connection was closed on request.
    Disconnect,
    /// Connection came back after a loss; subscriptions are restored.
    Reconnect,
    /// Connection went down unexpectedly.
    ConnectionLost,
    /// The local router changed state.
    RouterStateChange { from: Option<RouterState>, to: RouterState },
    /// The system manager (system service) changed state.
    SystemManagerStateChange { from: Option<AdsState>, to: AdsState },
    /// The PLC runtime changed state.
    PlcRuntimeStateChange { from: Option<AdsState>, to: AdsState },
    /// The target's symbol version changed; caches were flushed.
    SymbolVersionChange { from: Option<u8>, to: u8 },
    /// An out-of-band problem that did not fail any particular request.
    ClientError { kind: DiagnosticKind, detail: String },
}

/// Broadcast bus for [`ClientEvent`]s.
///
/// Cloned senders all feed the same channel; receivers get every event from
/// subscription time onward.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Creates a new bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribes to events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Emits an event. Nobody listening is fine.
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.sender.send(event);
    }

    /// Emits a diagnostic event.
    pub fn diagnostic(&self, kind: DiagnosticKind, detail: impl Into<String>) {
        self.emit(ClientEvent::ClientError {
            kind,
            detail: detail.into(),
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
