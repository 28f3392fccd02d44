//! One live connection to the router: the TCP stream, the reader task that
//! demultiplexes incoming frames, the pending-request registry and the port
//! registration handshake.
//!
//! A [`Link`] is immutable once opened; reconnection builds a fresh one.

pub mod registry;

pub use registry::{AdsResponse, RequestRegistry};

use crate::error::{ClientError, Result};
use crate::events::{DiagnosticKind, EventBus};
use crate::settings::ClientSettings;
use adskit_core::ads::{AdsCommandId, AdsHeader, InvokeId, StateFlags};
use adskit_core::ams::{AmsAddr, AmsCommand, AmsNetId, AmsPort, AmsTcpHeader};
use adskit_core::io::{AmsFrame, AmsStream, FrameWriter};
use adskit_core::payload::{Notification, PortCloseRequest, PortConnectRequest,
    PortConnectResponse, RouterNote};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

/// Upper bound on waiting for the router to close the socket after
/// `PORT_CLOSE`. Routers that send `end` without `close` resolve through the
/// same EOF path; past this the socket is force-dropped.
const UNREGISTER_GRACE: Duration = Duration::from_secs(1);

/// Events the reader task surfaces beyond request responses.
#[derive(Debug)]
pub enum LinkSignal {
    /// A pushed notification packet.
    Notification(Notification),
    /// A router state note.
    RouterNote(RouterNote),
    /// The connection died (read error or EOF). Not sent on requested close.
    Closed(String),
}

/// A live, registered connection.
pub struct Link {
    local_addr: AmsAddr,
    /// Port to unregister on close; `None` in bypass mode.
    registered_port: Option<AmsPort>,
    registry: Arc<RequestRegistry>,
    writer: Mutex<FrameWriter<OwnedWriteHalf>>,
    invoke_id: AtomicU32,
    request_timeout: Duration,
    closing: Arc<AtomicBool>,
    reader_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Link {
    /// Connects to the router, performs the port handshake (unless bypassed)
    /// and spawns the reader task.
    ///
    /// Returns the link and the receiver for notifications, router notes and
    /// the closed signal.
    pub async fn open(
        settings: &ClientSettings,
        events: EventBus,
    ) -> Result<(Arc<Self>, mpsc::UnboundedReceiver<LinkSignal>)> {
        let mut stream = match settings.local_bind_addr() {
            Some(local) => {
                let remote = tokio::net::lookup_host(settings.router_socket_addr())
                    .await?
                    .next()
                    .ok_or_else(|| {
                        ClientError::Registration("router address did not resolve".into())
                    })?;
                AmsStream::connect_from(local, remote, settings.timeout).await?
            }
            None => AmsStream::connect(settings.router_socket_addr(), settings.timeout).await?,
        };
        debug!(router = %settings.router_socket_addr(), "tcp connected");

        let (local_addr, registered_port) = if settings.bypasses_registration() {
            let addr = AmsAddr::new(
                settings.local_net_id.unwrap_or(AmsNetId::LOCAL),
                settings.local_port.unwrap_or(0),
            );
            debug!(%addr, "using fixed local address, skipping registration");
            (addr, None)
        } else {
            let addr = register_port(&mut stream, settings).await?;
            debug!(%addr, "port registered");
            (addr, Some(addr.port()))
        };

        let (reader, writer) = stream.into_split();
        let registry = Arc::new(RequestRegistry::new());
        let closing = Arc::new(AtomicBool::new(false));
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let reader_task = tokio::spawn(reader_loop(
            reader,
            Arc::clone(&registry),
            signal_tx,
            events,
            local_addr,
            Arc::clone(&closing),
        ));

        let link = Arc::new(Self {
            local_addr,
            registered_port,
            registry,
            writer: Mutex::new(writer),
            invoke_id: AtomicU32::new(1),
            request_timeout: settings.timeout,
            closing,
            reader_task: std::sync::Mutex::new(Some(reader_task)),
        });

        Ok((link, signal_rx))
    }

    /// The local AMS address (router-assigned or configured).
    pub fn local_addr(&self) -> AmsAddr {
        self.local_addr
    }

    /// Sends one ADS command to `target` and awaits the matching response.
    ///
    /// Exactly one of response/timeout/teardown resolves the call. On
    /// timeout the pending entry is evicted, so a late reply goes down the
    /// stale-response path.
    pub async fn request(
        &self,
        target: AmsAddr,
        command: AdsCommandId,
        body: Vec<u8>,
    ) -> Result<AdsResponse> {
        if self.closing.load(Ordering::SeqCst) {
            return Err(ClientError::NotConnected);
        }

        let invoke_id = self.next_invoke_id();
        let header = AdsHeader::request(
            target,
            self.local_addr,
            command,
            body.len() as u32,
            invoke_id,
        );

        let mut payload = Vec::with_capacity(AdsHeader::LENGTH + body.len());
        payload.extend_from_slice(&header.to_bytes());
        payload.extend_from_slice(&body);
        let frame = AmsFrame::from_parts(
            AmsTcpHeader::new(AmsCommand::AdsCommand, payload.len() as u32),
            payload,
        );

        let (tx, rx) = oneshot::channel();
        self.registry.insert(invoke_id, tx);
        trace!(invoke_id, ?command, %target, "request out");

        if let Err(e) = self.write_frame(&frame).await {
            self.registry.take(invoke_id);
            return Err(e);
        }

        match timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            // Responder dropped: the registry was drained by teardown.
            Ok(Err(_)) => Err(ClientError::ConnectionLost),
            Err(_) => {
                // The timer and the reader race for the entry; whoever takes
                // it resolves the request.
                self.registry.take(invoke_id);
                trace!(invoke_id, "request timed out");
                Err(ClientError::Timeout)
            }
        }
    }

    /// Writes a raw frame (router-level packets).
    pub async fn write_frame(&self, frame: &AmsFrame) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_frame(frame).await.map_err(ClientError::from)
    }

    /// Number of requests currently in flight.
    pub fn pending_requests(&self) -> usize {
        self.registry.len()
    }

    /// Tears the link down: unregisters the port (when registered), waits
    /// briefly for the router to close the socket, then drops everything and
    /// fails outstanding requests.
    pub async fn close(&self) {
        self.closing.store(true, Ordering::SeqCst);

        if let Some(port) = self.registered_port {
            let frame = PortCloseRequest::new(port).to_frame();
            if let Err(e) = self.write_frame(&frame).await {
                debug!(error = %e, "port close write failed");
            }
        }

        // The reader task ends on EOF once the router drops the socket; both
        // a clean close and a bare `end` land there.
        let task = self.reader_task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(mut task) = task {
            if timeout(UNREGISTER_GRACE, &mut task).await.is_err() {
                debug!("router did not close in time, dropping socket");
                task.abort();
            }
        }

        self.registry.fail_all();
    }

    /// Marks the link as closing without the unregister handshake. Used when
    /// the connection is already known dead.
    pub fn abort(&self) {
        self.closing.store(true, Ordering::SeqCst);
        let task = self.reader_task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            task.abort();
        }
        self.registry.fail_all();
    }

    fn next_invoke_id(&self) -> InvokeId {
        // Wraps at 2^32 - 1 by construction.
        self.invoke_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Registers the local port: one `PORT_CONNECT` exchange on the raw stream,
/// bounded by the request timeout.
async fn register_port(stream: &mut AmsStream, settings: &ClientSettings) -> Result<AmsAddr> {
    let requested = settings.local_port.unwrap_or(0);
    stream
        .write_frame(&PortConnectRequest::new(requested).to_frame())
        .await?;

    let frame = timeout(settings.timeout, stream.read_frame())
        .await
        .map_err(|_| ClientError::Registration("router did not answer PORT_CONNECT".into()))??;

    if frame.command() != AmsCommand::PortConnect {
        return Err(ClientError::Registration(format!(
            "unexpected frame {:?} during registration",
            frame.command()
        )));
    }

    let response = PortConnectResponse::parse_body(frame.payload())?;
    Ok(response.address)
}

/// The reader loop: every complete frame is routed to the registry (command
/// responses), the signal channel (notifications, router notes) or dropped
/// with a diagnostic.
async fn reader_loop(
    mut reader: adskit_core::io::FrameReader<tokio::net::tcp::OwnedReadHalf>,
    registry: Arc<RequestRegistry>,
    signals: mpsc::UnboundedSender<LinkSignal>,
    events: EventBus,
    local_addr: AmsAddr,
    closing: Arc<AtomicBool>,
) {
    loop {
        let frame = match reader.read_frame().await {
            Ok(frame) => frame,
            Err(e) => {
                if !closing.load(Ordering::SeqCst) {
                    debug!(error = %e, "connection lost");
                    registry.fail_all();
                    let _ = signals.send(LinkSignal::Closed(e.to_string()));
                }
                return;
            }
        };

        match frame.command() {
            AmsCommand::AdsCommand => {
                dispatch_ads_frame(&frame, &registry, &signals, &events, local_addr);
            }
            AmsCommand::RouterNote => match RouterNote::parse_body(frame.payload()) {
                Ok(note) => {
                    let _ = signals.send(LinkSignal::RouterNote(note));
                }
                Err(e) => warn!(error = %e, "bad router note"),
            },
            other => {
                trace!(?other, "ignoring router frame");
            }
        }
    }
}

fn dispatch_ads_frame(
    frame: &AmsFrame,
    registry: &RequestRegistry,
    signals: &mpsc::UnboundedSender<LinkSignal>,
    events: &EventBus,
    local_addr: AmsAddr,
) {
    let (header, body) = match AdsHeader::split_prefix(frame.payload()) {
        Ok(parts) => parts,
        Err(e) => {
            warn!(error = %e, "undecodable ADS frame");
            return;
        }
    };

    // Notifications are pushed, not correlated.
    if header.command_id() == AdsCommandId::Notification {
        match Notification::parse_body(body) {
            Ok(notification) => {
                let _ = signals.send(LinkSignal::Notification(notification));
            }
            Err(e) => {
                warn!(error = %e, "bad notification payload");
                events.diagnostic(
                    DiagnosticKind::NotificationParseError,
                    format!("notification payload: {e}"),
                );
            }
        }
        return;
    }

    if !header.state_flags().contains(StateFlags::RESPONSE) {
        trace!(command = ?header.command_id(), "ignoring non-response command");
        return;
    }

    // Only answers addressed to us (or loopback) are ours to resolve.
    let target = header.target();
    if target != local_addr && !target.net_id().is_local() {
        warn!(%target, %local_addr, "dropping response addressed elsewhere");
        events.diagnostic(
            DiagnosticKind::MisroutedPacket,
            format!("response for {target}, local address is {local_addr}"),
        );
        return;
    }

    let invoke_id = header.invoke_id();
    match registry.take(invoke_id) {
        Some(responder) => {
            let result = if header.error_code().is_err() {
                Err(ClientError::Ams(header.error_code()))
            } else {
                Ok(AdsResponse {
                    header,
                    body: body.to_vec(),
                })
            };
            let _ = responder.send(result);
        }
        None => {
            debug!(invoke_id, "stale response");
            events.diagnostic(
                DiagnosticKind::StaleResponse,
                format!("invoke id {invoke_id} has no pending request"),
            );
        }
    }
}
