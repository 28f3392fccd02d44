//! End-to-end tests against a scripted in-process AMS router.
//!
//! The mock accepts real TCP connections, answers the port-registration
//! handshake and delegates ADS commands to a per-test handler, so the whole
//! engine path (framing, invoke-id correlation, timeouts, subscriptions,
//! reconnection) runs exactly as against a live router.

use adskit_client::events::DiagnosticKind;
use adskit_client::{
    AdsClient, ClientError, ClientEvent, ClientSettings, PlcValue, SubscriptionSettings,
};
use adskit_core::ads::{
    AdsCommandId, AdsDataTypeId, AdsHeader, AdsReturnCode, AdsState, Filetime, StateFlags,
};
use adskit_core::ams::{AmsAddr, AmsCommand, AmsNetId, AmsTcpHeader};
use adskit_core::index_group;
use adskit_core::io::{AmsFrame, AmsStream, FrameWriter};
use adskit_core::payload::{
    AddNotificationResponse, DeviceInfoResponse, Notification, NotificationSample,
    NotificationStamp, PortConnectResponse, ReadRequest, ReadResponse, ReadStateResponse,
    ReadWriteRequest, ReadWriteResponse, WriteResponse,
};
use adskit_core::{DeviceVersion, NotificationHandle};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

/// What the mock does with one ADS request.
enum Action {
    /// Respond immediately with this ADS body.
    Reply(Vec<u8>),
    /// Respond with this body after a delay.
    Delay(Duration, Vec<u8>),
    /// Never respond.
    Ignore,
}

type Handler = Arc<dyn Fn(AdsHeader, &[u8]) -> Action + Send + Sync>;

type SharedWriter = Arc<tokio::sync::Mutex<FrameWriter<OwnedWriteHalf>>>;

struct Shared {
    assigned: AmsAddr,
    handler: Handler,
    writer: tokio::sync::Mutex<Option<SharedWriter>>,
    conn_task: Mutex<Option<JoinHandle<()>>>,
    connections: AtomicUsize,
}

struct MockRouter {
    port: u16,
    shared: Arc<Shared>,
    accept_task: JoinHandle<()>,
}

impl MockRouter {
    async fn start(assigned: AmsAddr, handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let shared = Arc::new(Shared {
            assigned,
            handler,
            writer: tokio::sync::Mutex::new(None),
            conn_task: Mutex::new(None),
            connections: AtomicUsize::new(0),
        });

        let accept_shared = Arc::clone(&shared);
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                accept_shared.connections.fetch_add(1, Ordering::SeqCst);
                let conn = tokio::spawn(serve_conn(stream, Arc::clone(&accept_shared)));
                *accept_shared.conn_task.lock().unwrap() = Some(conn);
            }
        });

        Self {
            port,
            shared,
            accept_task,
        }
    }

    fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    /// Hard-drops the current connection, as a dying router would.
    async fn kill_connection(&self) {
        if let Some(task) = self.shared.conn_task.lock().unwrap().take() {
            task.abort();
        }
        *self.shared.writer.lock().await = None;
    }

    /// Pushes a notification packet to the connected client.
    async fn push_notification(&self, handle: u32, filetime: u64, data: Vec<u8>) {
        let notification = Notification {
            stamps: vec![NotificationStamp {
                timestamp: Filetime::from_raw(filetime),
                samples: vec![NotificationSample {
                    handle: NotificationHandle::new(handle),
                    data,
                }],
            }],
        };
        let body = notification.encode_body();
        let header = AdsHeader::new(
            self.shared.assigned,
            AmsAddr::new(AmsNetId::LOCAL, 851),
            AdsCommandId::Notification,
            StateFlags::request(),
            body.len() as u32,
            AdsReturnCode::OK,
            0,
        );
        let mut payload = header.to_bytes().to_vec();
        payload.extend_from_slice(&body);
        let frame = AmsFrame::from_parts(
            AmsTcpHeader::new(AmsCommand::AdsCommand, payload.len() as u32),
            payload,
        );

        let writer = self.shared.writer.lock().await.clone();
        if let Some(writer) = writer {
            writer.lock().await.write_frame(&frame).await.unwrap();
        }
    }
}

impl Drop for MockRouter {
    fn drop(&mut self) {
        self.accept_task.abort();
        if let Some(task) = self.shared.conn_task.lock().unwrap().take() {
            task.abort();
        }
    }
}

async fn serve_conn(stream: tokio::net::TcpStream, shared: Arc<Shared>) {
    let (mut reader, writer) = AmsStream::new(stream).into_split();
    let writer: SharedWriter = Arc::new(tokio::sync::Mutex::new(writer));
    *shared.writer.lock().await = Some(Arc::clone(&writer));

    loop {
        let frame = match reader.read_frame().await {
            Ok(frame) => frame,
            Err(_) => return,
        };

        match frame.command() {
            AmsCommand::PortConnect => {
                let body = PortConnectResponse {
                    address: shared.assigned,
                }
                .encode_body();
                let response = AmsFrame::from_parts(
                    AmsTcpHeader::new(AmsCommand::PortConnect, body.len() as u32),
                    body,
                );
                let _ = writer.lock().await.write_frame(&response).await;
            }
            AmsCommand::PortClose => {
                // Drop the write half as well so the client sees a clean EOF.
                *shared.writer.lock().await = None;
                return;
            }
            AmsCommand::AdsCommand => {
                let Ok((header, body)) = AdsHeader::split_prefix(frame.payload()) else {
                    continue;
                };
                match (shared.handler)(header, body) {
                    Action::Reply(response_body) => {
                        let frame = ads_response_frame(&header, response_body);
                        let _ = writer.lock().await.write_frame(&frame).await;
                    }
                    Action::Delay(delay, response_body) => {
                        let writer = Arc::clone(&writer);
                        tokio::spawn(async move {
                            sleep(delay).await;
                            let frame = ads_response_frame(&header, response_body);
                            let _ = writer.lock().await.write_frame(&frame).await;
                        });
                    }
                    Action::Ignore => {}
                }
            }
            _ => {}
        }
    }
}

fn ads_response_frame(request: &AdsHeader, body: Vec<u8>) -> AmsFrame {
    let header = AdsHeader::new(
        request.source(),
        request.target(),
        request.command_id(),
        StateFlags::response(),
        body.len() as u32,
        AdsReturnCode::OK,
        request.invoke_id(),
    );
    let mut payload = header.to_bytes().to_vec();
    payload.extend_from_slice(&body);
    AmsFrame::from_parts(
        AmsTcpHeader::new(AmsCommand::AdsCommand, payload.len() as u32),
        payload,
    )
}

fn assigned_addr() -> AmsAddr {
    AmsAddr::new(AmsNetId::new(192, 168, 1, 100, 1, 1), 32905)
}

fn settings_for(router_port: u16) -> ClientSettings {
    ClientSettings::new(AmsNetId::LOCAL, 851)
        .with_router("127.0.0.1", router_port)
        .with_timeout(Duration::from_millis(2000))
        .with_auto_reconnect(false)
        .with_bare_client(true)
}

// ---- wire fixtures (what a real target would send) ------------------------

fn encode_symbol_entry(name: &str, type_name: &str, ig: u32, io: u32, size: u32, dt: u32) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&ig.to_le_bytes());
    body.extend_from_slice(&io.to_le_bytes());
    body.extend_from_slice(&size.to_le_bytes());
    body.extend_from_slice(&dt.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes()); // flags
    body.extend_from_slice(&0u16.to_le_bytes()); // array dimension
    body.extend_from_slice(&(name.len() as u16).to_le_bytes());
    body.extend_from_slice(&(type_name.len() as u16).to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes()); // comment length
    body.extend_from_slice(name.as_bytes());
    body.push(0);
    body.extend_from_slice(type_name.as_bytes());
    body.push(0);
    body.push(0); // empty comment, NUL only

    let mut entry = Vec::with_capacity(4 + body.len());
    entry.extend_from_slice(&((4 + body.len()) as u32).to_le_bytes());
    entry.extend_from_slice(&body);
    entry
}

fn encode_primitive_type_entry(name: &str, dt: u32, size: u32) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1u32.to_le_bytes()); // version
    body.extend_from_slice(&0u32.to_le_bytes()); // hash
    body.extend_from_slice(&0u32.to_le_bytes()); // type hash
    body.extend_from_slice(&size.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes()); // offset
    body.extend_from_slice(&dt.to_le_bytes());
    body.extend_from_slice(&1u32.to_le_bytes()); // flags: DataType
    body.extend_from_slice(&(name.len() as u16).to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes()); // type length
    body.extend_from_slice(&0u16.to_le_bytes()); // comment length
    body.extend_from_slice(&0u16.to_le_bytes()); // array dimension
    body.extend_from_slice(&0u16.to_le_bytes()); // sub items
    body.extend_from_slice(name.as_bytes());
    body.push(0);
    body.push(0); // empty type name
    body.push(0); // empty comment

    let mut entry = Vec::with_capacity(4 + body.len());
    entry.extend_from_slice(&((4 + body.len()) as u32).to_le_bytes());
    entry.extend_from_slice(&body);
    entry
}

/// Serves symbol/type metadata for `MAIN.counter : DINT` plus notification
/// registration with handles from `next_handle`.
fn plc_handler(next_handle: Arc<AtomicU32>) -> Handler {
    Arc::new(move |header, body| match header.command_id() {
        AdsCommandId::ReadWrite => {
            let request = ReadWriteRequest::parse_body(body).unwrap();
            let data = match request.index_group {
                index_group::SYMBOL_INFO_BY_NAME_EX => {
                    encode_symbol_entry("MAIN.counter", "DINT", 0x4040, 0x10, 4, 3)
                }
                index_group::DATA_TYPE_INFO_BY_NAME_EX => encode_primitive_type_entry("DINT", 3, 4),
                _ => return Action::Ignore,
            };
            Action::Reply(
                ReadWriteResponse {
                    result: AdsReturnCode::OK,
                    data,
                }
                .encode_body(),
            )
        }
        AdsCommandId::AddNotification => {
            let handle = next_handle.fetch_add(0x10, Ordering::SeqCst);
            Action::Reply(
                AddNotificationResponse {
                    result: AdsReturnCode::OK,
                    handle: NotificationHandle::new(handle),
                }
                .encode_body(),
            )
        }
        AdsCommandId::DeleteNotification => Action::Reply(
            WriteResponse {
                result: AdsReturnCode::OK,
            }
            .encode_body(),
        ),
        _ => Action::Ignore,
    })
}

// ---- scenarios ------------------------------------------------------------

#[tokio::test]
async fn register_port_and_read_device_info() {
    let handler: Handler = Arc::new(|header, _body| {
        if header.command_id() == AdsCommandId::ReadDeviceInfo {
            Action::Reply(
                DeviceInfoResponse {
                    result: AdsReturnCode::OK,
                    version: DeviceVersion::new(3, 1, 4024),
                    name: "TCatPlcCtrl".into(),
                }
                .encode_body(),
            )
        } else {
            Action::Ignore
        }
    });
    let router = MockRouter::start(assigned_addr(), handler).await;

    let client = AdsClient::new(settings_for(router.port));
    client.connect().await.unwrap();

    assert_eq!(client.local_addr(), Some(assigned_addr()));

    let info = client.read_device_info().await.unwrap();
    assert_eq!(info.version, DeviceVersion::new(3, 1, 4024));
    assert_eq!(info.name, "TCatPlcCtrl");

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn concurrent_reads_resolve_out_of_order() {
    let handler: Handler = Arc::new(|header, body| {
        if header.command_id() != AdsCommandId::Read {
            return Action::Ignore;
        }
        let request = ReadRequest::parse_body(body).unwrap();
        let response = ReadResponse {
            result: AdsReturnCode::OK,
            data: request.index_offset.to_le_bytes().to_vec(),
        }
        .encode_body();

        // The first target answers late, so replies cross on the wire.
        if request.index_offset == 0xA {
            Action::Delay(Duration::from_millis(100), response)
        } else {
            Action::Reply(response)
        }
    });
    let router = MockRouter::start(assigned_addr(), handler).await;

    let client = AdsClient::new(settings_for(router.port));
    client.connect().await.unwrap();

    let (first, second) = tokio::join!(
        client.read_raw(0xF005, 0xA, 4),
        client.read_raw(0xF005, 0xB, 4),
    );
    assert_eq!(first.unwrap(), 0xAu32.to_le_bytes().to_vec());
    assert_eq!(second.unwrap(), 0xBu32.to_le_bytes().to_vec());

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn request_timeout_discards_late_reply() {
    let handler: Handler = Arc::new(|header, body| {
        if header.command_id() != AdsCommandId::Read {
            return Action::Ignore;
        }
        let _ = ReadRequest::parse_body(body).unwrap();
        let response = ReadResponse {
            result: AdsReturnCode::OK,
            data: vec![1, 2, 3, 4],
        }
        .encode_body();
        Action::Delay(Duration::from_millis(500), response)
    });
    let router = MockRouter::start(assigned_addr(), handler).await;

    let settings = settings_for(router.port).with_timeout(Duration::from_millis(200));
    let client = AdsClient::new(settings);
    client.connect().await.unwrap();
    let mut events = client.events();

    let started = Instant::now();
    let err = client.read_raw(0xF005, 0, 4).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ClientError::Timeout));
    assert_eq!(err.code(), -1);
    assert!(err.is_transport());
    assert!(elapsed >= Duration::from_millis(180), "rejected too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(450), "rejected too late: {elapsed:?}");

    // The late reply at 500 ms lands in the stale-response path.
    let event = timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await.unwrap() {
                ClientEvent::ClientError { kind, .. } => return kind,
                _ => continue,
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(event, DiagnosticKind::StaleResponse);

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn notification_dispatches_typed_sample() {
    let next_handle = Arc::new(AtomicU32::new(0x77));
    let router = MockRouter::start(assigned_addr(), plc_handler(next_handle)).await;

    let client = AdsClient::new(settings_for(router.port));
    client.connect().await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = client
        .subscribe("MAIN.counter", SubscriptionSettings::on_change(), move |sample| {
            let _ = tx.send(sample);
        })
        .await
        .unwrap();
    assert_eq!(subscription.notification_handle(), 0x77);

    // filetime 133000000000000000 => 2022-06-18T03:46:40Z
    router
        .push_notification(0x77, 133_000_000_000_000_000, vec![0x2A, 0, 0, 0])
        .await;

    let sample = timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sample.value, PlcValue::Int32(42));
    assert_eq!(sample.timestamp.timestamp_millis(), 1_655_526_400_000);
    assert_eq!(sample.symbol.as_ref().unwrap().name, "MAIN.counter");
    assert_eq!(
        sample.data_type.as_ref().unwrap().data_type_id,
        AdsDataTypeId::Int32
    );

    // Exactly one callback for one sample.
    assert!(rx.try_recv().is_err());

    subscription.close().await.unwrap();
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn reconnect_restores_subscription() {
    let next_handle = Arc::new(AtomicU32::new(0x10));
    let router = MockRouter::start(assigned_addr(), plc_handler(next_handle)).await;

    let settings = settings_for(router.port)
        .with_auto_reconnect(true)
        .with_reconnect_interval(Duration::from_millis(100));
    let client = AdsClient::new(settings);
    client.connect().await.unwrap();
    let mut events = client.events();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = client
        .subscribe("MAIN.counter", SubscriptionSettings::on_change(), move |sample| {
            let _ = tx.send(sample);
        })
        .await
        .unwrap();
    assert_eq!(subscription.notification_handle(), 0x10);

    router.push_notification(0x10, 133_000_000_000_000_000, vec![1, 0, 0, 0]).await;
    let first = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(first.value, PlcValue::Int32(1));

    // The router dies; the client must notice, reconnect and re-subscribe.
    router.kill_connection().await;

    timeout(Duration::from_secs(5), async {
        loop {
            if matches!(events.recv().await.unwrap(), ClientEvent::Reconnect) {
                return;
            }
        }
    })
    .await
    .expect("no Reconnect event");

    assert!(client.is_connected());
    assert_eq!(router.connections(), 2);
    // Re-registration got a fresh handle; the original callback still fires.
    assert_eq!(subscription.notification_handle(), 0x20);

    router.push_notification(0x20, 133_000_000_010_000_000, vec![2, 0, 0, 0]).await;
    let second = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(second.value, PlcValue::Int32(2));

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn symbol_version_change_flushes_caches() {
    let symbol_lookups = Arc::new(AtomicUsize::new(0));
    let next_handle = Arc::new(AtomicU32::new(0x50));

    let handler: Handler = {
        let symbol_lookups = Arc::clone(&symbol_lookups);
        let next_handle = Arc::clone(&next_handle);
        Arc::new(move |header, body| match header.command_id() {
            AdsCommandId::Read => {
                let request = ReadRequest::parse_body(body).unwrap();
                let data = match request.index_group {
                    index_group::SYMBOL_UPLOAD_INFO2 => vec![0u8; 24],
                    index_group::SYMBOL_VERSION => vec![5],
                    _ => return Action::Ignore,
                };
                Action::Reply(
                    ReadResponse {
                        result: AdsReturnCode::OK,
                        data,
                    }
                    .encode_body(),
                )
            }
            AdsCommandId::ReadState => Action::Reply(
                ReadStateResponse {
                    result: AdsReturnCode::OK,
                    ads_state: AdsState::Run,
                    device_state: 0,
                }
                .encode_body(),
            ),
            AdsCommandId::ReadWrite => {
                let request = ReadWriteRequest::parse_body(body).unwrap();
                let data = match request.index_group {
                    index_group::SYMBOL_INFO_BY_NAME_EX => {
                        symbol_lookups.fetch_add(1, Ordering::SeqCst);
                        encode_symbol_entry("MAIN.x", "DINT", 0x4040, 0x20, 4, 3)
                    }
                    index_group::DATA_TYPE_INFO_BY_NAME_EX => {
                        encode_primitive_type_entry("DINT", 3, 4)
                    }
                    _ => return Action::Ignore,
                };
                Action::Reply(
                    ReadWriteResponse {
                        result: AdsReturnCode::OK,
                        data,
                    }
                    .encode_body(),
                )
            }
            AdsCommandId::AddNotification => {
                let handle = next_handle.fetch_add(1, Ordering::SeqCst);
                Action::Reply(
                    AddNotificationResponse {
                        result: AdsReturnCode::OK,
                        handle: NotificationHandle::new(handle),
                    }
                    .encode_body(),
                )
            }
            AdsCommandId::DeleteNotification => Action::Reply(
                WriteResponse {
                    result: AdsReturnCode::OK,
                }
                .encode_body(),
            ),
            _ => Action::Ignore,
        })
    };
    let router = MockRouter::start(assigned_addr(), handler).await;

    // Full client: version monitoring on.
    let settings = ClientSettings::new(AmsNetId::LOCAL, 851)
        .with_router("127.0.0.1", router.port)
        .with_auto_reconnect(false);
    let client = AdsClient::new(settings);
    client.connect().await.unwrap();
    let mut events = client.events();

    // Warm the symbol cache; the second read must be served from it.
    client.symbol_info("MAIN.x").await.unwrap();
    client.symbol_info("MAIN.x").await.unwrap();
    assert_eq!(symbol_lookups.load(Ordering::SeqCst), 1);

    // The version watcher got the first handle (0x50). Bump 5 -> 6.
    router.push_notification(0x50, 133_000_000_000_000_000, vec![6]).await;

    let change = timeout(Duration::from_secs(2), async {
        loop {
            if let ClientEvent::SymbolVersionChange { from, to } = events.recv().await.unwrap() {
                return (from, to);
            }
        }
    })
    .await
    .expect("no SymbolVersionChange event");
    assert_eq!(change, (Some(5), 6));

    // Caches were flushed: the next lookup hits the wire again.
    client.symbol_info("MAIN.x").await.unwrap();
    assert_eq!(symbol_lookups.load(Ordering::SeqCst), 2);

    client.disconnect().await.unwrap();
}
