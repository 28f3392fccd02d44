//! The client: public surface plus the shared engine state behind it.
//!
//! [`AdsClient`] is a cheap clone over one engine. All shared state (link,
//! caches, subscription maps) lives in [`ClientInner`] and is mutated behind
//! short-lived locks, never held across awaits.

use crate::error::{ClientError, Result};
use crate::events::{ClientEvent, DiagnosticKind, EventBus};
use crate::link::{AdsResponse, Link};
use crate::meta::resolver::{self, DataType, ResolveStep, TypeCache};
use crate::meta::symbol::{AdsSymbol, UploadInfo};
use crate::meta::{base_types, datatype::DataTypeEntry};
use crate::settings::ClientSettings;
use crate::subscription::{
    DecodeStrategy, Subscription, SubscriptionCallback, SubscriptionHandle, SubscriptionRole,
    SubscriptionSample, SubscriptionSettings, SubscriptionTarget,
};
use crate::sum::{self, CreatedHandle, SumReadTarget, SumResult, SumWriteTarget};
use crate::value::marshal::{MarshalOptions, parse_value, serialize_value};
use crate::value::PlcValue;
use adskit_core::ads::{
    AdsCommandId, AdsState, DeviceState, DeviceVersion, IndexGroup, IndexOffset,
};
use adskit_core::ams::{AmsAddr, AmsPort, RouterState};
use adskit_core::index_group;
use adskit_core::payload::{
    AddNotificationRequest, AddNotificationResponse, DeleteNotificationRequest,
    DeleteNotificationResponse, DeviceInfoRequest, DeviceInfoResponse, Notification, ReadRequest,
    ReadResponse, ReadStateRequest, ReadStateResponse, ReadWriteRequest, ReadWriteResponse,
    WriteControlRequest, WriteControlResponse, WriteRequest, WriteResponse,
};
use encoding_rs::WINDOWS_1252;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// ADS port of the TwinCAT system service (system manager).
pub const SYSTEM_SERVICE_PORT: AmsPort = 10000;

/// Alias-chain depth guard; real type graphs are shallow, a longer chain
/// means corrupt metadata.
const MAX_TYPE_DEPTH: u32 = 32;

/// Device identity as reported by `ReadDeviceInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub version: DeviceVersion,
    pub name: String,
}

/// A typed symbol read: the value plus the metadata it decoded through.
#[derive(Debug, Clone)]
pub struct SymbolValue {
    pub value: PlcValue,
    pub symbol: AdsSymbol,
    pub data_type: DataType,
}

#[derive(Default)]
struct MetaCaches {
    /// Symbol entries keyed by lowercased path.
    symbols: HashMap<String, AdsSymbol>,
    /// Resolved type views.
    types: TypeCache,
    /// Raw type entries from a bulk upload, keyed by lowercased name.
    raw_types: HashMap<String, DataTypeEntry>,
    upload_info: Option<UploadInfo>,
    all_symbols_cached: bool,
    all_types_cached: bool,
    symbol_version: Option<u8>,
}

impl MetaCaches {
    fn clear(&mut self) {
        self.symbols.clear();
        self.types.clear();
        self.raw_types.clear();
        self.upload_info = None;
        self.all_symbols_cached = false;
        self.all_types_cached = false;
    }
}

/// Shared engine state. Public methods take `&Arc<Self>` where they spawn
/// tasks or hand out weak references.
pub(crate) struct ClientInner {
    settings: ClientSettings,
    events: EventBus,
    link: Mutex<Option<Arc<Link>>>,
    connected: AtomicBool,
    /// Set by `disconnect`; suppresses link-down handling and reconnects.
    closed: AtomicBool,
    reconnect_pending: AtomicBool,
    caches: Mutex<MetaCaches>,
    active_subs: Mutex<HashMap<u32, Arc<Subscription>>>,
    quarantined_subs: Mutex<Vec<Arc<Subscription>>>,
    dispatcher_task: Mutex<Option<JoinHandle<()>>>,
    poller_task: Mutex<Option<JoinHandle<()>>>,
    last_system_state: Mutex<Option<AdsState>>,
    last_runtime_state: Mutex<Option<AdsState>>,
    last_router_state: Mutex<Option<RouterState>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ClientInner {
    fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            events: EventBus::new(),
            link: Mutex::new(None),
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            reconnect_pending: AtomicBool::new(false),
            caches: Mutex::new(MetaCaches::default()),
            active_subs: Mutex::new(HashMap::new()),
            quarantined_subs: Mutex::new(Vec::new()),
            dispatcher_task: Mutex::new(None),
            poller_task: Mutex::new(None),
            last_system_state: Mutex::new(None),
            last_runtime_state: Mutex::new(None),
            last_router_state: Mutex::new(None),
        }
    }

    pub(crate) fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn marshal_options(&self) -> MarshalOptions {
        MarshalOptions {
            objectify_enumerations: self.settings.objectify_enumerations,
            convert_dates: self.settings.convert_dates,
        }
    }

    fn target_addr(&self) -> AmsAddr {
        AmsAddr::new(self.settings.target_net_id, self.settings.target_port)
    }

    fn system_addr(&self) -> AmsAddr {
        AmsAddr::new(self.settings.target_net_id, SYSTEM_SERVICE_PORT)
    }

    /// True when the target sits behind the local router.
    fn target_is_local(&self) -> bool {
        if self.settings.target_net_id.is_local() {
            return true;
        }
        self.current_link()
            .map(|link| link.local_addr().net_id() == self.settings.target_net_id)
            .unwrap_or(false)
    }

    fn current_link(&self) -> Result<Arc<Link>> {
        lock(&self.link).clone().ok_or(ClientError::NotConnected)
    }

    // ---- request plumbing -------------------------------------------------

    async fn request_to(
        &self,
        target: AmsAddr,
        command: AdsCommandId,
        body: Vec<u8>,
    ) -> Result<AdsResponse> {
        let link = self.current_link()?;
        link.request(target, command, body).await
    }

    async fn ads_read_to(
        &self,
        target: AmsAddr,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        length: u32,
    ) -> Result<Vec<u8>> {
        let body = ReadRequest::new(index_group, index_offset, length).encode_body();
        let response = self.request_to(target, AdsCommandId::Read, body).await?;
        let parsed = ReadResponse::parse_body(&response.body)?;
        ClientError::check_ads(parsed.result)?;
        Ok(parsed.data)
    }

    async fn ads_write_to(
        &self,
        target: AmsAddr,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        data: Vec<u8>,
    ) -> Result<()> {
        let body = WriteRequest::new(index_group, index_offset, data).encode_body();
        let response = self.request_to(target, AdsCommandId::Write, body).await?;
        let parsed = WriteResponse::parse_body(&response.body)?;
        ClientError::check_ads(parsed.result)
    }

    async fn ads_read_write_to(&self, target: AmsAddr, req: ReadWriteRequest) -> Result<Vec<u8>> {
        let response = self
            .request_to(target, AdsCommandId::ReadWrite, req.encode_body())
            .await?;
        let parsed = ReadWriteResponse::parse_body(&response.body)?;
        ClientError::check_ads(parsed.result)?;
        Ok(parsed.data)
    }

    // ---- raw public operations -------------------------------------------

    pub(crate) async fn read_raw(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        length: u32,
    ) -> Result<Vec<u8>> {
        self.ads_read_to(self.target_addr(), index_group, index_offset, length)
            .await
    }

    pub(crate) async fn write_raw(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        data: Vec<u8>,
    ) -> Result<()> {
        self.ads_write_to(self.target_addr(), index_group, index_offset, data)
            .await
    }

    pub(crate) async fn read_write_raw(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        read_length: u32,
        write_data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let req = ReadWriteRequest::new(index_group, index_offset, read_length, write_data);
        self.ads_read_write_to(self.target_addr(), req).await
    }

    pub(crate) async fn read_device_info(&self) -> Result<DeviceInfo> {
        let response = self
            .request_to(
                self.target_addr(),
                AdsCommandId::ReadDeviceInfo,
                DeviceInfoRequest.encode_body(),
            )
            .await?;
        let parsed = DeviceInfoResponse::parse_body(&response.body)?;
        ClientError::check_ads(parsed.result)?;
        Ok(DeviceInfo {
            version: parsed.version,
            name: parsed.name,
        })
    }

    async fn read_state_of(&self, target: AmsAddr) -> Result<ReadStateResponse> {
        let response = self
            .request_to(target, AdsCommandId::ReadState, ReadStateRequest.encode_body())
            .await?;
        let parsed = ReadStateResponse::parse_body(&response.body)?;
        ClientError::check_ads(parsed.result)?;
        Ok(parsed)
    }

    pub(crate) async fn read_state(&self) -> Result<ReadStateResponse> {
        self.read_state_of(self.target_addr()).await
    }

    pub(crate) async fn read_system_state(&self) -> Result<ReadStateResponse> {
        self.read_state_of(self.system_addr()).await
    }

    async fn write_control_of(
        &self,
        target: AmsAddr,
        ads_state: AdsState,
        device_state: DeviceState,
        data: Vec<u8>,
    ) -> Result<()> {
        let body = WriteControlRequest::new(ads_state, device_state, data).encode_body();
        let response = self
            .request_to(target, AdsCommandId::WriteControl, body)
            .await?;
        let parsed = WriteControlResponse::parse_body(&response.body)?;
        ClientError::check_ads(parsed.result)
    }

    pub(crate) async fn write_control(
        &self,
        ads_state: AdsState,
        device_state: DeviceState,
        data: Vec<u8>,
    ) -> Result<()> {
        self.write_control_of(self.target_addr(), ads_state, device_state, data)
            .await
    }

    /// Reads the runtime's state first so its device state survives the
    /// transition.
    async fn set_plc_state(&self, ads_state: AdsState) -> Result<()> {
        let current = self.read_state().await?;
        self.write_control(ads_state, current.device_state, Vec::new())
            .await
    }

    pub(crate) async fn start_plc(&self) -> Result<()> {
        self.set_plc_state(AdsState::Run).await
    }

    pub(crate) async fn stop_plc(&self) -> Result<()> {
        self.set_plc_state(AdsState::Stop).await
    }

    pub(crate) async fn restart_plc(&self) -> Result<()> {
        self.set_plc_state(AdsState::Reset).await
    }

    async fn set_system_state(&self, ads_state: AdsState) -> Result<()> {
        let current = self.read_system_state().await?;
        self.write_control_of(
            self.system_addr(),
            ads_state,
            current.device_state,
            Vec::new(),
        )
        .await
    }

    pub(crate) async fn set_system_to_run(&self) -> Result<()> {
        self.set_system_state(AdsState::Reset).await
    }

    pub(crate) async fn set_system_to_config(&self) -> Result<()> {
        self.set_system_state(AdsState::Reconfig).await
    }

    // ---- handles ----------------------------------------------------------

    pub(crate) async fn create_handle(&self, path: &str) -> Result<CreatedHandle> {
        let req = ReadWriteRequest::new(
            index_group::SYMBOL_HANDLE_BY_NAME,
            0,
            0xFFFF_FFFF,
            name_payload(path),
        );
        let data = self.ads_read_write_to(self.target_addr(), req).await?;
        CreatedHandle::parse_body(&data)
    }

    pub(crate) async fn delete_handle(&self, handle: u32) -> Result<()> {
        self.write_raw(
            index_group::SYMBOL_RELEASE_HANDLE,
            0,
            handle.to_le_bytes().to_vec(),
        )
        .await
    }

    pub(crate) async fn read_raw_by_handle(&self, handle: u32, length: u32) -> Result<Vec<u8>> {
        self.read_raw(index_group::SYMBOL_VALUE_BY_HANDLE, handle, length)
            .await
    }

    pub(crate) async fn write_raw_by_handle(&self, handle: u32, data: Vec<u8>) -> Result<()> {
        self.write_raw(index_group::SYMBOL_VALUE_BY_HANDLE, handle, data)
            .await
    }

    // ---- sum commands -----------------------------------------------------

    pub(crate) async fn read_raw_multi(
        &self,
        targets: &[SumReadTarget],
    ) -> Result<Vec<SumResult<Vec<u8>>>> {
        let data = self
            .ads_read_write_to(self.target_addr(), sum::build_read(targets))
            .await?;
        sum::split_read(targets, &data)
    }

    pub(crate) async fn write_raw_multi(
        &self,
        targets: &[SumWriteTarget],
    ) -> Result<Vec<SumResult<()>>> {
        let data = self
            .ads_read_write_to(self.target_addr(), sum::build_write(targets))
            .await?;
        sum::split_write(targets.len(), &data)
    }

    pub(crate) async fn create_handle_multi(
        &self,
        paths: &[&str],
    ) -> Result<Vec<SumResult<u32>>> {
        let data = self
            .ads_read_write_to(self.target_addr(), sum::build_create_handles(paths))
            .await?;
        sum::split_create_handles(paths.len(), &data)
    }

    pub(crate) async fn delete_handle_multi(
        &self,
        handles: &[u32],
    ) -> Result<Vec<SumResult<()>>> {
        let data = self
            .ads_read_write_to(self.target_addr(), sum::build_delete_handles(handles))
            .await?;
        sum::split_write(handles.len(), &data)
    }

    // ---- metadata ---------------------------------------------------------

    pub(crate) async fn symbol_info(&self, path: &str) -> Result<AdsSymbol> {
        if path.is_empty() {
            return Err(ClientError::InvalidSymbolPath("empty path".into()));
        }

        let key = path.to_lowercase();
        {
            let caches = lock(&self.caches);
            if let Some(symbol) = caches.symbols.get(&key) {
                return Ok(symbol.clone());
            }
            // A complete cache is authoritative for this symbol version.
            if caches.all_symbols_cached {
                return Err(ClientError::Ads(
                    adskit_core::ads::AdsReturnCode::SYMBOL_NOT_FOUND,
                ));
            }
        }

        let req = ReadWriteRequest::new(
            index_group::SYMBOL_INFO_BY_NAME_EX,
            0,
            0xFFFF_FFFF,
            name_payload(path),
        );
        let data = self.ads_read_write_to(self.target_addr(), req).await?;
        let (symbol, _) = AdsSymbol::parse_entry(&data)?;

        lock(&self.caches).symbols.insert(key, symbol.clone());
        Ok(symbol)
    }

    /// Resolves a type name into a marshallable view, recursing through the
    /// type graph. Cache and bulk-uploaded raw entries are consulted before
    /// the network.
    pub(crate) fn data_type<'a>(
        &'a self,
        name: &'a str,
        size_hint: Option<u32>,
    ) -> Pin<Box<dyn Future<Output = Result<DataType>> + Send + 'a>> {
        self.resolve_type(name.to_owned(), size_hint, 0)
    }

    fn resolve_type(
        &self,
        name: String,
        size_hint: Option<u32>,
        depth: u32,
    ) -> Pin<Box<dyn Future<Output = Result<DataType>> + Send + '_>> {
        Box::pin(async move {
            if depth > MAX_TYPE_DEPTH {
                return Err(ClientError::UnknownType(format!(
                    "type chain deeper than {MAX_TYPE_DEPTH} at '{name}'"
                )));
            }
            if name.is_empty() {
                return Err(ClientError::UnknownType("empty type name".into()));
            }

            if let Some(view) = lock(&self.caches).types.get(&name) {
                return Ok(view);
            }

            // Pseudo types resolve by size, never by graph.
            if base_types::is_pseudo_type(&name) {
                let view = resolver::fallback_view(&name, size_hint)
                    .ok_or_else(|| ClientError::UnknownType(name.clone()))?;
                lock(&self.caches).types.insert(&name, view.clone());
                return Ok(view);
            }

            let entry = match self.raw_type_entry(&name).await {
                Ok(entry) => entry,
                Err(e) => {
                    // Older targets have no type service; base types still work.
                    if let Some(view) = resolver::fallback_view(&name, size_hint) {
                        debug!(%name, error = %e, "type info unavailable, using base-type table");
                        lock(&self.caches).types.insert(&name, view.clone());
                        return Ok(view);
                    }
                    return Err(e);
                }
            };

            let view = self.build_view(&entry, depth).await?;
            lock(&self.caches).types.insert(&name, view.clone());
            Ok(view)
        })
    }

    async fn build_view(&self, entry: &DataTypeEntry, depth: u32) -> Result<DataType> {
        match resolver::classify(entry)? {
            ResolveStep::Done(view) => Ok(view),
            ResolveStep::Struct => {
                let mut members = Vec::with_capacity(entry.sub_items.len());
                for sub in &entry.sub_items {
                    let member = self
                        .resolve_type(sub.type_name.clone(), Some(sub.size), depth + 1)
                        .await?;
                    members.push(member);
                }
                Ok(resolver::assemble_struct(entry, members))
            }
            ResolveStep::Array { element_type } => {
                let element = self
                    .resolve_type(element_type, Some(entry.size), depth + 1)
                    .await?;
                Ok(resolver::assemble_array(entry, element))
            }
            ResolveStep::Enum { underlying } => {
                let base = self
                    .resolve_type(underlying, Some(entry.size), depth + 1)
                    .await?;
                resolver::assemble_enum(entry, base)
            }
            ResolveStep::Alias { target } => {
                self.resolve_type(target, Some(entry.size), depth + 1).await
            }
        }
    }

    /// Raw type entry by name: the bulk-upload staging map first, then the
    /// by-name service.
    async fn raw_type_entry(&self, name: &str) -> Result<DataTypeEntry> {
        let key = name.to_lowercase();
        {
            let caches = lock(&self.caches);
            if let Some(entry) = caches.raw_types.get(&key) {
                return Ok(entry.clone());
            }
            if caches.all_types_cached {
                return Err(ClientError::UnknownType(name.to_owned()));
            }
        }

        let req = ReadWriteRequest::new(
            index_group::DATA_TYPE_INFO_BY_NAME_EX,
            0,
            0xFFFF_FFFF,
            name_payload(name),
        );
        let data = self.ads_read_write_to(self.target_addr(), req).await?;
        let (entry, _) = DataTypeEntry::parse_entry(&data)?;
        Ok(entry)
    }

    pub(crate) async fn read_upload_info(&self) -> Result<UploadInfo> {
        if let Some(info) = lock(&self.caches).upload_info {
            return Ok(info);
        }
        let data = self
            .read_raw(
                index_group::SYMBOL_UPLOAD_INFO2,
                0,
                UploadInfo::BODY_LEN as u32,
            )
            .await?;
        let info = UploadInfo::parse_body(&data)?;
        lock(&self.caches).upload_info = Some(info);
        Ok(info)
    }

    pub(crate) async fn cache_symbols(&self) -> Result<usize> {
        let info = self.read_upload_info().await?;
        let data = self
            .read_raw(index_group::SYMBOL_UPLOAD, 0, info.symbol_length)
            .await?;
        let symbols = AdsSymbol::parse_upload(&data)?;

        let mut caches = lock(&self.caches);
        for symbol in symbols {
            caches.symbols.insert(symbol.name.to_lowercase(), symbol);
        }
        caches.all_symbols_cached = true;
        Ok(caches.symbols.len())
    }

    pub(crate) async fn cache_data_types(&self) -> Result<usize> {
        let info = self.read_upload_info().await?;
        let data = self
            .read_raw(index_group::SYMBOL_DATA_TYPE_UPLOAD, 0, info.data_type_length)
            .await?;
        let entries = DataTypeEntry::parse_upload(&data)?;

        let mut caches = lock(&self.caches);
        for entry in entries {
            caches.raw_types.insert(entry.name.to_lowercase(), entry);
        }
        caches.all_types_cached = true;
        Ok(caches.raw_types.len())
    }

    pub(crate) async fn symbol_version(&self) -> Result<u8> {
        let data = self.read_raw(index_group::SYMBOL_VERSION, 0, 1).await?;
        data.first().copied().ok_or_else(|| {
            ClientError::Metadata("symbol version response was empty".into())
        })
    }

    pub(crate) fn invalidate_caches(&self) {
        lock(&self.caches).clear();
    }

    // ---- typed value access ----------------------------------------------

    pub(crate) async fn read_symbol(&self, path: &str) -> Result<SymbolValue> {
        let symbol = self.symbol_info(path).await?;
        let data_type = self
            .data_type(&symbol.type_name, Some(symbol.size))
            .await?;
        let data = self
            .read_raw(symbol.index_group, symbol.index_offset, symbol.size)
            .await?;
        let value = parse_value(&data_type, &data, &self.marshal_options())?;
        Ok(SymbolValue {
            value,
            symbol,
            data_type,
        })
    }

    /// Writes a typed value. With `autofill` set, struct values missing keys
    /// are merged over the current PLC value instead of failing.
    pub(crate) async fn write_symbol(
        &self,
        path: &str,
        value: &PlcValue,
        autofill: bool,
    ) -> Result<()> {
        let symbol = self.symbol_info(path).await?;
        let data_type = self
            .data_type(&symbol.type_name, Some(symbol.size))
            .await?;
        let opts = self.marshal_options();

        let bytes = match serialize_value(&data_type, value, &opts) {
            Ok(bytes) => bytes,
            Err(ClientError::IncompleteStruct { missing }) if autofill => {
                debug!(%path, ?missing, "merging with current value");
                let current_bytes = self
                    .read_raw(symbol.index_group, symbol.index_offset, symbol.size)
                    .await?;
                let current = parse_value(&data_type, &current_bytes, &opts)?;
                let merged = merge_values(&current, value);
                serialize_value(&data_type, &merged, &opts)?
            }
            Err(e) => return Err(e),
        };

        self.write_raw(symbol.index_group, symbol.index_offset, bytes)
            .await
    }

    // ---- subscriptions ----------------------------------------------------

    /// Resolves a subscription target to its watched region and decode
    /// strategy. Symbol targets re-resolve on every (re-)registration since
    /// addresses move across online changes.
    async fn resolve_subscription_target(
        &self,
        target: &SubscriptionTarget,
    ) -> Result<(IndexGroup, IndexOffset, u32, DecodeStrategy)> {
        match target {
            SubscriptionTarget::Symbol(path) => {
                let symbol = self.symbol_info(path).await?;
                // Pre-warm the type so dispatch decodes without I/O.
                let data_type = self
                    .data_type(&symbol.type_name, Some(symbol.size))
                    .await?;
                Ok((
                    symbol.index_group,
                    symbol.index_offset,
                    symbol.size,
                    DecodeStrategy::Typed { symbol, data_type },
                ))
            }
            SubscriptionTarget::Raw {
                index_group,
                index_offset,
                size,
            } => Ok((
                *index_group,
                *index_offset,
                size.unwrap_or(0xFFFF_FFFF),
                DecodeStrategy::Raw,
            )),
        }
    }

    /// Sends `AddNotification` for an already-resolved region, returning the
    /// target-assigned handle.
    async fn add_notification(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        size: u32,
        settings: &SubscriptionSettings,
    ) -> Result<u32> {
        let request = AddNotificationRequest {
            index_group,
            index_offset,
            length: size,
            trans_mode: settings.mode,
            max_delay: settings.max_delay_raw(),
            cycle_time: settings.cycle_time_raw(),
        };
        let response = self
            .request_to(
                self.target_addr(),
                AdsCommandId::AddNotification,
                request.encode_body(),
            )
            .await?;
        let parsed = AddNotificationResponse::parse_body(&response.body)?;
        ClientError::check_ads(parsed.result)?;
        Ok(parsed.handle.raw())
    }

    pub(crate) async fn subscribe_with_role(
        &self,
        target: SubscriptionTarget,
        settings: SubscriptionSettings,
        callback: Option<SubscriptionCallback>,
        role: SubscriptionRole,
    ) -> Result<Arc<Subscription>> {
        let (index_group, index_offset, size, decode) =
            self.resolve_subscription_target(&target).await?;
        let handle = self
            .add_notification(index_group, index_offset, size, &settings)
            .await?;

        let subscription = Subscription::new(target, settings, role, callback, decode, handle);
        lock(&self.active_subs).insert(handle, Arc::clone(&subscription));
        debug!(handle, target = ?subscription.target, "subscribed");
        Ok(subscription)
    }

    /// Re-registers an existing subscription in place: same object, same
    /// callback, fresh handle and decode metadata.
    async fn re_register(&self, subscription: &Arc<Subscription>) -> Result<()> {
        let (index_group, index_offset, size, decode) = self
            .resolve_subscription_target(&subscription.target)
            .await?;
        let handle = self
            .add_notification(index_group, index_offset, size, &subscription.settings)
            .await?;

        *subscription
            .decode
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = decode;
        subscription.set_handle(handle);
        lock(&self.active_subs).insert(handle, Arc::clone(subscription));
        Ok(())
    }

    /// Deletes the notification at the target and forgets the subscription.
    pub(crate) async fn remove_subscription(&self, subscription: &Arc<Subscription>) -> Result<()> {
        let handle = subscription.handle();
        lock(&self.active_subs).remove(&handle);

        // Target-side delete only matters while the link is up.
        if self.is_connected() {
            let body =
                DeleteNotificationRequest::new(adskit_core::ads::NotificationHandle::new(handle))
                    .encode_body();
            let response = self
                .request_to(self.target_addr(), AdsCommandId::DeleteNotification, body)
                .await?;
            let parsed = DeleteNotificationResponse::parse_body(&response.body)?;
            ClientError::check_ads(parsed.result)?;
        }
        Ok(())
    }

    pub(crate) async fn unsubscribe_all(&self) -> Result<usize> {
        let user_subs: Vec<Arc<Subscription>> = lock(&self.active_subs)
            .values()
            .filter(|s| !s.is_internal())
            .cloned()
            .collect();

        let mut removed = 0;
        for sub in &user_subs {
            if let Err(e) = self.remove_subscription(sub).await {
                warn!(handle = sub.handle(), error = %e, "unsubscribe failed");
            } else {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Dispatches one pushed notification packet: stamps in order, samples
    /// to their subscriptions.
    pub(crate) async fn dispatch_notification(&self, notification: Notification) {
        let opts = self.marshal_options();

        for stamp in &notification.stamps {
            let timestamp = stamp.timestamp.to_datetime();
            for sample in &stamp.samples {
                let handle = sample.handle.raw();
                let subscription = lock(&self.active_subs).get(&handle).cloned();

                let Some(subscription) = subscription else {
                    // Stale handles happen around reconnects; drop loudly.
                    self.events.diagnostic(
                        DiagnosticKind::UnknownNotificationHandle,
                        format!("sample for unknown handle {handle:#x}"),
                    );
                    continue;
                };

                match subscription.role {
                    SubscriptionRole::User => {
                        match subscription.decode_sample(&sample.data, timestamp, &opts) {
                            Ok(decoded) => {
                                if let Some(callback) = &subscription.callback {
                                    callback(decoded);
                                }
                            }
                            Err(e) => {
                                self.events.diagnostic(
                                    DiagnosticKind::NotificationParseError,
                                    format!("sample for handle {handle:#x}: {e}"),
                                );
                            }
                        }
                    }
                    SubscriptionRole::SymbolVersion => {
                        if let Some(&version) = sample.data.first() {
                            self.on_symbol_version(version).await;
                        }
                    }
                    SubscriptionRole::RuntimeState => {
                        if sample.data.len() >= 2 {
                            let state = AdsState::from_bytes([sample.data[0], sample.data[1]]);
                            self.note_runtime_state(state);
                        }
                    }
                }
            }
        }
    }

    // ---- supervision ------------------------------------------------------

    /// Records a system-manager state; returns true when it just left `Run`.
    pub(crate) fn note_system_state(&self, state: AdsState) -> bool {
        let mut last = lock(&self.last_system_state);
        let previous = last.replace(state);
        if previous != Some(state) {
            self.events.emit(ClientEvent::SystemManagerStateChange {
                from: previous,
                to: state,
            });
        }
        previous == Some(AdsState::Run) && state != AdsState::Run
    }

    fn note_runtime_state(&self, state: AdsState) {
        let mut last = lock(&self.last_runtime_state);
        let previous = last.replace(state);
        if previous != Some(state) {
            self.events.emit(ClientEvent::PlcRuntimeStateChange {
                from: previous,
                to: state,
            });
        }
    }

    pub(crate) async fn on_router_note(self: &Arc<Self>, state: RouterState) {
        let previous = lock(&self.last_router_state).replace(state);
        self.events.emit(ClientEvent::RouterStateChange {
            from: previous,
            to: state,
        });
        info!(%state, "router state change");

        match state {
            RouterState::Start => {
                if !self.is_connected() && !self.is_closed() && self.target_is_local() {
                    self.spawn_reconnect();
                }
            }
            RouterState::Stop | RouterState::Removed => {
                if self.is_connected() && self.target_is_local() {
                    self.handle_link_down("router stopped").await;
                } else {
                    warn!(%state, "router not running, waiting");
                }
            }
            RouterState::Unknown(_) => warn!(%state, "unrecognized router state"),
        }
    }

    pub(crate) async fn on_symbol_version(&self, version: u8) {
        let previous = {
            let mut caches = lock(&self.caches);
            let previous = caches.symbol_version;
            caches.symbol_version = Some(version);
            previous
        };

        let Some(previous) = previous else {
            return; // first observation, nothing changed
        };
        if previous == version {
            return;
        }

        info!(from = previous, to = version, "symbol version changed");
        let (had_symbols, had_types) = {
            let mut caches = lock(&self.caches);
            let flags = (caches.all_symbols_cached, caches.all_types_cached);
            caches.clear();
            caches.symbol_version = Some(version);
            flags
        };

        // Best effort: a changed symbol table usually follows an online
        // change; the target may briefly refuse metadata reads.
        if let Err(e) = self.read_upload_info().await {
            debug!(error = %e, "upload info refresh failed");
        }
        if had_symbols {
            if let Err(e) = self.cache_symbols().await {
                warn!(error = %e, "symbol re-download failed");
            }
        }
        if had_types {
            if let Err(e) = self.cache_data_types().await {
                warn!(error = %e, "data type re-download failed");
            }
        }

        // Old handles died with the version; re-register everything.
        let all: Vec<Arc<Subscription>> = lock(&self.active_subs).drain().map(|(_, s)| s).collect();
        lock(&self.quarantined_subs).extend(all);
        self.resubscribe_quarantined().await;

        self.events.emit(ClientEvent::SymbolVersionChange {
            from: Some(previous),
            to: version,
        });
    }

    /// Re-registers every quarantined subscription in place, re-resolving
    /// symbol targets (addresses may have moved). Failures stay quarantined
    /// for the next attempt.
    pub(crate) async fn resubscribe_quarantined(&self) {
        let pending: Vec<Arc<Subscription>> = lock(&self.quarantined_subs).drain(..).collect();

        for sub in pending {
            let old_handle = sub.handle();
            match self.re_register(&sub).await {
                Ok(()) => {
                    debug!(old = old_handle, new = sub.handle(), "re-subscribed");
                }
                Err(e) => {
                    warn!(target = ?sub.target, error = %e, "re-subscription failed");
                    self.events.diagnostic(
                        DiagnosticKind::ResubscriptionFailed,
                        format!("re-subscription of {:?} failed: {e}", sub.target),
                    );
                    lock(&self.quarantined_subs).push(sub);
                }
            }
        }
    }

    // ---- lifecycle --------------------------------------------------------

    pub(crate) async fn connect(self: &Arc<Self>) -> Result<()> {
        if self.is_connected() {
            return Err(ClientError::AlreadyConnected);
        }
        self.closed.store(false, Ordering::SeqCst);
        self.reconnect_pending.store(false, Ordering::SeqCst);

        self.establish().await?;
        self.events.emit(ClientEvent::Connect);
        info!(target = %self.target_addr(), "connected");
        Ok(())
    }

    /// Brings up a fresh link, dispatcher, metadata and internal
    /// subscriptions. Used by both `connect` and the reconnect loop.
    async fn establish(self: &Arc<Self>) -> Result<()> {
        let (link, signal_rx) = Link::open(&self.settings, self.events.clone()).await?;
        *lock(&self.link) = Some(Arc::clone(&link));
        self.connected.store(true, Ordering::SeqCst);

        let dispatcher = tokio::spawn(crate::supervisor::dispatcher_loop(
            Arc::clone(self),
            signal_rx,
        ));
        *lock(&self.dispatcher_task) = Some(dispatcher);

        if let Err(e) = self.post_connect_setup().await {
            self.teardown_link().await;
            return Err(e);
        }
        Ok(())
    }

    /// Metadata warm-up, internal subscriptions and the state poller.
    /// Skipped entirely in bare mode.
    async fn post_connect_setup(self: &Arc<Self>) -> Result<()> {
        if self.settings.bare_client {
            return Ok(());
        }

        // Upload info is best-effort: some targets lack the service.
        if let Err(e) = self.read_upload_info().await {
            debug!(error = %e, "upload info unavailable");
        }

        if self.settings.read_and_cache_symbols {
            let count = self.cache_symbols().await?;
            debug!(count, "symbol table cached");
        }
        if self.settings.read_and_cache_data_types {
            let count = self.cache_data_types().await?;
            debug!(count, "data type table cached");
        }

        if !self.settings.disable_symbol_version_monitoring {
            match self.symbol_version().await {
                Ok(version) => lock(&self.caches).symbol_version = Some(version),
                Err(e) => debug!(error = %e, "symbol version read failed"),
            }

            self.subscribe_with_role(
                SubscriptionTarget::Raw {
                    index_group: index_group::SYMBOL_VERSION,
                    index_offset: 0,
                    size: Some(1),
                },
                SubscriptionSettings::on_change(),
                None,
                SubscriptionRole::SymbolVersion,
            )
            .await?;
        }

        // Runtime state watcher feeds `PlcRuntimeStateChange`.
        if let Err(e) = self
            .subscribe_with_role(
                SubscriptionTarget::Raw {
                    index_group: index_group::DEVICE_DATA,
                    index_offset: 0,
                    size: Some(4),
                },
                SubscriptionSettings::on_change(),
                None,
                SubscriptionRole::RuntimeState,
            )
            .await
        {
            debug!(error = %e, "runtime state watcher unavailable");
        }

        let poller = tokio::spawn(crate::supervisor::state_poller_loop(Arc::clone(self)));
        *lock(&self.poller_task) = Some(poller);
        Ok(())
    }

    /// Declares the link dead: quarantines user subscriptions, flushes
    /// caches and arms the reconnect loop.
    pub(crate) async fn handle_link_down(self: &Arc<Self>, reason: &str) {
        if self.is_closed() || !self.connected.swap(false, Ordering::SeqCst) {
            return;
        }
        warn!(reason, "connection lost");

        self.teardown_link_inner(false).await;

        // User subscriptions survive in quarantine; internal ones are
        // recreated by the next establish().
        let (user, _internal): (Vec<_>, Vec<_>) = lock(&self.active_subs)
            .drain()
            .map(|(_, s)| s)
            .partition(|s| !s.is_internal());
        lock(&self.quarantined_subs).extend(user);

        self.invalidate_caches();
        self.events.emit(ClientEvent::ConnectionLost);

        if self.settings.auto_reconnect {
            self.spawn_reconnect();
        }
    }

    fn spawn_reconnect(self: &Arc<Self>) {
        if self.reconnect_pending.swap(true, Ordering::SeqCst) {
            return;
        }
        tokio::spawn(crate::supervisor::reconnect_loop(Arc::clone(self)));
    }

    /// One reconnect attempt: fresh link, then subscription restore.
    pub(crate) async fn try_reconnect(self: &Arc<Self>) -> Result<()> {
        self.teardown_link().await;
        self.establish().await?;
        self.resubscribe_quarantined().await;
        self.reconnect_pending.store(false, Ordering::SeqCst);
        self.events.emit(ClientEvent::Reconnect);
        info!("reconnected");
        Ok(())
    }

    async fn teardown_link(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.teardown_link_inner(false).await;
    }

    /// Invariant: the non-graceful path must not yield before the caller's
    /// last statement; the poller calls into link-down handling and aborts
    /// itself here, which only takes effect once the task next yields.
    async fn teardown_link_inner(&self, graceful: bool) {
        if let Some(task) = lock(&self.poller_task).take() {
            task.abort();
        }

        let link = lock(&self.link).take();
        if let Some(link) = link {
            if graceful {
                link.close().await;
            } else {
                link.abort();
            }
        }

        // The dispatcher ends when its signal channel closes with the link;
        // aborting it here would race its own call into link-down handling.
        lock(&self.dispatcher_task).take();
    }

    pub(crate) async fn disconnect(self: &Arc<Self>) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.reconnect_pending.store(false, Ordering::SeqCst);

        // Release every token before the socket goes away.
        if self.is_connected() {
            if let Err(e) = self.unsubscribe_all().await {
                debug!(error = %e, "unsubscribe-all during disconnect failed");
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        self.teardown_link_inner(true).await;

        lock(&self.active_subs).clear();
        lock(&self.quarantined_subs).clear();
        self.invalidate_caches();
        *lock(&self.last_system_state) = None;
        *lock(&self.last_runtime_state) = None;

        self.events.emit(ClientEvent::Disconnect);
        info!("disconnected");
        Ok(())
    }
}

/// A scoped symbol value handle.
///
/// [`close`](Self::close) releases the handle at the target; dropping the
/// token without closing sends the release best-effort in the background.
/// Disconnecting tears everything down regardless.
pub struct HandleToken {
    client: Weak<ClientInner>,
    handle: u32,
    size: Option<u32>,
    closed: AtomicBool,
}

impl HandleToken {
    fn new(client: Weak<ClientInner>, created: CreatedHandle) -> Self {
        Self {
            client,
            handle: created.handle,
            size: created.size,
            closed: AtomicBool::new(false),
        }
    }

    /// The raw handle value.
    pub fn raw(&self) -> u32 {
        self.handle
    }

    /// The value size the target reported, when it did.
    pub fn size(&self) -> Option<u32> {
        self.size
    }

    /// Reads raw bytes through the handle.
    pub async fn read(&self, length: u32) -> Result<Vec<u8>> {
        let client = self.client.upgrade().ok_or(ClientError::NotConnected)?;
        client.read_raw_by_handle(self.handle, length).await
    }

    /// Writes raw bytes through the handle.
    pub async fn write(&self, data: impl Into<Vec<u8>>) -> Result<()> {
        let client = self.client.upgrade().ok_or(ClientError::NotConnected)?;
        client.write_raw_by_handle(self.handle, data.into()).await
    }

    /// Releases the handle at the target.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(client) = self.client.upgrade() {
            if client.is_connected() {
                client.delete_handle(self.handle).await?;
            }
        }
        Ok(())
    }
}

impl Drop for HandleToken {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(client) = self.client.upgrade() else {
            return;
        };
        if !client.is_connected() {
            return;
        }
        let handle = self.handle;
        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            rt.spawn(async move {
                if let Err(e) = client.delete_handle(handle).await {
                    debug!(error = %e, handle, "drop-time handle release failed");
                }
            });
        }
    }
}

/// Overlays `patch` on `base`: struct keys merge recursively, everything
/// else takes the patch. Used for autofill writes of partial structs.
fn merge_values(base: &PlcValue, patch: &PlcValue) -> PlcValue {
    match (base, patch) {
        (PlcValue::Struct(base_map), PlcValue::Struct(patch_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in patch_map {
                let entry = match merged.get(key) {
                    Some(existing) => merge_values(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            PlcValue::Struct(merged)
        }
        _ => patch.clone(),
    }
}

/// NUL-terminated Windows-1252 symbol/type name payload.
fn name_payload(name: &str) -> Vec<u8> {
    let (encoded, _, _) = WINDOWS_1252.encode(name);
    let mut payload = encoded.into_owned();
    payload.push(0);
    payload
}

/// An ADS/AMS client for one TwinCAT target.
///
/// Cheap to clone; all clones share one engine. Create with
/// [`AdsClient::new`], then [`connect`](Self::connect).
///
/// ```no_run
/// use adskit_client::{AdsClient, ClientSettings};
///
/// # async fn demo() -> adskit_client::Result<()> {
/// let client = AdsClient::new(ClientSettings::new("192.168.1.120.1.1".parse().unwrap(), 851));
/// client.connect().await?;
/// let counter = client.read_symbol("MAIN.counter").await?;
/// println!("counter = {}", counter.value);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdsClient {
    inner: Arc<ClientInner>,
}

impl AdsClient {
    /// Creates a client. No I/O happens until [`connect`](Self::connect).
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            inner: Arc::new(ClientInner::new(settings)),
        }
    }

    /// The settings the client was created with.
    pub fn settings(&self) -> &ClientSettings {
        self.inner.settings()
    }

    /// True while the link is up.
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// The local AMS address (router-assigned or configured), when connected.
    pub fn local_addr(&self) -> Option<AmsAddr> {
        self.inner.current_link().ok().map(|link| link.local_addr())
    }

    /// Subscribes to engine events.
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    /// Connects: TCP, port registration, metadata warm-up, supervision.
    pub async fn connect(&self) -> Result<()> {
        self.inner.connect().await
    }

    /// Disconnects: releases subscriptions and handles, unregisters the
    /// port, tears the socket down.
    pub async fn disconnect(&self) -> Result<()> {
        self.inner.disconnect().await
    }

    /// Reads name and version of the target device.
    pub async fn read_device_info(&self) -> Result<DeviceInfo> {
        self.inner.read_device_info().await
    }

    /// Reads the target runtime's ADS and device state.
    pub async fn read_state(&self) -> Result<(AdsState, DeviceState)> {
        let response = self.inner.read_state().await?;
        Ok((response.ads_state, response.device_state))
    }

    /// Reads the system manager's ADS and device state.
    pub async fn read_system_state(&self) -> Result<(AdsState, DeviceState)> {
        let response = self.inner.read_system_state().await?;
        Ok((response.ads_state, response.device_state))
    }

    /// Reads raw bytes from an index group/offset.
    pub async fn read_raw(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        length: u32,
    ) -> Result<Vec<u8>> {
        self.inner.read_raw(index_group, index_offset, length).await
    }

    /// Writes raw bytes to an index group/offset.
    pub async fn write_raw(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        data: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.inner
            .write_raw(index_group, index_offset, data.into())
            .await
    }

    /// Write-then-read in one round trip.
    pub async fn read_write_raw(
        &self,
        index_group: IndexGroup,
        index_offset: IndexOffset,
        read_length: u32,
        write_data: impl Into<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        self.inner
            .read_write_raw(index_group, index_offset, read_length, write_data.into())
            .await
    }

    /// Reads a symbol by path into a typed value.
    pub async fn read_symbol(&self, path: &str) -> Result<SymbolValue> {
        self.inner.read_symbol(path).await
    }

    /// Writes a typed value to a symbol by path. Partial structs fail with
    /// [`ClientError::IncompleteStruct`]; see
    /// [`write_symbol_autofill`](Self::write_symbol_autofill).
    pub async fn write_symbol(&self, path: &str, value: &PlcValue) -> Result<()> {
        self.inner.write_symbol(path, value, false).await
    }

    /// Writes a typed value, merging partial structs over the current PLC
    /// value first.
    pub async fn write_symbol_autofill(&self, path: &str, value: &PlcValue) -> Result<()> {
        self.inner.write_symbol(path, value, true).await
    }

    /// Fetches (and caches) symbol info by path.
    pub async fn symbol_info(&self, path: &str) -> Result<AdsSymbol> {
        self.inner.symbol_info(path).await
    }

    /// Resolves (and caches) a data type by name.
    pub async fn data_type(&self, name: &str) -> Result<DataType> {
        self.inner.data_type(name, None).await
    }

    /// Reads the target's upload-info summary.
    pub async fn read_upload_info(&self) -> Result<UploadInfo> {
        self.inner.read_upload_info().await
    }

    /// Downloads and caches the whole symbol table. Returns the entry count.
    pub async fn cache_symbols(&self) -> Result<usize> {
        self.inner.cache_symbols().await
    }

    /// Downloads and caches the whole data-type table. Returns the entry
    /// count.
    pub async fn cache_data_types(&self) -> Result<usize> {
        self.inner.cache_data_types().await
    }

    /// Reads the target's symbol version byte.
    pub async fn symbol_version(&self) -> Result<u8> {
        self.inner.symbol_version().await
    }

    /// Drops all cached metadata (symbols, types, upload info).
    pub fn invalidate_caches(&self) {
        self.inner.invalidate_caches();
    }

    /// Creates a value handle for a symbol path.
    pub async fn create_handle(&self, path: &str) -> Result<CreatedHandle> {
        self.inner.create_handle(path).await
    }

    /// Creates a scoped value handle whose token releases it on close/drop.
    pub async fn acquire_handle(&self, path: &str) -> Result<HandleToken> {
        let created = self.inner.create_handle(path).await?;
        Ok(HandleToken::new(Arc::downgrade(&self.inner), created))
    }

    /// Releases a value handle.
    pub async fn delete_handle(&self, handle: u32) -> Result<()> {
        self.inner.delete_handle(handle).await
    }

    /// Reads raw bytes through a value handle.
    pub async fn read_raw_by_handle(&self, handle: u32, length: u32) -> Result<Vec<u8>> {
        self.inner.read_raw_by_handle(handle, length).await
    }

    /// Writes raw bytes through a value handle.
    pub async fn write_raw_by_handle(&self, handle: u32, data: impl Into<Vec<u8>>) -> Result<()> {
        self.inner.write_raw_by_handle(handle, data.into()).await
    }

    /// Bundled raw reads in one round trip; per-target results.
    pub async fn read_raw_multi(
        &self,
        targets: &[SumReadTarget],
    ) -> Result<Vec<SumResult<Vec<u8>>>> {
        self.inner.read_raw_multi(targets).await
    }

    /// Bundled raw writes in one round trip; per-target results.
    pub async fn write_raw_multi(
        &self,
        targets: &[SumWriteTarget],
    ) -> Result<Vec<SumResult<()>>> {
        self.inner.write_raw_multi(targets).await
    }

    /// Bundled handle creation; per-path handle or error.
    pub async fn create_handle_multi(&self, paths: &[&str]) -> Result<Vec<SumResult<u32>>> {
        self.inner.create_handle_multi(paths).await
    }

    /// Bundled handle release; per-handle result.
    pub async fn delete_handle_multi(&self, handles: &[u32]) -> Result<Vec<SumResult<()>>> {
        self.inner.delete_handle_multi(handles).await
    }

    /// Subscribes to value changes of a symbol path or raw region.
    pub async fn subscribe(
        &self,
        target: impl Into<SubscriptionTarget>,
        settings: SubscriptionSettings,
        callback: impl Fn(SubscriptionSample) + Send + Sync + 'static,
    ) -> Result<SubscriptionHandle> {
        let subscription = self
            .inner
            .subscribe_with_role(
                target.into(),
                settings,
                Some(Arc::new(callback)),
                SubscriptionRole::User,
            )
            .await?;
        Ok(SubscriptionHandle::new(
            Arc::downgrade(&self.inner),
            subscription,
        ))
    }

    /// Unsubscribes every user subscription. Returns how many were removed.
    pub async fn unsubscribe_all(&self) -> Result<usize> {
        self.inner.unsubscribe_all().await
    }

    /// Sends a `WriteControl` to the target runtime.
    pub async fn write_control(
        &self,
        ads_state: AdsState,
        device_state: DeviceState,
        data: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.inner
            .write_control(ads_state, device_state, data.into())
            .await
    }

    /// Sets the PLC runtime to `Run`, preserving its device state.
    pub async fn start_plc(&self) -> Result<()> {
        self.inner.start_plc().await
    }

    /// Sets the PLC runtime to `Stop`, preserving its device state.
    pub async fn stop_plc(&self) -> Result<()> {
        self.inner.stop_plc().await
    }

    /// Restarts the PLC runtime (`Reset`), preserving its device state.
    pub async fn restart_plc(&self) -> Result<()> {
        self.inner.restart_plc().await
    }

    /// Puts the system manager into run mode.
    pub async fn set_system_to_run(&self) -> Result<()> {
        self.inner.set_system_to_run().await
    }

    /// Puts the system manager into config mode.
    pub async fn set_system_to_config(&self) -> Result<()> {
        self.inner.set_system_to_config().await
    }
}
