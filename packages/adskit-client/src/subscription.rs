//! Device-change subscriptions: targets, decode strategies, the dispatch
//! bookkeeping and the scoped handle returned to callers.

use crate::client::ClientInner;
use crate::error::Result;
use crate::meta::{AdsSymbol, DataType};
use crate::value::marshal::{MarshalOptions, parse_value};
use crate::value::PlcValue;
use adskit_core::ads::{IndexGroup, IndexOffset, TransMode};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::debug;

/// What a subscription watches: a symbol path or a raw region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionTarget {
    /// A symbol path such as `MAIN.counter`. Symbol and type info are
    /// resolved up front so samples decode into typed values.
    Symbol(String),
    /// An explicit region. Samples stay raw bytes.
    Raw {
        index_group: IndexGroup,
        index_offset: IndexOffset,
        /// Watched byte count; `None` lets the target decide (`0xFFFFFFFF`).
        size: Option<u32>,
    },
}

impl From<&str> for SubscriptionTarget {
    fn from(path: &str) -> Self {
        Self::Symbol(path.to_owned())
    }
}

impl From<String> for SubscriptionTarget {
    fn from(path: String) -> Self {
        Self::Symbol(path)
    }
}

/// Transmission settings of a subscription. Times are converted to the
/// protocol's 100-nanosecond units when the request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionSettings {
    pub mode: TransMode,
    /// How often the target checks the value.
    pub cycle_time: Duration,
    /// How long the target may buffer a change before sending.
    pub max_delay: Duration,
}

impl SubscriptionSettings {
    /// On-change with a 10 ms check cycle.
    pub fn on_change() -> Self {
        Self {
            mode: TransMode::OnChange,
            cycle_time: Duration::from_millis(10),
            max_delay: Duration::ZERO,
        }
    }

    /// A sample every `cycle_time`, changed or not.
    pub fn cyclic(cycle_time: Duration) -> Self {
        Self {
            mode: TransMode::Cyclic,
            cycle_time,
            max_delay: Duration::ZERO,
        }
    }

    /// Cycle time in the protocol's 100-ns units.
    pub(crate) fn cycle_time_raw(&self) -> u32 {
        (self.cycle_time.as_millis() as u32).saturating_mul(10_000)
    }

    /// Max delay in the protocol's 100-ns units.
    pub(crate) fn max_delay_raw(&self) -> u32 {
        (self.max_delay.as_millis() as u32).saturating_mul(10_000)
    }
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self::on_change()
    }
}

/// One delivered sample.
#[derive(Debug, Clone)]
pub struct SubscriptionSample {
    /// Decoded value; [`PlcValue::Bytes`] for raw targets.
    pub value: PlcValue,
    /// Target-side timestamp of the sample.
    pub timestamp: DateTime<Utc>,
    /// Symbol info, for symbol targets.
    pub symbol: Option<AdsSymbol>,
    /// Resolved type, for symbol targets.
    pub data_type: Option<DataType>,
    /// The raw sample bytes as pushed.
    pub raw: Vec<u8>,
}

/// User callback invoked per sample.
pub type SubscriptionCallback = Arc<dyn Fn(SubscriptionSample) + Send + Sync>;

/// Library-internal subscriptions get dispatched inside the engine instead
/// of through a user callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubscriptionRole {
    User,
    SymbolVersion,
    RuntimeState,
}

/// How to turn sample bytes into a value.
#[derive(Debug, Clone)]
pub(crate) enum DecodeStrategy {
    /// Known symbol: decode via the resolved type.
    Typed {
        symbol: AdsSymbol,
        data_type: DataType,
    },
    /// Unknown region: hand bytes through.
    Raw,
}

/// Engine-side record of an active (or quarantined) subscription. The
/// notification handle is re-assigned on every (re-)registration.
pub(crate) struct Subscription {
    pub target: SubscriptionTarget,
    pub settings: SubscriptionSettings,
    pub role: SubscriptionRole,
    pub callback: Option<SubscriptionCallback>,
    pub decode: Mutex<DecodeStrategy>,
    handle: AtomicU32,
    pub last_value: Mutex<Option<PlcValue>>,
}

impl Subscription {
    pub fn new(
        target: SubscriptionTarget,
        settings: SubscriptionSettings,
        role: SubscriptionRole,
        callback: Option<SubscriptionCallback>,
        decode: DecodeStrategy,
        handle: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            target,
            settings,
            role,
            callback,
            decode: Mutex::new(decode),
            handle: AtomicU32::new(handle),
            last_value: Mutex::new(None),
        })
    }

    /// True for library-generated subscriptions.
    pub fn is_internal(&self) -> bool {
        self.role != SubscriptionRole::User
    }

    pub fn handle(&self) -> u32 {
        self.handle.load(Ordering::SeqCst)
    }

    pub fn set_handle(&self, handle: u32) {
        self.handle.store(handle, Ordering::SeqCst);
    }

    /// Decodes a pushed sample per the strategy. Raw targets produce
    /// [`PlcValue::Bytes`].
    pub fn decode_sample(
        &self,
        data: &[u8],
        timestamp: DateTime<Utc>,
        opts: &MarshalOptions,
    ) -> Result<SubscriptionSample> {
        let strategy = self.decode.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let (value, symbol, data_type) = match strategy {
            DecodeStrategy::Typed { symbol, data_type } => {
                let value = parse_value(&data_type, data, opts)?;
                (value, Some(symbol), Some(data_type))
            }
            DecodeStrategy::Raw => (PlcValue::Bytes(data.to_vec()), None, None),
        };

        *self.last_value.lock().unwrap_or_else(|e| e.into_inner()) = Some(value.clone());

        Ok(SubscriptionSample {
            value,
            timestamp,
            symbol,
            data_type,
            raw: data.to_vec(),
        })
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("target", &self.target)
            .field("role", &self.role)
            .field("handle", &self.handle())
            .finish()
    }
}

/// Scoped handle to an active subscription.
///
/// [`close`](Self::close) deletes the notification at the target. Dropping
/// the handle without closing sends the delete best-effort in the background
/// (when a runtime is available); disconnecting the client releases
/// everything regardless.
pub struct SubscriptionHandle {
    client: Weak<ClientInner>,
    subscription: Arc<Subscription>,
    closed: AtomicBool,
}

impl SubscriptionHandle {
    pub(crate) fn new(client: Weak<ClientInner>, subscription: Arc<Subscription>) -> Self {
        Self {
            client,
            subscription,
            closed: AtomicBool::new(false),
        }
    }

    /// The current notification handle (changes across reconnects).
    pub fn notification_handle(&self) -> u32 {
        self.subscription.handle()
    }

    /// The last value delivered, if any.
    pub fn last_value(&self) -> Option<PlcValue> {
        self.subscription
            .last_value
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Unsubscribes: sends `DeleteNotification` and removes the dispatch
    /// entry.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(client) = self.client.upgrade() {
            client.remove_subscription(&self.subscription).await?;
        }
        Ok(())
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(client) = self.client.upgrade() else {
            return;
        };
        let subscription = Arc::clone(&self.subscription);
        // Best effort: no runtime, no delete; disconnect cleans up anyway.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = client.remove_subscription(&subscription).await {
                    debug!(error = %e, "drop-time unsubscribe failed");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_convert_to_100ns_units() {
        let s = SubscriptionSettings {
            mode: TransMode::Cyclic,
            cycle_time: Duration::from_millis(25),
            max_delay: Duration::from_millis(3),
        };
        assert_eq!(s.cycle_time_raw(), 250_000);
        assert_eq!(s.max_delay_raw(), 30_000);
    }

    #[test]
    fn raw_decode_keeps_bytes() {
        let sub = Subscription::new(
            SubscriptionTarget::Raw {
                index_group: 0xF005,
                index_offset: 0,
                size: Some(4),
            },
            SubscriptionSettings::default(),
            SubscriptionRole::User,
            None,
            DecodeStrategy::Raw,
            1,
        );

        let sample = sub
            .decode_sample(&[1, 2, 3], Utc::now(), &MarshalOptions::default())
            .unwrap();
        assert_eq!(sample.value, PlcValue::Bytes(vec![1, 2, 3]));
        assert_eq!(sub.last_value.lock().unwrap().clone(), Some(sample.value));
    }

    #[test]
    fn handle_reassignment() {
        let sub = Subscription::new(
            SubscriptionTarget::from("MAIN.x"),
            SubscriptionSettings::default(),
            SubscriptionRole::User,
            None,
            DecodeStrategy::Raw,
            10,
        );
        assert_eq!(sub.handle(), 10);
        sub.set_handle(42);
        assert_eq!(sub.handle(), 42);
        assert!(!sub.is_internal());
    }
}
