//! Async ADS/AMS client engine for Beckhoff TwinCAT targets.
//!
//! Built on the wire layer of `adskit-core`, this crate adds everything a
//! working client needs:
//!
//! - a registered local endpoint at the AMS router (or a fixed one),
//! - multiplexed request/response commands over one TCP socket with
//!   per-request deadlines and structured errors,
//! - device-change subscriptions with dispatch and restore across
//!   reconnects,
//! - the target's symbol and data-type metadata, cached and recursively
//!   resolved into marshallable views,
//! - typed value parsing and serialization ([`PlcValue`]),
//! - connection supervision: state polling, router notes, automatic
//!   reconnection and symbol-version monitoring.
//!
//! Start at [`AdsClient`].

pub mod client;
pub mod error;
pub mod events;
pub mod link;
pub mod meta;
pub mod settings;
pub mod subscription;
pub mod sum;
pub(crate) mod supervisor;
pub mod value;

pub use client::{AdsClient, DeviceInfo, HandleToken, SYSTEM_SERVICE_PORT, SymbolValue};
pub use error::{ClientError, Result, TRANSPORT_ERROR_CODE};
pub use events::{ClientEvent, DiagnosticKind};
pub use meta::{AdsSymbol, DataType, UploadInfo};
pub use settings::ClientSettings;
pub use subscription::{
    SubscriptionHandle, SubscriptionSample, SubscriptionSettings, SubscriptionTarget,
};
pub use sum::{CreatedHandle, SumReadTarget, SumResult, SumWriteTarget};
pub use value::{MarshalOptions, PlcValue};

pub use adskit_core as core;
