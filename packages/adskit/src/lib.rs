//! ADS/AMS client toolkit for Beckhoff TwinCAT targets.
//!
//! One import for the whole stack:
//!
//! - [`core`]: wire-format types, framing and payload codecs,
//! - [`client`]: the async client engine (requests, subscriptions, symbol
//!   and type resolution, supervision).
//!
//! ```no_run
//! use adskit::{AdsClient, ClientSettings};
//!
//! # async fn demo() -> adskit::client::Result<()> {
//! let settings = ClientSettings::new("192.168.1.120.1.1".parse().unwrap(), 851);
//! let client = AdsClient::new(settings);
//! client.connect().await?;
//! println!("state: {:?}", client.read_state().await?);
//! # Ok(())
//! # }
//! ```

pub use adskit_client as client;
pub use adskit_core as core;

pub use adskit_client::{
    AdsClient, ClientError, ClientEvent, ClientSettings, PlcValue, SubscriptionSettings,
    SubscriptionTarget,
};
pub use adskit_core::{AmsAddr, AmsNetId, AdsState, TransMode};
