//! Wire-format types, framing and payload codecs for the Beckhoff ADS/AMS
//! protocol, little-endian throughout.
//!
//! Three layers stack on the wire:
//!
//! 1. the 6-byte [`AmsTcpHeader`] (router command + payload length),
//! 2. the 32-byte [`AdsHeader`] (addressing, command id, flags, invoke id),
//! 3. the command body, covered by the [`payload`] codecs.
//!
//! [`io`] turns tokio byte streams into complete [`AmsFrame`]s and back.
//! Client logic (request correlation, subscriptions, symbol metadata) lives
//! in `adskit-client`.

/// ADS layer: command ids, routing header, states and primitive wire types.
pub mod ads;

/// AMS layer: addressing, router commands and the AMS/TCP header.
pub mod ams;

/// Reserved index groups for TwinCAT system services.
pub mod index_group;

/// Frame I/O over tokio streams.
pub mod io;

/// Body codecs for every ADS command and the router packets.
pub mod payload;

pub use ads::{
    AdsCommandId, AdsDataTypeId, AdsHeader, AdsReturnCode, AdsState, DeviceState, DeviceVersion,
    Filetime, IndexGroup, IndexOffset, InvokeId, NotificationHandle, StateFlags, TransMode,
};
pub use ams::{AmsAddr, AmsCommand, AmsNetId, AmsPort, AmsTcpHeader, RouterState};
pub use io::{AMS_TCP_PORT, AmsFrame, AmsStream, FrameReader, FrameWriter};
