//! Client configuration.

use adskit_core::ams::{AmsNetId, AmsPort};
use adskit_core::io::AMS_TCP_PORT;
use std::time::Duration;

/// Settings for an [`AdsClient`](crate::AdsClient).
///
/// Only the target is mandatory; everything else has defaults matching a
/// local TwinCAT router setup.
///
/// ```
/// use adskit_client::ClientSettings;
///
/// let settings = ClientSettings::new("192.168.1.120.1.1".parse().unwrap(), 851)
///     .with_timeout(std::time::Duration::from_millis(500))
///     .with_auto_reconnect(false);
/// ```
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Net ID of the target runtime.
    pub target_net_id: AmsNetId,
    /// ADS port of the target runtime (e.g. `851` for the first PLC runtime).
    pub target_port: AmsPort,

    /// Hostname/IP of the AMS router to connect to.
    pub router_address: String,
    /// TCP port of the AMS router.
    pub router_tcp_port: u16,

    /// Local IP to bind the TCP socket to (multi-homed hosts).
    pub local_address: Option<std::net::IpAddr>,
    /// Local TCP port to bind; `0`/`None` leaves it ephemeral.
    pub local_tcp_port: Option<u16>,

    /// Fixed local AMS Net ID. When set together with `local_port`, the
    /// engine skips port registration entirely (bypass mode).
    pub local_net_id: Option<AmsNetId>,
    /// Fixed local ADS port; `None` asks the router to assign one.
    pub local_port: Option<AmsPort>,

    /// Deadline for a single request (and the connect handshake).
    pub timeout: Duration,

    /// Reconnect automatically after a lost connection.
    pub auto_reconnect: bool,
    /// Delay between reconnection attempts.
    pub reconnect_interval: Duration,
    /// Interval of the system-state poller.
    pub check_state_interval: Duration,
    /// How long state polling may fail before the link is declared down.
    pub connection_down_delay: Duration,

    /// Decode enum values into `{name, value}` pairs.
    pub objectify_enumerations: bool,
    /// Convert `DATE`/`DT` values to wall-clock timestamps.
    pub convert_dates: bool,
    /// Download and cache the full symbol table on connect.
    pub read_and_cache_symbols: bool,
    /// Download and cache the full data-type table on connect.
    pub read_and_cache_data_types: bool,
    /// Skip the internal symbol-version subscription.
    pub disable_symbol_version_monitoring: bool,
    /// Bare mode: no state poller, no upload info, no version monitoring.
    /// For targets that only speak raw ADS (no PLC runtime).
    pub bare_client: bool,
    /// Keep reading after the router half-closes the socket; the unregister
    /// handshake then resolves on `end` as well as on `close`.
    pub allow_half_open: bool,
}

impl ClientSettings {
    /// Creates settings for the given target with all defaults.
    pub fn new(target_net_id: AmsNetId, target_port: AmsPort) -> Self {
        Self {
            target_net_id,
            target_port,
            router_address: "127.0.0.1".into(),
            router_tcp_port: AMS_TCP_PORT,
            local_address: None,
            local_tcp_port: None,
            local_net_id: None,
            local_port: None,
            timeout: Duration::from_millis(2000),
            auto_reconnect: true,
            reconnect_interval: Duration::from_millis(2000),
            check_state_interval: Duration::from_millis(1000),
            connection_down_delay: Duration::from_millis(5000),
            objectify_enumerations: true,
            convert_dates: true,
            read_and_cache_symbols: false,
            read_and_cache_data_types: false,
            disable_symbol_version_monitoring: false,
            bare_client: false,
            allow_half_open: false,
        }
    }

    /// Sets the router address (default `127.0.0.1`).
    pub fn with_router(mut self, address: impl Into<String>, tcp_port: u16) -> Self {
        self.router_address = address.into();
        self.router_tcp_port = tcp_port;
        self
    }

    /// Fixes the local AMS address, skipping router port registration.
    pub fn with_local_address(mut self, net_id: AmsNetId, port: AmsPort) -> Self {
        self.local_net_id = Some(net_id);
        self.local_port = Some(port);
        self
    }

    /// Sets the per-request timeout (default 2 s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables automatic reconnection (default on).
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Sets the reconnect interval (default 2 s).
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Enables bare mode (default off).
    pub fn with_bare_client(mut self, bare: bool) -> Self {
        self.bare_client = bare;
        self
    }

    /// Enables symbol/type cache pre-warming on connect.
    pub fn with_metadata_caching(mut self, symbols: bool, data_types: bool) -> Self {
        self.read_and_cache_symbols = symbols;
        self.read_and_cache_data_types = data_types;
        self
    }

    /// Binds the local side of the TCP socket (multi-homed hosts).
    pub fn with_local_bind(mut self, address: std::net::IpAddr, tcp_port: u16) -> Self {
        self.local_address = Some(address);
        self.local_tcp_port = Some(tcp_port);
        self
    }

    /// Local socket address to bind, when configured.
    pub fn local_bind_addr(&self) -> Option<std::net::SocketAddr> {
        self.local_address
            .map(|ip| std::net::SocketAddr::new(ip, self.local_tcp_port.unwrap_or(0)))
    }

    /// True when both a local Net ID and port are fixed, so router port
    /// registration is skipped.
    pub fn bypasses_registration(&self) -> bool {
        self.local_net_id.is_some() && self.local_port.is_some()
    }

    /// Socket address of the router, `host:port`.
    pub fn router_socket_addr(&self) -> String {
        format!("{}:{}", self.router_address, self.router_tcp_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = ClientSettings::new(AmsNetId::LOCAL, 851);
        assert_eq!(s.router_tcp_port, 48898);
        assert_eq!(s.timeout, Duration::from_millis(2000));
        assert!(s.auto_reconnect);
        assert!(s.objectify_enumerations);
        assert!(!s.bypasses_registration());
    }

    #[test]
    fn bypass_needs_both_fields() {
        let s = ClientSettings::new(AmsNetId::LOCAL, 851)
            .with_local_address(AmsNetId::new(10, 0, 0, 1, 1, 1), 30000);
        assert!(s.bypasses_registration());
    }
}
