//! Parse errors for the AMS layer.

/// Errors when parsing an [`AmsNetId`](super::AmsNetId).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NetIdError {
    #[error("expected {expected} octets, found {found}")]
    WrongOctetCount { expected: usize, found: usize },

    #[error("invalid octet at position {position}: '{value}'")]
    InvalidOctet { position: usize, value: String },

    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing an [`AmsAddr`](super::AmsAddr).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AddrError {
    #[error("invalid Net ID: {0}")]
    InvalidNetId(#[from] NetIdError),

    #[error("invalid port: '{0}'")]
    InvalidPort(String),

    #[error("missing ':' separator between Net ID and port")]
    MissingSeparator,

    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing an [`AmsTcpHeader`](super::AmsTcpHeader).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AmsTcpHeaderError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing a [`RouterState`](super::RouterState).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RouterStateError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}
