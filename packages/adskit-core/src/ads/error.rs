//! Parse errors for the ADS layer.

/// Errors when parsing an [`AdsHeader`](super::AdsHeader).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsHeaderError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing an [`AdsCommandId`](super::AdsCommandId).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsCommandIdError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing an [`AdsReturnCode`](super::AdsReturnCode).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsReturnCodeError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing an [`AdsState`](super::AdsState).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsStateError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing a [`TransMode`](super::TransMode).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TransModeError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing a [`NotificationHandle`](super::NotificationHandle).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NotificationHandleError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when parsing a [`Filetime`](super::Filetime).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FiletimeError {
    #[error("buffer too small: expected {expected} bytes, found {found}")]
    BufferTooSmall { expected: usize, found: usize },
}

/// Errors when encoding PLC strings.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StringError {
    #[error("string too long: {got} bytes do not fit in {capacity}")]
    TooLong { capacity: usize, got: usize },

    #[error("string contains characters not representable in {encoding}")]
    Unencodable { encoding: &'static str },
}
