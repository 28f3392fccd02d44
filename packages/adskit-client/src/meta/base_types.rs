//! The IEC base-type table: name aliases, wire tags and byte sizes, plus the
//! pseudo types (pointers, references, platform-width integers) that must be
//! substituted by size instead of resolved recursively.

use adskit_core::ads::AdsDataTypeId;

/// A primitive PLC type: its wire tag and byte size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseType {
    pub id: AdsDataTypeId,
    pub size: u32,
}

impl BaseType {
    const fn new(id: AdsDataTypeId, size: u32) -> Self {
        Self { id, size }
    }
}

/// Default STRING capacity when undeclared: `STRING` means `STRING(80)`,
/// 80 characters plus the NUL.
pub const DEFAULT_STRING_LEN: u32 = 81;
/// Default WSTRING capacity: 80 UTF-16 units plus the NUL, in bytes.
pub const DEFAULT_WSTRING_LEN: u32 = 162;

/// Looks up a base type by any of its IEC aliases, case-insensitively.
/// Handles parameterized `STRING(n)` / `WSTRING(n)` forms.
pub fn lookup(name: &str) -> Option<BaseType> {
    let upper = name.trim().to_ascii_uppercase();

    if let Some(len) = parse_sized(&upper, "STRING") {
        return Some(BaseType::new(AdsDataTypeId::String, len + 1));
    }
    if let Some(len) = parse_sized(&upper, "WSTRING") {
        return Some(BaseType::new(AdsDataTypeId::WString, 2 * len + 2));
    }

    let ty = match upper.as_str() {
        "BOOL" | "BIT" | "BIT8" => BaseType::new(AdsDataTypeId::Bit, 1),
        "BYTE" | "USINT" | "UINT8" | "BITARR8" => BaseType::new(AdsDataTypeId::UInt8, 1),
        "SINT" | "INT8" => BaseType::new(AdsDataTypeId::Int8, 1),
        "UINT" | "WORD" | "UINT16" | "BITARR16" => BaseType::new(AdsDataTypeId::UInt16, 2),
        "INT" | "INT16" => BaseType::new(AdsDataTypeId::Int16, 2),
        "DINT" | "INT32" => BaseType::new(AdsDataTypeId::Int32, 4),
        "UDINT" | "DWORD" | "TIME" | "TOD" | "TIME_OF_DAY" | "UINT32" | "BITARR32" => {
            BaseType::new(AdsDataTypeId::UInt32, 4)
        }
        "DATE" | "DT" | "DATE_AND_TIME" => BaseType::new(AdsDataTypeId::UInt32, 4),
        "REAL" | "FLOAT" => BaseType::new(AdsDataTypeId::Real32, 4),
        "LREAL" | "DOUBLE" => BaseType::new(AdsDataTypeId::Real64, 8),
        "LINT" | "INT64" => BaseType::new(AdsDataTypeId::Int64, 8),
        "ULINT" | "LWORD" | "LTIME" | "UINT64" => BaseType::new(AdsDataTypeId::UInt64, 8),
        "STRING" => BaseType::new(AdsDataTypeId::String, DEFAULT_STRING_LEN),
        "WSTRING" => BaseType::new(AdsDataTypeId::WString, DEFAULT_WSTRING_LEN),
        _ => return None,
    };
    Some(ty)
}

/// True when `name` is a date flavour (seconds since epoch on the wire).
pub fn is_date_type(name: &str) -> bool {
    matches!(
        name.trim().to_ascii_uppercase().as_str(),
        "DATE" | "DT" | "DATE_AND_TIME"
    )
}

/// True when the name is a pseudo type that must not be resolved recursively:
/// pointers and references (following them would loop on cyclic graphs) and
/// the platform-width integer aliases.
pub fn is_pseudo_type(name: &str) -> bool {
    let upper = name.trim().to_ascii_uppercase();
    upper.starts_with("POINTER TO ")
        || upper.starts_with("REFERENCE TO ")
        || matches!(upper.as_str(), "PVOID" | "XINT" | "UXINT" | "XWORD")
}

/// The concrete unsigned base type matching a pseudo type's byte size.
pub fn pseudo_substitute(size: u32) -> Option<BaseType> {
    match size {
        2 => Some(BaseType::new(AdsDataTypeId::UInt16, 2)),
        4 => Some(BaseType::new(AdsDataTypeId::UInt32, 4)),
        8 => Some(BaseType::new(AdsDataTypeId::UInt64, 8)),
        _ => None,
    }
}

/// Parses `PREFIX(n)` or `PREFIX[n]`, returning `n`.
fn parse_sized(upper: &str, prefix: &str) -> Option<u32> {
    let rest = upper.strip_prefix(prefix)?;
    let rest = rest.trim();
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .or_else(|| rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')))?;
    inner.trim().parse::<u32>().ok()
}
