/// Primitive type tags used in symbol and data-type metadata (`adsDataType`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AdsDataTypeId {
    /// No type / placeholder (0).
    #[default]
    Void,
    /// 16-bit signed integer (2).
    Int16,
    /// 32-bit signed integer (3).
    Int32,
    /// 32-bit float (4).
    Real32,
    /// 64-bit float (5).
    Real64,
    /// 8-bit signed integer (16).
    Int8,
    /// 8-bit unsigned integer (17).
    UInt8,
    /// 16-bit unsigned integer (18).
    UInt16,
    /// 32-bit unsigned integer (19).
    UInt32,
    /// 64-bit signed integer (20).
    Int64,
    /// 64-bit unsigned integer (21).
    UInt64,
    /// NUL-terminated single-byte string, Windows-1252 (30).
    String,
    /// NUL-terminated UTF-16LE string (31).
    WString,
    /// 80-bit extended float (32).
    Real80,
    /// Single bit (33).
    Bit,
    /// Structured/compound type (65).
    BigType,
    /// Marker for the end of the tag range (67).
    MaxTypes,
    /// A tag this library does not know.
    Unknown(u32),
}

impl AdsDataTypeId {
    /// Length of a type tag on the wire.
    pub const LENGTH: usize = 4;

    /// Serializes into a 4-byte little-endian array.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        u32::from(*self).to_le_bytes()
    }

    /// Deserializes from a 4-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        u32::from_le_bytes(bytes).into()
    }
}

impl From<u32> for AdsDataTypeId {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Void,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Real32,
            5 => Self::Real64,
            16 => Self::Int8,
            17 => Self::UInt8,
            18 => Self::UInt16,
            19 => Self::UInt32,
            20 => Self::Int64,
            21 => Self::UInt64,
            30 => Self::String,
            31 => Self::WString,
            32 => Self::Real80,
            33 => Self::Bit,
            65 => Self::BigType,
            67 => Self::MaxTypes,
            n => Self::Unknown(n),
        }
    }
}

impl From<AdsDataTypeId> for u32 {
    fn from(value: AdsDataTypeId) -> Self {
        match value {
            AdsDataTypeId::Void => 0,
            AdsDataTypeId::Int16 => 2,
            AdsDataTypeId::Int32 => 3,
            AdsDataTypeId::Real32 => 4,
            AdsDataTypeId::Real64 => 5,
            AdsDataTypeId::Int8 => 16,
            AdsDataTypeId::UInt8 => 17,
            AdsDataTypeId::UInt16 => 18,
            AdsDataTypeId::UInt32 => 19,
            AdsDataTypeId::Int64 => 20,
            AdsDataTypeId::UInt64 => 21,
            AdsDataTypeId::String => 30,
            AdsDataTypeId::WString => 31,
            AdsDataTypeId::Real80 => 32,
            AdsDataTypeId::Bit => 33,
            AdsDataTypeId::BigType => 65,
            AdsDataTypeId::MaxTypes => 67,
            AdsDataTypeId::Unknown(n) => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_roundtrip() {
        for code in [0u32, 2, 3, 4, 5, 16, 17, 18, 19, 20, 21, 30, 31, 32, 33, 65, 67, 123] {
            assert_eq!(u32::from(AdsDataTypeId::from(code)), code);
        }
    }
}
