//! Reserved index groups for TwinCAT system services.
//!
//! The `0xF000` range addresses the symbol and type tables; `0xF080`..`0xF082`
//! are the sum (multi-request) services; `0x4020`/`0x4021` the PLC `%M` field.

use crate::ads::IndexGroup;

/// PLC memory area (`%M`), byte offset.
pub const PLC_MEMORY_AREA: IndexGroup = 0x4020;
/// PLC memory area (`%M`), bit offset.
pub const PLC_MEMORY_AREA_BITS: IndexGroup = 0x4021;
/// PLC data area.
pub const PLC_DATA_AREA: IndexGroup = 0x4040;
/// PLC process image inputs (`%I`).
pub const PLC_INPUTS: IndexGroup = 0xF020;
/// PLC process image outputs (`%Q`).
pub const PLC_OUTPUTS: IndexGroup = 0xF030;

/// Full symbol table.
pub const SYMBOL_TABLE: IndexGroup = 0xF000;
/// Write a symbol name, read back a value handle.
pub const SYMBOL_HANDLE_BY_NAME: IndexGroup = 0xF003;
/// Read/write a symbol value by name.
pub const SYMBOL_VALUE_BY_NAME: IndexGroup = 0xF004;
/// Read/write a symbol value by handle.
pub const SYMBOL_VALUE_BY_HANDLE: IndexGroup = 0xF005;
/// Release a value handle.
pub const SYMBOL_RELEASE_HANDLE: IndexGroup = 0xF006;
/// Write a symbol name, read back its info entry.
pub const SYMBOL_INFO_BY_NAME: IndexGroup = 0xF007;
/// Symbol table version (single byte, bumped on every online change).
pub const SYMBOL_VERSION: IndexGroup = 0xF008;
/// Write a symbol name, read back its extended info entry.
pub const SYMBOL_INFO_BY_NAME_EX: IndexGroup = 0xF009;
/// Bulk upload of the symbol table.
pub const SYMBOL_UPLOAD: IndexGroup = 0xF00B;
/// Bulk upload of the data-type table.
pub const SYMBOL_DATA_TYPE_UPLOAD: IndexGroup = 0xF00E;
/// Sizes of the symbol and data-type tables (24-byte summary).
pub const SYMBOL_UPLOAD_INFO2: IndexGroup = 0xF00F;
/// Write a type name, read back its extended data-type entry.
pub const DATA_TYPE_INFO_BY_NAME_EX: IndexGroup = 0xF011;

/// Sum command: bundled reads.
pub const SUM_READ: IndexGroup = 0xF080;
/// Sum command: bundled writes.
pub const SUM_WRITE: IndexGroup = 0xF081;
/// Sum command: bundled read-writes.
pub const SUM_READ_WRITE: IndexGroup = 0xF082;

/// Device data block (ADS state + device state of the runtime).
pub const DEVICE_DATA: IndexGroup = 0xF100;
