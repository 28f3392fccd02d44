//! The resolved type view: a fully expanded, marshalling-ready description
//! built recursively from raw entries. The network-facing recursion lives on
//! the client (it fetches referenced entries on demand); the pure steps are
//! here.

use super::base_types::{self, BaseType};
use super::datatype::DataTypeEntry;
use super::{ArrayInfo, Attribute};
use crate::error::ClientError;
use crate::value::PlcValue;
use adskit_core::ads::AdsDataTypeId;
use std::collections::HashMap;

/// One enum member with its value decoded via the resolved primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEnumValue {
    pub name: String,
    pub value: PlcValue,
}

/// A fully resolved data type, ready for value marshalling.
///
/// Primitives have empty `sub_items` and `array_info`; structs list their
/// members with instance names and offsets; arrays carry the element view
/// with the dimensions prepended (arrays-of-arrays concatenate).
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    /// Instance name when this view describes a struct member, else empty.
    pub name: String,
    /// Resolved type name.
    pub type_name: String,
    /// Byte size of one element (excluding array dimensions).
    pub size: u32,
    /// Byte offset within the enclosing struct, 0 at top level.
    pub offset: u32,
    pub data_type_id: AdsDataTypeId,
    pub comment: String,
    pub attributes: Vec<Attribute>,
    pub array_info: Vec<ArrayInfo>,
    pub sub_items: Vec<DataType>,
    pub enum_values: Vec<ResolvedEnumValue>,
    /// Names of RPC methods the type exposes (metadata only).
    pub rpc_method_names: Vec<String>,
}

impl DataType {
    /// A minimal terminal view for a base type.
    pub fn terminal(type_name: impl Into<String>, base: BaseType) -> Self {
        Self {
            name: String::new(),
            type_name: type_name.into(),
            size: base.size,
            offset: 0,
            data_type_id: base.id,
            comment: String::new(),
            attributes: Vec::new(),
            array_info: Vec::new(),
            sub_items: Vec::new(),
            enum_values: Vec::new(),
            rpc_method_names: Vec::new(),
        }
    }

    /// True when the view has array dimensions.
    pub fn is_array(&self) -> bool {
        !self.array_info.is_empty()
    }

    /// True when the view is an enum.
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }

    /// True when the view is struct-like.
    pub fn is_struct(&self) -> bool {
        !self.sub_items.is_empty()
    }

    /// Total element count across all array dimensions (1 for non-arrays).
    pub fn element_count(&self) -> usize {
        self.array_info.iter().map(|d| d.length as usize).product()
    }

    /// Total byte length of a value of this type, dimensions included.
    pub fn byte_len(&self) -> usize {
        self.size as usize * self.element_count()
    }

    /// Looks up an enum member by its decoded value.
    pub fn enum_name_of(&self, value: &PlcValue) -> Option<&str> {
        self.enum_values
            .iter()
            .find(|e| &e.value == value)
            .map(|e| e.name.as_str())
    }

    /// Looks up an enum member by name, case-insensitively.
    pub fn enum_value_of(&self, name: &str) -> Option<&PlcValue> {
        self.enum_values
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| &e.value)
    }
}

/// Case-insensitive cache of resolved views, keyed by lowercased type name.
#[derive(Debug, Default)]
pub struct TypeCache {
    map: HashMap<String, DataType>,
}

impl TypeCache {
    pub fn get(&self, name: &str) -> Option<DataType> {
        self.map.get(&name.to_lowercase()).cloned()
    }

    pub fn insert(&mut self, name: &str, ty: DataType) {
        self.map.insert(name.to_lowercase(), ty);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Decides what the next resolution step for a raw entry is. The client
/// drives the recursion because referenced entries may need a network fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveStep {
    /// The entry is terminal; the view is complete.
    Done(DataType),
    /// Resolve each sub-item's type name, then assemble a struct view via
    /// [`assemble_struct`].
    Struct,
    /// Resolve the element type name, then prepend this entry's dimensions
    /// via [`assemble_array`].
    Array { element_type: String },
    /// Resolve the underlying primitive, then attach decoded enum members
    /// via [`assemble_enum`].
    Enum { underlying: String },
    /// Follow the alias to another type name and use that view.
    Alias { target: String },
}

/// Classifies a raw entry per the resolution rules.
pub fn classify(entry: &DataTypeEntry) -> Result<ResolveStep, ClientError> {
    // Struct-like entries (including empty structs of size 0) stand alone.
    if !entry.sub_items.is_empty() {
        return Ok(ResolveStep::Struct);
    }

    if entry.array_dimension > 0 {
        return Ok(ResolveStep::Array {
            element_type: entry.type_name.clone(),
        });
    }

    if entry.is_data_type() && !entry.enum_values.is_empty() {
        return Ok(ResolveStep::Enum {
            underlying: entry.type_name.clone(),
        });
    }

    // Pseudo types substitute the size-matched integer; never follow them
    // (pointer graphs may be cyclic).
    let referenced = if entry.type_name.is_empty() {
        &entry.name
    } else {
        &entry.type_name
    };
    if base_types::is_pseudo_type(referenced) {
        let base = base_types::pseudo_substitute(entry.size).ok_or_else(|| {
            ClientError::UnknownType(format!(
                "pseudo type '{referenced}' with unsupported size {}",
                entry.size
            ))
        })?;
        return Ok(ResolveStep::Done(DataType {
            type_name: referenced.clone(),
            comment: entry.comment.clone(),
            ..DataType::terminal(referenced.clone(), base)
        }));
    }

    // Terminal declarations: primitives and empty structs (size 0, no
    // members) both stand as-is.
    if entry.is_data_type()
        && entry.enum_values.is_empty()
        && (entry.type_name.is_empty() || base_types::lookup(&entry.type_name).is_some())
    {
        return Ok(ResolveStep::Done(terminal_from_entry(entry)));
    }

    Ok(ResolveStep::Alias {
        target: entry.type_name.clone(),
    })
}

/// Builds the terminal view of a raw entry.
fn terminal_from_entry(entry: &DataTypeEntry) -> DataType {
    let type_name = if entry.type_name.is_empty() {
        entry.name.clone()
    } else {
        entry.type_name.clone()
    };
    DataType {
        name: String::new(),
        type_name,
        size: entry.size,
        offset: entry.offset,
        data_type_id: entry.data_type_id,
        comment: entry.comment.clone(),
        attributes: entry.attributes.clone(),
        array_info: Vec::new(),
        sub_items: Vec::new(),
        enum_values: Vec::new(),
        rpc_method_names: entry.rpc_methods.iter().map(|m| m.name.clone()).collect(),
    }
}

/// Assembles a struct view: each member view was resolved from the member's
/// type name; instance name, offset and comment come from the raw sub-item.
pub fn assemble_struct(entry: &DataTypeEntry, member_views: Vec<DataType>) -> DataType {
    let sub_items = entry
        .sub_items
        .iter()
        .zip(member_views)
        .map(|(raw, view)| DataType {
            name: raw.name.clone(),
            offset: raw.offset,
            comment: raw.comment.clone(),
            ..view
        })
        .collect();

    DataType {
        name: String::new(),
        type_name: entry.name.clone(),
        size: entry.size,
        offset: entry.offset,
        data_type_id: entry.data_type_id,
        comment: entry.comment.clone(),
        attributes: entry.attributes.clone(),
        array_info: Vec::new(),
        sub_items,
        enum_values: Vec::new(),
        rpc_method_names: entry.rpc_methods.iter().map(|m| m.name.clone()).collect(),
    }
}

/// Assembles an array view: this entry's dimensions go in front of the
/// element view's own dimensions (arrays-of-arrays).
pub fn assemble_array(entry: &DataTypeEntry, element_view: DataType) -> DataType {
    let mut array_info = entry.array_info.clone();
    array_info.extend(element_view.array_info.iter().copied());
    DataType {
        array_info,
        comment: if entry.comment.is_empty() {
            element_view.comment.clone()
        } else {
            entry.comment.clone()
        },
        ..element_view
    }
}

/// Assembles an enum view on top of its resolved underlying primitive, with
/// member values decoded via the primitive's reader.
pub fn assemble_enum(
    entry: &DataTypeEntry,
    underlying: DataType,
) -> Result<DataType, ClientError> {
    let mut enum_values = Vec::with_capacity(entry.enum_values.len());
    for member in &entry.enum_values {
        let value = crate::value::decode_enum_raw(underlying.data_type_id, &member.raw)
            .ok_or_else(|| {
                ClientError::Metadata(format!(
                    "enum '{}' member '{}' has undecodable value bytes",
                    entry.name, member.name
                ))
            })?;
        enum_values.push(ResolvedEnumValue {
            name: member.name.clone(),
            value,
        });
    }

    Ok(DataType {
        type_name: entry.name.clone(),
        comment: entry.comment.clone(),
        attributes: entry.attributes.clone(),
        enum_values,
        ..underlying
    })
}

/// Fallback for older targets without type info: a terminal view straight
/// from the base-type table, honoring a size hint for strings.
pub fn fallback_view(name: &str, size_hint: Option<u32>) -> Option<DataType> {
    if base_types::is_pseudo_type(name) {
        let base = base_types::pseudo_substitute(size_hint?)?;
        return Some(DataType::terminal(name, base));
    }

    let mut base = base_types::lookup(name)?;
    if let Some(hint) = size_hint {
        // STRING sizes come from the declaration; trust the hint when given.
        if matches!(base.id, AdsDataTypeId::String | AdsDataTypeId::WString) && hint > 0 {
            base.size = hint;
        }
    }
    Some(DataType::terminal(name, base))
}
