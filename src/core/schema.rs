// Wire-shaped view of one dump record: every member in its textual/primitive
// source form, before any domain conversion.
use serde::{Deserialize, Serialize};

fn u64_is_zero(value: &u64) -> bool {
    *value == 0
}

fn i64_is_zero(value: &i64) -> bool {
    *value == 0
}

fn bool_is_false(value: &bool) -> bool {
    !*value
}

fn flags_are_empty(flags: &FlagFields) -> bool {
    !(flags.wb_protected || flags.old || flags.marked)
}

/// The nested GC `flags` object.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagFields {
    #[serde(skip_serializing_if = "bool_is_false")]
    pub wb_protected: bool,
    #[serde(skip_serializing_if = "bool_is_false")]
    pub old: bool,
    #[serde(skip_serializing_if = "bool_is_false")]
    pub marked: bool,
}

impl FlagFields {
    pub fn clear(&mut self) {
        self.wb_protected = false;
        self.old = false;
        self.marked = false;
    }
}

/// Intermediate holder for one record. A decode worker owns exactly one
/// and reuses it across the records it processes; it is never shared.
///
/// Must be [`clear`]ed before each record so a member the record omits
/// never carries a value over from the previous record.
///
/// Field order is the stable encode order; empty/zero/false members are
/// omitted on serialization, matching the dump convention.
///
/// [`clear`]: RecordFields::clear
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFields {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub ty: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub line: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(skip_serializing_if = "i64_is_zero")]
    pub fd: i64,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub bytesize: u64,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub capacity: u64,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub length: u64,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub size: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encoding: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "struct", skip_serializing_if = "String::is_empty")]
    pub struct_name: String,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub ivars: u64,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub generation: u64,
    #[serde(skip_serializing_if = "u64_is_zero")]
    pub memsize: u64,
    #[serde(skip_serializing_if = "bool_is_false")]
    pub frozen: bool,
    #[serde(skip_serializing_if = "bool_is_false")]
    pub embedded: bool,
    #[serde(skip_serializing_if = "bool_is_false")]
    pub broken: bool,
    #[serde(skip_serializing_if = "bool_is_false")]
    pub fstring: bool,
    #[serde(skip_serializing_if = "bool_is_false")]
    pub shared: bool,
    #[serde(skip_serializing_if = "flags_are_empty")]
    pub flags: FlagFields,
}

impl RecordFields {
    /// Reset every slot to its zero value, keeping the references
    /// buffer's capacity for the next record.
    pub fn clear(&mut self) {
        self.address.clear();
        self.class.clear();
        self.node_type.clear();
        self.references.clear();
        self.ty.clear();
        self.value.clear();
        self.line = 0;
        self.method.clear();
        self.file.clear();
        self.fd = 0;
        self.bytesize = 0;
        self.capacity = 0;
        self.length = 0;
        self.size = 0;
        self.encoding.clear();
        self.default.clear();
        self.name.clear();
        self.struct_name.clear();
        self.ivars = 0;
        self.generation = 0;
        self.memsize = 0;
        self.frozen = false;
        self.embedded = false;
        self.broken = false;
        self.fstring = false;
        self.shared = false;
        self.flags.clear();
    }
}
