// Canonical decoded heap object and its mapping to and from the wire holder.
use std::fmt;

use crate::core::addr::{decode_address, decode_address_list, encode_address, encode_address_list};
use crate::core::error::{Error, ErrorKind};
use crate::core::flags::FlagSet;
use crate::core::schema::{FlagFields, RecordFields};
use crate::core::ty::HeapType;

/// The record's opaque `value` payload. Textual for every type except
/// FLOAT, whose payload is the parsed 64-bit float.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Float(f64),
}

impl Default for Value {
    fn default() -> Self {
        Value::Text(String::new())
    }
}

impl Value {
    fn to_text(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Float(f) => format!("{f}"),
        }
    }
}

/// One failed field conversion; the record it belongs to is dropped from
/// the success stream, but every other field still converts.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl FieldError {
    fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.value, self.reason)
    }
}

/// Join all of a record's field failures into the single error reported
/// for it.
pub fn convert_error(errors: &[FieldError]) -> Error {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Error::new(ErrorKind::Convert).with_message(format!(
        "got {} errors decoding heap object: {joined}",
        errors.len()
    ))
}

/// The canonical in-memory form of one dump record.
///
/// Immutable once built; the eight discrete wire booleans live packed in
/// `flags`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeapObject {
    pub ty: HeapType,
    pub value: Value,
    pub name: String,

    pub node_type: String,

    pub address: u64,
    pub class: u64,
    pub references: Vec<u64>,

    pub default: u64,
    pub generation: u64,

    pub bytesize: u64,

    pub fd: i64,
    pub file: String,
    pub encoding: String,

    pub method: String,

    pub ivars: u64,
    pub length: u64,
    pub line: u64,
    pub memsize: u64,
    pub capacity: u64,
    pub size: u64,

    pub struct_name: String,
    pub flags: FlagSet,
}

impl HeapObject {
    /// Convert a decoded holder into the canonical form, best-effort.
    ///
    /// Every field converts independently; failures accumulate instead
    /// of short-circuiting, so the returned object carries whatever did
    /// convert alongside the full failure list.
    pub fn from_fields(fields: &RecordFields) -> (HeapObject, Vec<FieldError>) {
        let mut errors = Vec::new();

        let ty = match HeapType::from_name(&fields.ty) {
            Some(ty) => ty,
            None => {
                errors.push(FieldError::new("type", &fields.ty, "not a heap object type"));
                HeapType::Unknown
            }
        };

        let value = match ty {
            HeapType::Float => match fields.value.parse::<f64>() {
                Ok(parsed) => Value::Float(parsed),
                Err(err) => {
                    errors.push(FieldError::new("value", &fields.value, err.to_string()));
                    Value::Float(0.0)
                }
            },
            _ => Value::Text(fields.value.clone()),
        };

        let obj = HeapObject {
            ty,
            value,
            name: fields.name.clone(),
            node_type: fields.node_type.clone(),
            address: decode_field("address", &fields.address, &mut errors),
            class: decode_field("class", &fields.class, &mut errors),
            references: decode_address_list(&fields.references, |index, text, err| {
                errors.push(FieldError::new(
                    format!("references[{index}]"),
                    text,
                    err.message().unwrap_or("invalid hex address").to_string(),
                ));
            }),
            default: decode_field("default", &fields.default, &mut errors),
            generation: fields.generation,
            bytesize: fields.bytesize,
            fd: fields.fd,
            file: fields.file.clone(),
            encoding: fields.encoding.clone(),
            method: fields.method.clone(),
            ivars: fields.ivars,
            length: fields.length,
            line: fields.line,
            memsize: fields.memsize,
            capacity: fields.capacity,
            size: fields.size,
            struct_name: fields.struct_name.clone(),
            flags: pack_flags(fields),
        };

        (obj, errors)
    }

    /// As [`from_fields`], but a record with any failed field becomes a
    /// single aggregated error instead of a value.
    ///
    /// [`from_fields`]: HeapObject::from_fields
    pub fn try_from_fields(fields: &RecordFields) -> Result<HeapObject, Error> {
        let (obj, errors) = HeapObject::from_fields(fields);
        if errors.is_empty() {
            Ok(obj)
        } else {
            Err(convert_error(&errors))
        }
    }

    /// Exact inverse of [`from_fields`]: re-encode into the wire holder.
    /// Address-like fields always emit the 14-character hex form.
    ///
    /// [`from_fields`]: HeapObject::from_fields
    pub fn to_fields(&self) -> RecordFields {
        RecordFields {
            address: encode_address(self.address),
            class: encode_address(self.class),
            node_type: self.node_type.clone(),
            references: encode_address_list(&self.references),
            ty: self.ty.name().to_string(),
            value: self.value.to_text(),
            line: self.line,
            method: self.method.clone(),
            file: self.file.clone(),
            fd: self.fd,
            bytesize: self.bytesize,
            capacity: self.capacity,
            length: self.length,
            size: self.size,
            encoding: self.encoding.clone(),
            default: encode_address(self.default),
            name: self.name.clone(),
            struct_name: self.struct_name.clone(),
            ivars: self.ivars,
            generation: self.generation,
            memsize: self.memsize,
            frozen: self.flags.frozen(),
            embedded: self.flags.embedded(),
            broken: self.flags.broken(),
            fstring: self.flags.fstring(),
            shared: self.flags.shared(),
            flags: FlagFields {
                wb_protected: self.flags.gc_wb_protected(),
                old: self.flags.gc_old(),
                marked: self.flags.gc_marked(),
            },
        }
    }
}

fn decode_field(field: &'static str, text: &str, errors: &mut Vec<FieldError>) -> u64 {
    match decode_address(text) {
        Ok(addr) => addr,
        Err(err) => {
            errors.push(FieldError::new(
                field,
                text,
                err.message().unwrap_or("invalid hex address").to_string(),
            ));
            0
        }
    }
}

fn pack_flags(fields: &RecordFields) -> FlagSet {
    let mut flags = FlagSet::empty();
    flags.set(FlagSet::FROZEN, fields.frozen);
    flags.set(FlagSet::BROKEN, fields.broken);
    flags.set(FlagSet::FSTRING, fields.fstring);
    flags.set(FlagSet::EMBEDDED, fields.embedded);
    flags.set(FlagSet::SHARED, fields.shared);
    flags.set(FlagSet::GC_MARKED, fields.flags.marked);
    flags.set(FlagSet::GC_OLD, fields.flags.old);
    flags.set(FlagSet::GC_WB_PROTECTED, fields.flags.wb_protected);
    flags
}
