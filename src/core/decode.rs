// Streaming per-record decoder. One forward pass over the record's members,
// each known name dispatched into its RecordFields slot, everything else
// discarded without materializing a generic document.
use std::fmt;

use bstr::ByteSlice;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

use crate::core::error::{Error, ErrorKind};
use crate::core::schema::{FlagFields, RecordFields};

const MAX_SNIPPET_BYTES: usize = 64;

/// Decode one textual record into `fields`.
///
/// The caller clears `fields` beforehand; this function only writes the
/// members the record actually carries. Member names outside the known
/// set are skipped, so records from older or newer schema versions still
/// decode. Structural failures (malformed syntax, a non-string element
/// in `references`) abort this record only.
pub fn decode_record(raw: &[u8], fields: &mut RecordFields) -> Result<(), Error> {
    let mut de = serde_json::Deserializer::from_slice(raw);
    if let Err(err) = (RecordSeed { fields }).deserialize(&mut de) {
        return Err(syntax_error(raw, err));
    }
    de.end().map_err(|err| syntax_error(raw, err))
}

fn syntax_error(raw: &[u8], err: serde_json::Error) -> Error {
    Error::new(ErrorKind::Syntax)
        .with_message(err.to_string())
        .with_snippet(truncate_snippet(raw, MAX_SNIPPET_BYTES))
}

fn truncate_snippet(raw: &[u8], max: usize) -> String {
    let text = raw.trim().to_str_lossy();
    if text.len() <= max {
        return text.into_owned();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Fixed dispatch table over top-level member names.
enum FieldKey {
    Address,
    Class,
    NodeType,
    References,
    Type,
    Value,
    Line,
    Method,
    File,
    Fd,
    Bytesize,
    Capacity,
    Length,
    Size,
    Encoding,
    Default,
    Name,
    Struct,
    Ivars,
    Generation,
    Memsize,
    Frozen,
    Embedded,
    Broken,
    Fstring,
    Shared,
    Flags,
    Other,
}

impl<'de> de::Deserialize<'de> for FieldKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = FieldKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a record member name")
            }

            fn visit_str<E>(self, name: &str) -> Result<FieldKey, E>
            where
                E: de::Error,
            {
                Ok(match name {
                    "address" => FieldKey::Address,
                    "class" => FieldKey::Class,
                    "node_type" => FieldKey::NodeType,
                    "references" => FieldKey::References,
                    "type" => FieldKey::Type,
                    "value" => FieldKey::Value,
                    "line" => FieldKey::Line,
                    "method" => FieldKey::Method,
                    "file" => FieldKey::File,
                    "fd" => FieldKey::Fd,
                    "bytesize" => FieldKey::Bytesize,
                    "capacity" => FieldKey::Capacity,
                    "length" => FieldKey::Length,
                    "size" => FieldKey::Size,
                    "encoding" => FieldKey::Encoding,
                    "default" => FieldKey::Default,
                    "name" => FieldKey::Name,
                    "struct" => FieldKey::Struct,
                    "ivars" => FieldKey::Ivars,
                    "generation" => FieldKey::Generation,
                    "memsize" => FieldKey::Memsize,
                    "frozen" => FieldKey::Frozen,
                    "embedded" => FieldKey::Embedded,
                    "broken" => FieldKey::Broken,
                    "fstring" => FieldKey::Fstring,
                    "shared" => FieldKey::Shared,
                    "flags" => FieldKey::Flags,
                    _ => FieldKey::Other,
                })
            }
        }

        deserializer.deserialize_identifier(KeyVisitor)
    }
}

struct RecordSeed<'a> {
    fields: &'a mut RecordFields,
}

impl<'de> DeserializeSeed<'de> for RecordSeed<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for RecordSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a heap dump record object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        let fields = self.fields;
        while let Some(key) = map.next_key::<FieldKey>()? {
            match key {
                FieldKey::Address => fields.address = map.next_value()?,
                FieldKey::Class => fields.class = map.next_value()?,
                FieldKey::NodeType => fields.node_type = map.next_value()?,
                FieldKey::References => map.next_value_seed(ReferencesSeed {
                    out: &mut fields.references,
                })?,
                FieldKey::Type => fields.ty = map.next_value()?,
                FieldKey::Value => fields.value = map.next_value()?,
                FieldKey::Line => fields.line = map.next_value()?,
                FieldKey::Method => fields.method = map.next_value()?,
                FieldKey::File => fields.file = map.next_value()?,
                FieldKey::Fd => fields.fd = map.next_value()?,
                FieldKey::Bytesize => fields.bytesize = map.next_value()?,
                FieldKey::Capacity => fields.capacity = map.next_value()?,
                FieldKey::Length => fields.length = map.next_value()?,
                FieldKey::Size => fields.size = map.next_value()?,
                FieldKey::Encoding => fields.encoding = map.next_value()?,
                FieldKey::Default => fields.default = map.next_value()?,
                FieldKey::Name => fields.name = map.next_value()?,
                FieldKey::Struct => fields.struct_name = map.next_value()?,
                FieldKey::Ivars => fields.ivars = map.next_value()?,
                FieldKey::Generation => fields.generation = map.next_value()?,
                FieldKey::Memsize => fields.memsize = map.next_value()?,
                FieldKey::Frozen => fields.frozen = map.next_value()?,
                FieldKey::Embedded => fields.embedded = map.next_value()?,
                FieldKey::Broken => fields.broken = map.next_value()?,
                FieldKey::Fstring => fields.fstring = map.next_value()?,
                FieldKey::Shared => fields.shared = map.next_value()?,
                FieldKey::Flags => map.next_value_seed(FlagsSeed {
                    flags: &mut fields.flags,
                })?,
                FieldKey::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(())
    }
}

/// Appends into the holder's reused buffer; every element must be a
/// string token, anything else fails the record.
struct ReferencesSeed<'a> {
    out: &'a mut Vec<String>,
}

impl<'de> DeserializeSeed<'de> for ReferencesSeed<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for ReferencesSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of hex address strings")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(addr) = seq.next_element::<String>()? {
            self.out.push(addr);
        }
        Ok(())
    }
}

/// Second dispatch table, scoped to the nested GC flags object.
enum FlagKey {
    WbProtected,
    Old,
    Marked,
    Other,
}

impl<'de> de::Deserialize<'de> for FlagKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = FlagKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a flags member name")
            }

            fn visit_str<E>(self, name: &str) -> Result<FlagKey, E>
            where
                E: de::Error,
            {
                Ok(match name {
                    "wb_protected" => FlagKey::WbProtected,
                    "old" => FlagKey::Old,
                    "marked" => FlagKey::Marked,
                    _ => FlagKey::Other,
                })
            }
        }

        deserializer.deserialize_identifier(KeyVisitor)
    }
}

struct FlagsSeed<'a> {
    flags: &'a mut FlagFields,
}

impl<'de> DeserializeSeed<'de> for FlagsSeed<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for FlagsSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a GC flags object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some(key) = map.next_key::<FlagKey>()? {
            match key {
                FlagKey::WbProtected => self.flags.wb_protected = map.next_value()?,
                FlagKey::Old => self.flags.old = map.next_value()?,
                FlagKey::Marked => self.flags.marked = map.next_value()?,
                FlagKey::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::decode_record;
    use crate::core::error::ErrorKind;
    use crate::core::schema::RecordFields;

    fn decode(raw: &str) -> RecordFields {
        let mut fields = RecordFields::default();
        decode_record(raw.as_bytes(), &mut fields).unwrap();
        fields
    }

    #[test]
    fn decodes_every_known_member() {
        let fields = decode(
            r#"{"address":"0x00000000abc1","type":"STRING","class":"0x00000000abc2",
                "references":["0x00000000abc3","0x00000000abc4"],
                "value":"hello","node_type":"SCOPE","method":"initialize",
                "file":"app.rb","line":12,"fd":3,"bytesize":5,"capacity":8,
                "length":5,"size":1,"encoding":"UTF-8","default":"0x00000000abc5",
                "name":"Greeting","struct":"Range","ivars":2,"generation":4,
                "memsize":40,"frozen":true,"embedded":true,"broken":false,
                "fstring":true,"shared":false,
                "flags":{"wb_protected":true,"old":true,"marked":false}}"#,
        );

        assert_eq!(fields.address, "0x00000000abc1");
        assert_eq!(fields.ty, "STRING");
        assert_eq!(fields.references.len(), 2);
        assert_eq!(fields.value, "hello");
        assert_eq!(fields.line, 12);
        assert_eq!(fields.fd, 3);
        assert_eq!(fields.encoding, "UTF-8");
        assert_eq!(fields.default, "0x00000000abc5");
        assert_eq!(fields.struct_name, "Range");
        assert_eq!(fields.memsize, 40);
        assert!(fields.frozen && fields.embedded && fields.fstring);
        assert!(!fields.broken && !fields.shared);
        assert!(fields.flags.wb_protected && fields.flags.old);
        assert!(!fields.flags.marked);
    }

    #[test]
    fn unknown_members_are_discarded() {
        let fields = decode(
            r#"{"type":"FIXNUM","wat":"ignored","nested":{"deep":[1,2,3]},
                "trailing":null,"address":"0x00000000abc1"}"#,
        );
        assert_eq!(fields.ty, "FIXNUM");
        assert_eq!(fields.address, "0x00000000abc1");
    }

    #[test]
    fn unknown_flag_members_are_discarded() {
        let fields = decode(r#"{"flags":{"marked":true,"compacting":true}}"#);
        assert!(fields.flags.marked);
        assert!(!fields.flags.old);
    }

    #[test]
    fn non_string_reference_element_fails_the_record() {
        let mut fields = RecordFields::default();
        let err = decode_record(
            br#"{"type":"ARRAY","references":["0x00000000abc1",17]}"#,
            &mut fields,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("invalid type"));
    }

    #[test]
    fn malformed_syntax_fails_with_a_snippet() {
        let mut fields = RecordFields::default();
        let err = decode_record(br#"{"type":"FIXNUM""#, &mut fields).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("FIXNUM"));
    }

    #[test]
    fn trailing_garbage_fails_the_record() {
        let mut fields = RecordFields::default();
        let err = decode_record(br#"{"type":"FIXNUM"} extra"#, &mut fields).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn cleared_holder_does_not_leak_previous_record() {
        let mut fields = RecordFields::default();
        decode_record(
            br#"{"type":"STRING","value":"hello","references":["0x00000000abc1"],"frozen":true}"#,
            &mut fields,
        )
        .unwrap();

        fields.clear();
        decode_record(br#"{"type":"NIL"}"#, &mut fields).unwrap();

        assert_eq!(fields.ty, "NIL");
        assert!(fields.value.is_empty());
        assert!(fields.references.is_empty());
        assert!(!fields.frozen);
    }
}
