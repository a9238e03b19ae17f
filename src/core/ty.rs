// Closed enumeration of heap object kinds as they appear in a dump's "type" member.
use std::fmt;

/// One heap object kind. `Unknown` is the sentinel a record falls back
/// to when its type name is outside the closed set; it never appears in
/// a well-formed dump.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum HeapType {
    Array,
    Bignum,
    Class,
    Complex,
    Data,
    False,
    File,
    Fixnum,
    Float,
    Hash,
    Iclass,
    Match,
    Module,
    Nil,
    Node,
    None,
    Object,
    Rational,
    Regexp,
    Root,
    String,
    Struct,
    Symbol,
    True,
    Undef,
    Zombie,
    #[default]
    Unknown,
}

/// The closed set, in dump name order. `Unknown` is deliberately absent.
pub const ALL_TYPES: [HeapType; 26] = [
    HeapType::Array,
    HeapType::Bignum,
    HeapType::Class,
    HeapType::Complex,
    HeapType::Data,
    HeapType::False,
    HeapType::File,
    HeapType::Fixnum,
    HeapType::Float,
    HeapType::Hash,
    HeapType::Iclass,
    HeapType::Match,
    HeapType::Module,
    HeapType::Nil,
    HeapType::Node,
    HeapType::None,
    HeapType::Object,
    HeapType::Rational,
    HeapType::Regexp,
    HeapType::Root,
    HeapType::String,
    HeapType::Struct,
    HeapType::Symbol,
    HeapType::True,
    HeapType::Undef,
    HeapType::Zombie,
];

impl HeapType {
    /// The dump spelling of this type. Total; never panics.
    pub fn name(self) -> &'static str {
        match self {
            HeapType::Array => "ARRAY",
            HeapType::Bignum => "BIGNUM",
            HeapType::Class => "CLASS",
            HeapType::Complex => "COMPLEX",
            HeapType::Data => "DATA",
            HeapType::False => "FALSE",
            HeapType::File => "FILE",
            HeapType::Fixnum => "FIXNUM",
            HeapType::Float => "FLOAT",
            HeapType::Hash => "HASH",
            HeapType::Iclass => "ICLASS",
            HeapType::Match => "MATCH",
            HeapType::Module => "MODULE",
            HeapType::Nil => "NIL",
            HeapType::Node => "NODE",
            HeapType::None => "NONE",
            HeapType::Object => "OBJECT",
            HeapType::Rational => "RATIONAL",
            HeapType::Regexp => "REGEXP",
            HeapType::Root => "ROOT",
            HeapType::String => "STRING",
            HeapType::Struct => "STRUCT",
            HeapType::Symbol => "SYMBOL",
            HeapType::True => "TRUE",
            HeapType::Undef => "UNDEF",
            HeapType::Zombie => "ZOMBIE",
            HeapType::Unknown => "UNKNOWN",
        }
    }

    /// Case-sensitive lookup against the closed set. Names outside the
    /// set (including "UNKNOWN") resolve to `None`; the caller decides
    /// how to report them.
    pub fn from_name(name: &str) -> Option<HeapType> {
        let ty = match name {
            "ARRAY" => HeapType::Array,
            "BIGNUM" => HeapType::Bignum,
            "CLASS" => HeapType::Class,
            "COMPLEX" => HeapType::Complex,
            "DATA" => HeapType::Data,
            "FALSE" => HeapType::False,
            "FILE" => HeapType::File,
            "FIXNUM" => HeapType::Fixnum,
            "FLOAT" => HeapType::Float,
            "HASH" => HeapType::Hash,
            "ICLASS" => HeapType::Iclass,
            "MATCH" => HeapType::Match,
            "MODULE" => HeapType::Module,
            "NIL" => HeapType::Nil,
            "NODE" => HeapType::Node,
            "NONE" => HeapType::None,
            "OBJECT" => HeapType::Object,
            "RATIONAL" => HeapType::Rational,
            "REGEXP" => HeapType::Regexp,
            "ROOT" => HeapType::Root,
            "STRING" => HeapType::String,
            "STRUCT" => HeapType::Struct,
            "SYMBOL" => HeapType::Symbol,
            "TRUE" => HeapType::True,
            "UNDEF" => HeapType::Undef,
            "ZOMBIE" => HeapType::Zombie,
            _ => return Option::None,
        };
        Some(ty)
    }
}

impl fmt::Display for HeapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
