//! Purpose: Define the stable public Rust API boundary for rubyheap.
//! Exports: Decode/encode entry points and the typed heap object model.
//! Role: Public, additive-only surface; hides the internal module layout.
//! Invariants: This module is the only supported path to the decoders.
//! Invariants: Internal modules may reorganize without breaking this surface.

pub use crate::core::addr::{
    decode_address, decode_address_list, encode_address, encode_address_list,
};
pub use crate::core::codec::{Decoder, Encoder};
pub use crate::core::decode::decode_record;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::flags::FlagSet;
pub use crate::core::object::{FieldError, HeapObject, Value, convert_error};
pub use crate::core::pipeline::{DecodeOptions, decode_stream, decode_stream_with};
pub use crate::core::schema::{FlagFields, RecordFields};
pub use crate::core::ty::{ALL_TYPES, HeapType};
