//! Purpose: Round-trip and wire-shape coverage for the trivial codec.
//! Exports: Integration tests only.
//! Role: Pin the encode format (field order, omitted members) and its inverse.
//! Invariants: A decoded object re-encodes to a record that decodes identically.

use rubyheap::api::{
    ALL_TYPES, Decoder, Encoder, HeapType, decode_address, encode_address,
};

const DUMP: &str = concat!(
    "{\"address\":\"0x7f8a5c000300\",\"type\":\"STRING\",\"value\":\"hello\",\
     \"bytesize\":5,\"frozen\":true,\"flags\":{\"old\":true}}\n",
    "{\"address\":\"0x7f8a5c000400\",\"type\":\"FLOAT\",\"value\":\"3.5\"}\n",
    "{\"address\":\"0x7f8a5c000500\",\"type\":\"HASH\",\"size\":2,\
     \"default\":\"0x7f8a5c000600\",\"references\":[\"0x7f8a5c000700\"]}\n",
);

#[test]
fn trivial_codec_round_trips_a_dump() {
    let objs: Vec<_> = Decoder::new(DUMP.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(objs.len(), 3);

    let mut encoded = Vec::new();
    let mut encoder = Encoder::new(&mut encoded);
    for obj in &objs {
        encoder.encode(obj).unwrap();
    }

    let back: Vec<_> = Decoder::new(&encoded[..])
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(back, objs);
}

#[test]
fn encode_output_is_stable_and_omits_empty_members() {
    let obj = Decoder::new(&br#"{"type":"FIXNUM","address":"0x00000000abc1"}"#[..])
        .decode()
        .unwrap()
        .unwrap();

    let mut encoded = Vec::new();
    Encoder::new(&mut encoded).encode(&obj).unwrap();
    let line = String::from_utf8(encoded).unwrap();

    // Address-like members always re-encode in the 14-character form;
    // zero counters, empty strings, and false flags stay omitted.
    assert_eq!(
        line,
        "{\"address\":\"0x00000000abc1\",\"class\":\"0x000000000000\",\
         \"type\":\"FIXNUM\",\"default\":\"0x000000000000\"}\n"
    );
}

#[test]
fn every_type_name_survives_a_codec_pass() {
    let mut encoded = Vec::new();
    {
        let mut encoder = Encoder::new(&mut encoded);
        for ty in ALL_TYPES {
            let record = format!(
                "{{\"type\":\"{}\",\"address\":\"0x00000000abc1\"}}",
                ty.name()
            );
            let obj = Decoder::new(record.as_bytes()).decode().unwrap().unwrap();
            assert_eq!(obj.ty, ty);
            encoder.encode(&obj).unwrap();
        }
    }

    let types: Vec<HeapType> = Decoder::new(&encoded[..])
        .map(|obj| obj.unwrap().ty)
        .collect();
    assert_eq!(types, ALL_TYPES.to_vec());
}

#[test]
fn addresses_round_trip_across_the_representable_range() {
    for addr in [0u64, 1, 0xabc1, 0x7f8a_5c00_0300, 0xffff_ffff_ffff] {
        assert_eq!(decode_address(&encode_address(addr)).unwrap(), addr);
    }
}
