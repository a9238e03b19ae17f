// Trivial one-record-at-a-time codec wrapping the generic serde_json
// deserializer. Simple and slow; prefer the pipeline for whole dumps.
use std::io::{Read, Write};

use serde_json::StreamDeserializer;
use serde_json::de::IoRead;

use crate::core::error::{Error, ErrorKind};
use crate::core::object::HeapObject;
use crate::core::schema::RecordFields;

/// Decodes heap objects from a reader of whitespace-separated JSON
/// records. Each call builds a fresh holder; for high-volume decoding
/// use [`decode_stream`](crate::core::pipeline::decode_stream) instead.
pub struct Decoder<R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, RecordFields>,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            stream: serde_json::Deserializer::from_reader(reader).into_iter(),
        }
    }

    /// Decode the next record; `None` at end of input.
    pub fn decode(&mut self) -> Option<Result<HeapObject, Error>> {
        let fields = match self.stream.next()? {
            Ok(fields) => fields,
            Err(err) => {
                return Some(Err(Error::new(ErrorKind::Syntax).with_message(err.to_string())));
            }
        };
        Some(HeapObject::try_from_fields(&fields))
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<HeapObject, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode()
    }
}

/// Encodes heap objects as one JSON object per line, empty members
/// omitted, field order stable.
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn encode(&mut self, obj: &HeapObject) -> Result<(), Error> {
        serde_json::to_writer(&mut self.writer, &obj.to_fields()).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write record")
                .with_source(err)
        })?;
        self.writer.write_all(b"\n").map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write record terminator")
                .with_source(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoder, Encoder};
    use crate::core::error::ErrorKind;
    use crate::core::ty::HeapType;

    #[test]
    fn decodes_records_in_order() {
        let input = "{\"type\":\"FIXNUM\",\"address\":\"0x00000000abc1\"}\n\
                     {\"type\":\"NIL\",\"address\":\"0x00000000abc2\"}\n";
        let objs: Vec<_> = Decoder::new(input.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(objs.len(), 2);
        assert_eq!(objs[0].ty, HeapType::Fixnum);
        assert_eq!(objs[0].address, 0xabc1);
        assert_eq!(objs[1].ty, HeapType::Nil);
    }

    #[test]
    fn conversion_failures_surface_per_record() {
        let input = r#"{"type":"BOGUS"}"#;
        let err = Decoder::new(input.as_bytes()).decode().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Convert);
    }

    #[test]
    fn empty_input_is_end_of_stream() {
        assert!(Decoder::new(&b""[..]).decode().is_none());
    }

    #[test]
    fn encode_then_decode_reproduces_the_object() {
        let input = "{\"type\":\"STRING\",\"address\":\"0x00000000abc1\",\
                     \"value\":\"hi\",\"frozen\":true,\
                     \"flags\":{\"marked\":true}}\n";
        let obj = Decoder::new(input.as_bytes()).decode().unwrap().unwrap();

        let mut buf = Vec::new();
        Encoder::new(&mut buf).encode(&obj).unwrap();
        assert!(buf.ends_with(b"\n"));

        let back = Decoder::new(&buf[..]).decode().unwrap().unwrap();
        assert_eq!(back, obj);
    }
}
