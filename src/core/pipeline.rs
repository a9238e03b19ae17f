// Concurrent decode pipeline: one line splitter feeding a pool of decode
// workers over bounded channels. Channel disconnection is the only
// completion signal; there is no separate done flag.
use std::io::{self, BufRead, BufReader, Read};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::core::decode::decode_record;
use crate::core::error::{Error, ErrorKind};
use crate::core::object::HeapObject;
use crate::core::schema::RecordFields;

/// Pipeline tuning.
#[derive(Copy, Clone, Debug)]
pub struct DecodeOptions {
    /// Decode worker count. One worker preserves input order end-to-end;
    /// more workers trade ordering for throughput.
    pub workers: usize,
    /// Capacity of each bounded queue. A slow consumer backpressures the
    /// workers, and through them the splitter; this is the pipeline's
    /// only memory bound.
    pub queue_depth: usize,
}

impl DecodeOptions {
    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            queue_depth: workers * 4,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::with_workers(1)
    }
}

/// One line-delimited span, tagged with its line number for error context.
struct RawRecord {
    line: u64,
    bytes: Vec<u8>,
}

/// Decode a stream of line-delimited records with `workers` decode
/// threads.
///
/// Both receivers produce incrementally as the input is consumed and
/// disconnect when the input is exhausted and every in-flight record has
/// been decoded. A record that fails to decode appears on the error
/// receiver instead of the value receiver; the stream keeps going.
pub fn decode_stream<R>(reader: R, workers: usize) -> (Receiver<HeapObject>, Receiver<Error>)
where
    R: Read + Send + 'static,
{
    decode_stream_with(reader, DecodeOptions::with_workers(workers))
}

pub fn decode_stream_with<R>(
    reader: R,
    options: DecodeOptions,
) -> (Receiver<HeapObject>, Receiver<Error>)
where
    R: Read + Send + 'static,
{
    let workers = options.workers.max(1);
    let depth = options.queue_depth.max(1);

    let (raw_tx, raw_rx) = bounded::<RawRecord>(depth);
    let (obj_tx, obj_rx) = bounded::<HeapObject>(depth);
    let (err_tx, err_rx) = bounded::<Error>(depth);

    let splitter_err = err_tx.clone();
    thread::spawn(move || split_records(reader, raw_tx, splitter_err));

    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let raw_rx = raw_rx.clone();
        let obj_tx = obj_tx.clone();
        let err_tx = err_tx.clone();
        handles.push(thread::spawn(move || {
            decode_worker(raw_rx, obj_tx, err_tx);
            tracing::debug!(worker, "decode worker drained");
        }));
    }
    // The receivers observe disconnect once the splitter and every worker
    // have dropped their senders; keep no extra clones alive here.
    drop(raw_rx);
    drop(obj_tx);
    drop(err_tx);

    thread::spawn(move || {
        for handle in handles {
            let _ = handle.join();
        }
        tracing::debug!(workers, "decode pipeline complete");
    });

    (obj_rx, err_rx)
}

/// Reads the input stream and pushes each non-blank line-delimited span
/// to the raw-record queue. Read failures are reported and reading
/// continues; only end-of-input stops the splitter.
fn split_records<R: Read>(reader: R, raw_tx: Sender<RawRecord>, err_tx: Sender<Error>) {
    let mut reader = BufReader::new(reader);
    let mut line = 0u64;
    loop {
        let mut bytes = Vec::new();
        match reader.read_until(b'\n', &mut bytes) {
            Ok(0) => break,
            Ok(_) => {
                line += 1;
                if bytes.iter().all(|b| b.is_ascii_whitespace()) {
                    continue;
                }
                if raw_tx.send(RawRecord { line, bytes }).is_err() {
                    return;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                let report = Error::new(ErrorKind::Io)
                    .with_message("failed to read input stream")
                    .with_line(line)
                    .with_source(err);
                if err_tx.send(report).is_err() {
                    return;
                }
            }
        }
    }
    tracing::debug!(lines = line, "splitter reached end of input");
}

/// Pulls raw records off the shared queue and decodes them on a private
/// holder. Decode state is never shared between workers.
fn decode_worker(raw_rx: Receiver<RawRecord>, obj_tx: Sender<HeapObject>, err_tx: Sender<Error>) {
    let mut fields = RecordFields::default();
    for raw in raw_rx.iter() {
        fields.clear();
        if let Err(err) = decode_record(&raw.bytes, &mut fields) {
            if err_tx.send(err.with_line(raw.line)).is_err() {
                return;
            }
            continue;
        }
        match HeapObject::try_from_fields(&fields) {
            Ok(obj) => {
                if obj_tx.send(obj).is_err() {
                    return;
                }
            }
            Err(err) => {
                if err_tx.send(err.with_line(raw.line)).is_err() {
                    return;
                }
            }
        }
    }
}
