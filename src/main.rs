//! Purpose: `rubyheap` CLI entry point: count, re-emit, and summarize heap dumps.
//! Role: Binary crate root; parses args, streams records, prints results on stdout.
//! Invariants: Per-record decode failures are logged and counted, never fatal mid-run.
//! Invariants: Diagnostics go to stderr; stdout carries only command output.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::thread;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rubyheap::api::{Encoder, Error, ErrorKind, decode_stream, to_exit_code};

#[derive(Parser)]
#[command(name = "rubyheap", version, about = "Inspect Ruby ObjectSpace heap dumps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count the decodable objects in a dump.
    Count {
        /// Heap dump file; stdin when omitted.
        file: Option<PathBuf>,
        /// Decode worker threads.
        #[arg(long, default_value_t = default_workers())]
        workers: usize,
    },
    /// Re-encode every object to stdout, one JSON object per line.
    Dump {
        /// Heap dump file; stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Per-type object counts.
    Stats {
        /// Heap dump file; stdin when omitted.
        file: Option<PathBuf>,
        /// Decode worker threads.
        #[arg(long, default_value_t = default_workers())]
        workers: usize,
    },
}

fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    match cli.command {
        Command::Count { file, workers } => count(file, workers),
        Command::Dump { file } => dump(file),
        Command::Stats { file, workers } => stats(file, workers),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn open_input(file: Option<&PathBuf>) -> Result<Box<dyn Read + Send>, Error> {
    match file {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to open {}", path.display()))
                    .with_source(err)
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

/// Drain the error channel on its own thread so a backlog of failures
/// never stalls the value channel's consumer.
fn drain_errors(errs: crossbeam_channel::Receiver<Error>) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let mut failed = 0u64;
        for err in errs.iter() {
            tracing::warn!(error = %err, "record dropped");
            failed += 1;
        }
        failed
    })
}

fn join_failed(handle: thread::JoinHandle<u64>) -> Result<u64, Error> {
    handle
        .join()
        .map_err(|_| Error::new(ErrorKind::Internal).with_message("error drain thread panicked"))
}

fn failed_records_error(failed: u64) -> Error {
    Error::new(ErrorKind::Convert).with_message(format!("{failed} records failed to decode"))
}

fn count(file: Option<PathBuf>, workers: usize) -> Result<(), Error> {
    let reader = open_input(file.as_ref())?;
    let (objs, errs) = decode_stream(reader, workers);
    let drain = drain_errors(errs);

    let decoded = objs.iter().count();
    let failed = join_failed(drain)?;

    println!("{decoded} heap objects");
    if failed > 0 {
        return Err(failed_records_error(failed));
    }
    Ok(())
}

fn dump(file: Option<PathBuf>) -> Result<(), Error> {
    let reader = open_input(file.as_ref())?;
    // One worker keeps output order equal to input order.
    let (objs, errs) = decode_stream(reader, 1);
    let drain = drain_errors(errs);

    let stdout = io::stdout().lock();
    let mut writer = BufWriter::new(stdout);
    {
        let mut encoder = Encoder::new(&mut writer);
        for obj in objs.iter() {
            encoder.encode(&obj)?;
        }
    }
    writer.flush().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to flush stdout")
            .with_source(err)
    })?;

    let failed = join_failed(drain)?;
    if failed > 0 {
        return Err(failed_records_error(failed));
    }
    Ok(())
}

fn stats(file: Option<PathBuf>, workers: usize) -> Result<(), Error> {
    let reader = open_input(file.as_ref())?;
    let (objs, errs) = decode_stream(reader, workers);
    let drain = drain_errors(errs);

    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut total = 0u64;
    for obj in objs.iter() {
        *counts.entry(obj.ty.name()).or_insert(0) += 1;
        total += 1;
    }
    let failed = join_failed(drain)?;

    for (name, count) in &counts {
        println!("{name:<10} {count}");
    }
    println!("{:<10} {total}", "TOTAL");
    if failed > 0 {
        return Err(failed_records_error(failed));
    }
    Ok(())
}
