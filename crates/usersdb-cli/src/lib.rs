//! Command-line converters between the linear and indexed user databases.
//!
//! Each binary is a thin wrapper: parse arguments, call one of the
//! functions below, and turn the result into an exit status with
//! [`report`]. Outputs are built in memory and written in one go, so a
//! failed conversion never leaves a partial file behind.

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use usersdb::limits::MAX_DATABASE_SIZE;
use usersdb::{
    find_user, format_record, parse_linear, write_record, EncodeStats, Encoder, IndexedDb,
};

/// A file that could not be opened, read or written.
///
/// The binaries print their usage line after this error, since it usually
/// means a wrong path was given.
#[derive(Debug, thiserror::Error)]
#[error("{}: {action}", path.display())]
pub struct FileError {
    path: PathBuf,
    action: &'static str,
    #[source]
    source: io::Error,
}

impl FileError {
    fn new(path: &Path, action: &'static str, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            action,
            source,
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Exit status of `indexeddb-lookup` when the ID is not in the database.
///
/// Distinct from the status 1 of every other failure, so scripts can tell a
/// miss from a missing or malformed database.
pub const EXIT_NOT_FOUND: u8 = 2;

/// Parses arguments, mapping argument errors to exit status 1.
///
/// `--help` prints and exits successfully.
pub fn parse_args<P: Parser>() -> Result<P, ExitCode> {
    P::try_parse().map_err(|err| {
        let _ = err.print();
        if err.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })
}

/// Turns a conversion result into an exit status, printing any error
/// chain on stderr.
pub fn report(result: Result<()>, usage: impl Display) -> ExitCode {
    let Err(err) = result else {
        return ExitCode::SUCCESS;
    };
    eprintln!("error: {:#}", err);
    if err.downcast_ref::<FileError>().is_some() {
        eprintln!("{}", usage);
    }
    ExitCode::FAILURE
}

/// Reads a whole input file, sizing it from its metadata first.
///
/// Files larger than `max` bytes are rejected before any data is read.
pub fn read_input(path: &Path, max: Option<usize>) -> Result<Vec<u8>> {
    let metadata =
        fs::metadata(path).map_err(|e| FileError::new(path, "can't open for reading", e))?;
    let len = metadata.len();
    if let Some(max) = max {
        if len > max as u64 {
            bail!("{}: file is {} bytes, larger than {} bytes", path.display(), len, max);
        }
    }
    let data = fs::read(path).map_err(|e| FileError::new(path, "failed to read entire file", e))?;
    tracing::debug!(path = %path.display(), len = data.len(), "read input");
    Ok(data)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| FileError::new(path, "can't open for writing", e))?;
    Ok(())
}

/// Converts a linear database file into an indexed database file.
pub fn linear_to_indexed(input: &Path, output: &Path) -> Result<EncodeStats> {
    let data = read_input(input, None)?;
    let records = parse_linear(&data)
        .with_context(|| format!("{}: bad linear database", input.display()))?;

    let mut encoder = Encoder::new(records.len())?;
    encoder.intern_countries(&records)?;
    for record in &records {
        encoder
            .push_record(record)
            .with_context(|| format!("DMR ID {}", record.id))?;
    }
    let stats = encoder.stats();
    let bytes = encoder.finish()?;

    write_output(output, &bytes)?;
    tracing::info!(
        records = stats.records,
        linear_bytes = data.len(),
        indexed_bytes = bytes.len(),
        "wrote {}",
        output.display()
    );
    Ok(stats)
}

/// Converts an indexed database file back into a linear database file.
///
/// Returns the number of records written.
pub fn indexed_to_linear(input: &Path, output: &Path) -> Result<usize> {
    let data = read_input(input, Some(MAX_DATABASE_SIZE))?;
    let db = IndexedDb::open(&data)
        .with_context(|| format!("{}: not an indexed database", input.display()))?;

    let mut linear = Vec::with_capacity(data.len() * 2);
    for (index, record) in db.records().enumerate() {
        let record = record.with_context(|| format!("record {}", index))?;
        write_record(&mut linear, &record)?;
    }

    write_output(output, &linear)?;
    tracing::info!(records = db.len(), "wrote {}", output.display());
    Ok(db.len())
}

/// Looks up one DMR ID, returning its linear line if present.
pub fn lookup(input: &Path, id: u32) -> Result<Option<Vec<u8>>> {
    let data = read_input(input, Some(MAX_DATABASE_SIZE))?;
    let user = find_user(&data, id)
        .with_context(|| format!("{}: lookup failed", input.display()))?;
    Ok(user.map(|user| format_record(&user)))
}
