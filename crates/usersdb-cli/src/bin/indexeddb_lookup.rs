//! Looks up one DMR ID in an indexed user database.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use usersdb::limits::MAX_ID;

#[derive(Parser)]
#[command(name = "indexeddb-lookup")]
#[command(about = "Print the linear line of one DMR ID from an indexed database")]
struct Args {
    /// Indexed database to search
    indexed_db_file: PathBuf,

    /// DMR ID to look up
    #[arg(value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_ID)))]
    dmr_id: u32,
}

fn main() -> ExitCode {
    usersdb_cli::init_tracing();
    let args = match usersdb_cli::parse_args::<Args>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let result = usersdb_cli::lookup(&args.indexed_db_file, args.dmr_id).and_then(|line| {
        let Some(line) = line else {
            return Ok(false);
        };
        io::stdout().write_all(&line)?;
        Ok(true)
    });
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("{}: not found", args.dmr_id);
            ExitCode::from(usersdb_cli::EXIT_NOT_FOUND)
        }
        Err(err) => usersdb_cli::report(Err(err), Args::command().render_usage()),
    }
}
