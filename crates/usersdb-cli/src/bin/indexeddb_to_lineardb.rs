//! Converts an indexed user database back into the linear format.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

#[derive(Parser)]
#[command(name = "indexeddb-to-lineardb")]
#[command(about = "Convert an indexed DMR user database to the linear format")]
struct Args {
    /// Indexed database to read
    indexed_db_input: PathBuf,

    /// Linear database to write
    linear_db_output: PathBuf,
}

fn main() -> ExitCode {
    usersdb_cli::init_tracing();
    let args = match usersdb_cli::parse_args::<Args>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let result =
        usersdb_cli::indexed_to_linear(&args.indexed_db_input, &args.linear_db_output).map(|_| ());
    usersdb_cli::report(result, Args::command().render_usage())
}
