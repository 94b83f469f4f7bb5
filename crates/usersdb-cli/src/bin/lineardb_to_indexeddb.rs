//! Converts a linear user database into the indexed format.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

#[derive(Parser)]
#[command(name = "lineardb-to-indexeddb")]
#[command(about = "Convert a linear DMR user database to the indexed format")]
struct Args {
    /// Linear database, one `id,callsign,name,city,state,nickname,country` line per user
    linear_db_input_file: PathBuf,

    /// Indexed database to write
    indexed_db_output_file: PathBuf,
}

fn main() -> ExitCode {
    usersdb_cli::init_tracing();
    let args = match usersdb_cli::parse_args::<Args>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let result = usersdb_cli::linear_to_indexed(&args.linear_db_input_file, &args.indexed_db_output_file)
        .map(|_| ());
    usersdb_cli::report(result, Args::command().render_usage())
}
