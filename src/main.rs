//! docstore CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. The JSON response,
//! including any error envelope, is already on stdout when `run` returns;
//! a failure only sets the exit code.

use docstore::cli;

fn main() {
    if cli::run().is_err() {
        std::process::exit(1);
    }
}
