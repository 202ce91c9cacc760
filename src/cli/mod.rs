//! CLI module for docstore
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty catalog
//! - create / read / update / delete: One collection operation per call
//! - list: Paginated listing of collections

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    create, delete, execute, init, list, paginate, read, run, run_command, update, Pagination,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_json, read_schema, write_error, write_response, Response};
