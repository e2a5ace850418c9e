//! spanq CLI entry point.

use spanq_lib::cli::{self, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Execute the command
    match cli::execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(category = e.category(), "{}", e);
            eprintln!("spanq: {}", e);
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        },
    }
}
