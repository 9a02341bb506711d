use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    match certward::cli::run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %format!("{:#}", e), "certward failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
