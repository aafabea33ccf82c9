//! # dataset-prep CLI
//!
//! Command-line interface for the dataset preparation pipelines.
//!
//! ## Usage
//! ```bash
//! dataset-prep collect --target train/0_real frames/real frames/youtube
//! dataset-prep crop --input src --output des --model seeta_fd_frontal_v1.0.bin
//! ```

mod cli;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
