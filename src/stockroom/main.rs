//! # Stockroom CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, this file only invokes
//! `cli::run()` and handles process termination. See the library docs for the layering.

mod cli;

fn main() {
    match cli::run() {
        Ok(cli::Outcome::Done) => {}
        Ok(cli::Outcome::Failed) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
