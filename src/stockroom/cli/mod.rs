//! # CLI Layer
//!
//! This is **one possible UI client** for stockroom, not the application itself.
//! The CLI is the only place that knows about terminal I/O, prompts, exit codes and output
//! formatting. Component state (banners, validation errors, empty states) comes back from the
//! library as values; this layer decides how they look.
//!
//! ## Exit Status
//!
//! `run()` returns [`Outcome::Failed`] when an operation ends in an error state that was
//! already shown to the user, and `Err` for failures that were not (bad config, editor could
//! not be launched). Both exit with status 1.
//!
//! ## Structure
//!
//! - `setup.rs`: clap definitions
//! - `commands.rs`: context wiring and per-command handlers
//! - `print.rs`: terminal rendering

mod commands;
mod print;
pub mod setup;

pub use commands::{run, Outcome};
