//! # Stockroom Architecture
//!
//! Stockroom is a **UI-agnostic inventory client library**. It keeps a local view of a
//! product catalog that lives on a remote JSON API, and it happens to ship with a CLI.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, formats output                │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade that owns the client                         │
//! │  - Hands out catalog and form sessions                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Component Layer (catalog.rs, form.rs)                      │
//! │  - Client-side state machines: snapshot, filter, validate   │
//! │  - Failures become state, never panics or `Err`             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client Layer (client/)                                     │
//! │  - Abstract ProductApi trait                                │
//! │  - HttpClient (production), InMemoryClient (testing)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: The Server Owns the Data
//!
//! The catalog holds a last-known-good snapshot that is replaced wholesale on every load.
//! Local mutations only ever follow a server acknowledgment: a delete removes the entry after
//! the server says it succeeded, never before. There is no incremental sync.
//!
//! ## Testing Strategy
//!
//! 1. **Components** (`catalog.rs`, `form.rs`): unit tests against `InMemoryClient`.
//!    This is where most of the testing lives.
//! 2. **Client** (`client/http.rs`): wire-level tests against a `wiremock` server.
//! 3. **CLI**: end-to-end tests in `tests/` drive the binary.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for UIs
//! - [`catalog`]: Catalog view (snapshot, search filter, two-step delete)
//! - [`form`]: Record editor (form state, validation, submission)
//! - [`client`]: API client abstraction and implementations
//! - [`model`]: Wire types (`Product`, `ProductPayload`, `Envelope`)
//! - [`config`]: Configuration management
//! - [`editor`]: External editor integration for forms
//! - [`error`]: Error types

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod model;
