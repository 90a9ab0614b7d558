//! # Client Layer
//!
//! The [`ProductApi`] trait is the seam between the client-side state machines and the
//! remote product service. Components never build URLs or parse bodies themselves; they call
//! the trait and interpret what comes back.
//!
//! ## Implementations
//!
//! - [`http::HttpClient`]: JSON over HTTP using a blocking `ureq` agent.
//! - [`memory::InMemoryClient`]: in-process product table for testing, with switches to
//!   simulate every failure mode the components must survive.
//!
//! ## Result Shape
//!
//! Every call returns `Result<Envelope<T>, ApiError>`:
//!
//! ```text
//! Ok(Envelope { success: true, .. })    -> the server did it
//! Ok(Envelope { success: false, .. })   -> the server answered 2xx but refused
//! Err(ApiError::Status { .. })          -> the server answered non-2xx
//! Err(ApiError::Transport(_))           -> no answer at all
//! Err(ApiError::Decode(_))              -> an answer we could not read
//! ```
//!
//! Keeping `success: false` on the `Ok` side lets callers tell an application refusal from
//! a broken connection, which the catalog and the form report differently.

use crate::error::ApiError;
use crate::model::{Envelope, Product, ProductId, ProductPayload};

pub mod http;
pub mod memory;

pub type ApiResult<T> = std::result::Result<Envelope<T>, ApiError>;

/// Default threshold for the low-stock listing, matching the server's own default.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Which list endpoint to load a catalog snapshot from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductQuery {
    /// `GET /products`
    #[default]
    All,
    /// `GET /products/search?q=`
    Search(String),
    /// `GET /products/category/{category}`
    Category(String),
    /// `GET /products/low-stock?threshold=`
    LowStock(u32),
}

/// Abstract interface for the product REST service.
pub trait ProductApi {
    /// List products from one of the list endpoints
    fn list_products(&self, query: &ProductQuery) -> ApiResult<Vec<Product>>;

    /// Fetch a single product by id
    fn get_product(&self, id: &ProductId) -> ApiResult<Product>;

    /// Create a product
    fn create_product(&self, payload: &ProductPayload) -> ApiResult<Product>;

    /// Replace the editable fields of an existing product
    fn update_product(&self, id: &ProductId, payload: &ProductPayload) -> ApiResult<Product>;

    /// Delete a product
    fn delete_product(&self, id: &ProductId) -> ApiResult<serde_json::Value>;
}
