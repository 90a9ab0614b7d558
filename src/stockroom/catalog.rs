//! # Catalog View
//!
//! Holds the last-known-good snapshot of the product list and everything derived from it.
//!
//! ## Snapshot Rules
//!
//! - A successful load replaces the snapshot wholesale, in server order.
//! - A failed load keeps the previous snapshot and records an [`ErrorBanner`].
//! - A delete removes one entry, and only after the server acknowledged it.
//!
//! Nothing else ever touches `products`. There is no client-side sorting.
//!
//! ## Two-Step Delete
//!
//! Deleting needs an explicit affirmation. [`CatalogView::request_delete`] hands out a
//! single-use [`DeleteConfirmation`]; only [`CatalogView::confirm_delete`] with that same
//! token issues the request. A UI shows its prompt between the two calls.
//!
//! ## Filtering
//!
//! The search term filters locally via [`filter_products`], a pure function that is
//! re-evaluated on every read so it can never drift from the snapshot.

use crate::client::{ProductApi, ProductQuery};
use crate::error::{ApiError, ErrorBanner};
use crate::model::{Product, ProductId};
use tracing::{debug, warn};
use uuid::Uuid;

pub const FETCH_FAILED: &str = "Failed to fetch products";
pub const CONNECT_FAILED: &str =
    "Error connecting to server. Please make sure the backend is running.";
pub const DELETE_FAILED: &str = "Failed to delete product";
pub const DELETE_ERROR: &str = "Error deleting product";

/// Returns the products matching `term`, in snapshot order.
///
/// An empty or whitespace-only term matches everything. Otherwise a product matches when its
/// name, description or category contains the term, ignoring case.
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    if term.trim().is_empty() {
        return products.iter().collect();
    }

    let needle = term.to_lowercase();
    let contains = |field: Option<&str>| {
        field
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    };

    products
        .iter()
        .filter(|p| {
            contains(Some(&p.name))
                || contains(p.description.as_deref())
                || contains(p.category.as_deref())
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The server acknowledged; carries the entry removed from the snapshot, if it was there.
    Deleted(Option<Product>),
    /// The server refused or could not be reached; see [`CatalogView::error`].
    Failed,
    /// The confirmation was stale, cancelled, or for another request. Nothing was sent.
    Unconfirmed,
}

/// What to show in place of the product grid when nothing is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The catalog itself is empty.
    NoProducts,
    /// A search is active and nothing matched.
    NoResults,
}

impl EmptyState {
    pub fn title(&self) -> &'static str {
        match self {
            EmptyState::NoProducts => "No products yet",
            EmptyState::NoResults => "No products found",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            EmptyState::NoProducts => "Get started by adding your first product",
            EmptyState::NoResults => "Try adjusting your search terms",
        }
    }
}

/// Single-use proof that the user affirmed a delete.
#[derive(Debug, PartialEq, Eq)]
pub struct DeleteConfirmation {
    token: Uuid,
    id: ProductId,
}

impl DeleteConfirmation {
    pub fn id(&self) -> &ProductId {
        &self.id
    }
}

#[derive(Debug, Default)]
pub struct CatalogView {
    products: Vec<Product>,
    search_term: String,
    loading: bool,
    error: Option<ErrorBanner>,
    pending_delete: Option<(Uuid, ProductId)>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    /// Fetches the full product list.
    pub fn load<C: ProductApi>(&mut self, client: &C) -> LoadOutcome {
        self.load_query(client, &ProductQuery::All)
    }

    /// Fetches from one of the list endpoints and replaces the snapshot with the result.
    pub fn load_query<C: ProductApi>(&mut self, client: &C, query: &ProductQuery) -> LoadOutcome {
        self.loading = true;
        let outcome = match client.list_products(query) {
            Ok(envelope) if envelope.success => {
                self.products = envelope.data.unwrap_or_default();
                self.error = None;
                debug!(count = self.products.len(), ?query, "catalog loaded");
                LoadOutcome::Loaded(self.products.len())
            }
            Ok(envelope) => {
                debug!(message = ?envelope.message, "catalog load refused");
                self.error = Some(ErrorBanner::application(FETCH_FAILED));
                LoadOutcome::Failed
            }
            Err(ApiError::Decode(reason)) => {
                warn!(%reason, "catalog response unreadable");
                self.error = Some(ErrorBanner::application(FETCH_FAILED));
                LoadOutcome::Failed
            }
            Err(err) => {
                warn!(error = %err, "catalog load failed");
                self.error = Some(ErrorBanner::for_error(&err, CONNECT_FAILED));
                LoadOutcome::Failed
            }
        };
        self.loading = false;
        outcome
    }

    /// Stores the search term. Filtering is local; nothing is fetched.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn filtered_products(&self) -> Vec<&Product> {
        filter_products(&self.products, &self.search_term)
    }

    /// `"1 product"`, `"3 products"`: the size of the filtered view.
    pub fn count_label(&self) -> String {
        let count = self.filtered_products().len();
        format!("{} product{}", count, if count == 1 { "" } else { "s" })
    }

    /// The placeholder to show instead of the grid, if nothing is listed.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.loading || !self.filtered_products().is_empty() {
            return None;
        }
        if self.search_term.is_empty() {
            Some(EmptyState::NoProducts)
        } else {
            Some(EmptyState::NoResults)
        }
    }

    /// Starts a delete. Any earlier pending confirmation is invalidated.
    pub fn request_delete(&mut self, id: ProductId) -> DeleteConfirmation {
        let token = Uuid::new_v4();
        self.pending_delete = Some((token, id.clone()));
        DeleteConfirmation { token, id }
    }

    /// The id awaiting confirmation, if any.
    pub fn pending_delete(&self) -> Option<&ProductId> {
        self.pending_delete.as_ref().map(|(_, id)| id)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issues the delete the confirmation was handed out for.
    pub fn confirm_delete<C: ProductApi>(
        &mut self,
        client: &C,
        confirmation: DeleteConfirmation,
    ) -> DeleteOutcome {
        match self.pending_delete.take() {
            Some((token, _)) if token == confirmation.token => {}
            other => {
                self.pending_delete = other;
                debug!(id = %confirmation.id, "delete confirmation rejected");
                return DeleteOutcome::Unconfirmed;
            }
        }

        let id = confirmation.id;
        match client.delete_product(&id) {
            Ok(envelope) if envelope.success => {
                let removed = self
                    .products
                    .iter()
                    .position(|p| p.id == id)
                    .map(|pos| self.products.remove(pos));
                debug!(%id, "product deleted");
                DeleteOutcome::Deleted(removed)
            }
            Ok(_) => {
                self.error = Some(ErrorBanner::application(DELETE_FAILED));
                DeleteOutcome::Failed
            }
            Err(err) => {
                warn!(%id, error = %err, "delete failed");
                self.error = Some(ErrorBanner::for_error(&err, DELETE_ERROR));
                DeleteOutcome::Failed
            }
        }
    }
}
