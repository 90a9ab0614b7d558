//! # API Facade
//!
//! The single entry point for UIs. It owns the [`ProductApi`] client and hands out the
//! component state machines already wired to it.
//!
//! ## What the Facade Does NOT Do
//!
//! - **State logic**: snapshot, filtering, validation and error mapping live in
//!   `catalog.rs` and `form.rs`.
//! - **I/O**: no stdout, no prompts. Confirmation for deletes is the caller's job; the facade
//!   only accepts a [`DeleteConfirmation`] the catalog handed out.
//!
//! ## Generic Over ProductApi
//!
//! - Production: `StockroomApi<HttpClient>`
//! - Testing: `StockroomApi<InMemoryClient>`

use crate::catalog::{CatalogView, DeleteConfirmation, DeleteOutcome, LoadOutcome};
use crate::client::{ProductApi, ProductQuery};
use crate::error::{Result, StockroomError};
use crate::form::{RecordEditor, SubmitOutcome};
use crate::model::{Product, ProductId};

pub struct StockroomApi<C: ProductApi> {
    client: C,
}

impl<C: ProductApi> StockroomApi<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// A catalog loaded from the given list endpoint. Check `error()` on the result.
    pub fn open_catalog(&self, query: &ProductQuery) -> CatalogView {
        let mut catalog = CatalogView::new();
        catalog.load_query(&self.client, query);
        catalog
    }

    pub fn reload(&self, catalog: &mut CatalogView) -> LoadOutcome {
        catalog.load(&self.client)
    }

    pub fn delete(
        &self,
        catalog: &mut CatalogView,
        confirmation: DeleteConfirmation,
    ) -> DeleteOutcome {
        catalog.confirm_delete(&self.client, confirmation)
    }

    pub fn new_product_form(&self) -> RecordEditor {
        RecordEditor::create()
    }

    /// An edit form, populated from the server. Check `error()` on the result.
    pub fn edit_product_form(&self, id: &ProductId) -> RecordEditor {
        let mut editor = RecordEditor::edit(id);
        editor.load(&self.client);
        editor
    }

    pub fn submit(&self, editor: &mut RecordEditor) -> SubmitOutcome {
        editor.submit(&self.client)
    }

    /// Fetches one product for display.
    pub fn product(&self, id: &ProductId) -> Result<Product> {
        let envelope = self.client.get_product(id)?;
        match envelope.data {
            Some(product) if envelope.success => Ok(product),
            _ => Err(StockroomError::Usage(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Product not found with id: {}", id)),
            )),
        }
    }
}

pub use crate::catalog::{filter_products, EmptyState};
pub use crate::client::DEFAULT_LOW_STOCK_THRESHOLD;
pub use crate::form::{FormField, FormState, ValidationErrors};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{InMemoryClient, RecordedCall};

    fn api() -> StockroomApi<InMemoryClient> {
        StockroomApi::new(InMemoryClient::with_products(vec![
            Product::new(1u64, "Hammer").with_price(12.0).with_quantity(3),
            Product::new(2u64, "Saw").with_price(20.0).with_quantity(30),
        ]))
    }

    #[test]
    fn open_catalog_dispatches_query() {
        let api = api();
        let catalog = api.open_catalog(&ProductQuery::LowStock(DEFAULT_LOW_STOCK_THRESHOLD));
        assert_eq!(catalog.products().len(), 1);
        assert_eq!(
            api.client().calls(),
            vec![RecordedCall::List(ProductQuery::LowStock(10))]
        );
    }

    #[test]
    fn delete_goes_through_catalog() {
        let api = api();
        let mut catalog = api.open_catalog(&ProductQuery::All);
        let confirmation = catalog.request_delete(ProductId::from(1u64));
        assert!(matches!(
            api.delete(&mut catalog, confirmation),
            DeleteOutcome::Deleted(Some(_))
        ));
        assert_eq!(api.client().products().len(), 1);
    }

    #[test]
    fn edit_form_is_loaded() {
        let api = api();
        let mut editor = api.edit_product_form(&ProductId::from(2u64));
        assert_eq!(editor.form().name, "Saw");

        editor.set_field(FormField::Price, "25");
        assert!(matches!(api.submit(&mut editor), SubmitOutcome::Saved(_)));
        assert_eq!(api.product(&ProductId::from(2u64)).unwrap().price, Some(25.0));
    }

    #[test]
    fn missing_product_is_an_error() {
        let api = api();
        let err = api.product(&ProductId::from(9u64)).unwrap_err();
        assert!(matches!(err, StockroomError::Remote(ref e) if e.is_not_found()));
    }

    #[test]
    fn reload_picks_up_server_changes() {
        let api = api();
        let mut catalog = api.open_catalog(&ProductQuery::All);
        let mut editor = api.new_product_form();
        editor.set_field(FormField::Name, "Chisel");
        editor.set_field(FormField::Price, "7.25");
        editor.set_field(FormField::Quantity, "8");
        api.submit(&mut editor);

        assert_eq!(catalog.products().len(), 2);
        assert_eq!(api.reload(&mut catalog), LoadOutcome::Loaded(3));
    }
}
