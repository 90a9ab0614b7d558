use super::{ApiResult, ProductApi, ProductQuery};
use crate::error::ApiError;
use crate::model::{Envelope, Product, ProductId, ProductPayload};
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// A failure mode the in-memory client can be told to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedFailure {
    /// The request never gets an answer.
    Offline,
    /// The server answers 2xx with `success: false`.
    Refused { message: Option<String> },
    /// The server answers with a non-2xx status and a JSON envelope.
    Status {
        status: u16,
        message: Option<String>,
        errors: Option<BTreeMap<String, String>>,
    },
}

impl SimulatedFailure {
    pub fn refused() -> Self {
        SimulatedFailure::Refused { message: None }
    }

    /// A 400 carrying per-field messages, the way server-side validation answers.
    pub fn field_errors<I, K, V>(errors: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SimulatedFailure::Status {
            status: 400,
            message: Some("Validation failed".to_string()),
            errors: Some(
                errors
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

/// One request as seen by the in-memory client.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    List(ProductQuery),
    Get(ProductId),
    Create(ProductPayload),
    Update(ProductId, ProductPayload),
    Delete(ProductId),
}

/// In-process product service for testing.
///
/// Behaves like the real service (404 for unknown ids, unique names, server-side search
/// endpoints) and records every call so tests can assert that a request was, or was not, made.
/// Uses `RefCell` since the components are single-threaded.
pub struct InMemoryClient {
    products: RefCell<Vec<Product>>,
    next_id: Cell<u64>,
    failure: RefCell<Option<SimulatedFailure>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self {
            products: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            failure: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the service with products, in the order the listing will return them.
    pub fn with_products(products: Vec<Product>) -> Self {
        let client = Self::new();
        let max_numeric = products
            .iter()
            .filter_map(|p| p.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        client.next_id.set(max_numeric + 1);
        *client.products.borrow_mut() = products;
        client
    }

    /// Makes every following call fail the given way, or succeed again with `None`.
    pub fn set_failure(&self, failure: Option<SimulatedFailure>) {
        *self.failure.borrow_mut() = failure;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Snapshot of what the "server" currently holds.
    pub fn products(&self) -> Vec<Product> {
        self.products.borrow().clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check_failure<T>(&self) -> Option<ApiResult<T>> {
        let failure = self.failure.borrow().clone()?;
        Some(match failure {
            SimulatedFailure::Offline => {
                Err(ApiError::Transport("connection refused".to_string()))
            }
            SimulatedFailure::Refused { message } => Ok(Envelope::failed(message.as_deref())),
            SimulatedFailure::Status {
                status,
                message,
                errors,
            } => {
                let mut body = Envelope::failed(message.as_deref());
                body.errors = errors;
                Err(ApiError::Status {
                    status,
                    body: Some(body),
                })
            }
        })
    }

    fn not_found<T>(id: &ProductId) -> ApiResult<T> {
        Err(ApiError::Status {
            status: 404,
            body: Some(Envelope::failed(Some(&format!(
                "Product not found with id: {}",
                id
            )))),
        })
    }

    fn name_taken<T>(name: &str) -> ApiResult<T> {
        Err(ApiError::Status {
            status: 400,
            body: Some(Envelope::failed(Some(&format!(
                "Product with name '{}' already exists",
                name
            )))),
        })
    }

    fn name_in_use(&self, name: &str, except: Option<&ProductId>) -> bool {
        self.products
            .borrow()
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name) && Some(&p.id) != except)
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

fn apply_payload(product: &mut Product, payload: &ProductPayload) {
    product.name = payload.name.clone();
    product.description = Some(payload.description.clone());
    product.price = Some(payload.price);
    product.quantity = Some(payload.quantity);
    product.category = Some(payload.category.clone());
}

impl ProductApi for InMemoryClient {
    fn list_products(&self, query: &ProductQuery) -> ApiResult<Vec<Product>> {
        self.record(RecordedCall::List(query.clone()));
        if let Some(failed) = self.check_failure() {
            return failed;
        }

        let products = self.products.borrow();
        let listed = match query {
            ProductQuery::All => products.clone(),
            ProductQuery::Search(term) if term.trim().is_empty() => products.clone(),
            ProductQuery::Search(term) => {
                let term = term.trim();
                products
                    .iter()
                    .filter(|p| {
                        contains_ignore_case(Some(&p.name), term)
                            || contains_ignore_case(p.description.as_deref(), term)
                    })
                    .cloned()
                    .collect()
            }
            ProductQuery::Category(category) => products
                .iter()
                .filter(|p| contains_ignore_case(p.category.as_deref(), category))
                .cloned()
                .collect(),
            ProductQuery::LowStock(threshold) => products
                .iter()
                .filter(|p| p.quantity.unwrap_or(0) <= i64::from(*threshold))
                .cloned()
                .collect(),
        };
        Ok(Envelope::ok(listed))
    }

    fn get_product(&self, id: &ProductId) -> ApiResult<Product> {
        self.record(RecordedCall::Get(id.clone()));
        if let Some(failed) = self.check_failure() {
            return failed;
        }

        match self.products.borrow().iter().find(|p| &p.id == id) {
            Some(product) => Ok(Envelope::ok(product.clone())),
            None => Self::not_found(id),
        }
    }

    fn create_product(&self, payload: &ProductPayload) -> ApiResult<Product> {
        self.record(RecordedCall::Create(payload.clone()));
        if let Some(failed) = self.check_failure() {
            return failed;
        }
        if self.name_in_use(&payload.name, None) {
            return Self::name_taken(&payload.name);
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let now = Utc::now();
        let mut product = Product::new(id, payload.name.clone());
        apply_payload(&mut product, payload);
        product.created_at = Some(now);
        product.updated_at = Some(now);

        self.products.borrow_mut().push(product.clone());
        Ok(Envelope::ok(product))
    }

    fn update_product(&self, id: &ProductId, payload: &ProductPayload) -> ApiResult<Product> {
        self.record(RecordedCall::Update(id.clone(), payload.clone()));
        if let Some(failed) = self.check_failure() {
            return failed;
        }
        if self.name_in_use(&payload.name, Some(id)) {
            return Self::name_taken(&payload.name);
        }

        let mut products = self.products.borrow_mut();
        match products.iter_mut().find(|p| &p.id == id) {
            Some(product) => {
                apply_payload(product, payload);
                product.updated_at = Some(Utc::now());
                Ok(Envelope::ok(product.clone()))
            }
            None => Self::not_found(id),
        }
    }

    fn delete_product(&self, id: &ProductId) -> ApiResult<serde_json::Value> {
        self.record(RecordedCall::Delete(id.clone()));
        if let Some(failed) = self.check_failure() {
            return failed;
        }

        let mut products = self.products.borrow_mut();
        match products.iter().position(|p| &p.id == id) {
            Some(pos) => {
                products.remove(pos);
                Ok(Envelope {
                    success: true,
                    data: None,
                    message: Some("Product deleted successfully".to_string()),
                    errors: None,
                })
            }
            None => Self::not_found(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryClient {
        InMemoryClient::with_products(vec![
            Product::new(1u64, "Hammer")
                .with_category("Tools")
                .with_quantity(3),
            Product::new(2u64, "Desk Lamp")
                .with_description("LED, warm light")
                .with_category("Lighting")
                .with_quantity(40),
        ])
    }

    fn payload(name: &str) -> ProductPayload {
        ProductPayload {
            name: name.into(),
            description: String::new(),
            price: 1.5,
            quantity: 1,
            category: String::new(),
        }
    }

    #[test]
    fn create_assigns_next_id() {
        let client = seeded();
        let created = client.create_product(&payload("Saw")).unwrap();
        assert_eq!(created.data.unwrap().id, ProductId::from(3u64));
        assert_eq!(client.products().len(), 3);
    }

    #[test]
    fn create_rejects_duplicate_names() {
        let client = seeded();
        let err = client.create_product(&payload("hammer")).unwrap_err();
        assert_eq!(err.message(), Some("Product with name 'hammer' already exists"));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let client = seeded();
        assert!(client
            .get_product(&ProductId::from("99"))
            .unwrap_err()
            .is_not_found());
        assert!(client
            .delete_product(&ProductId::from("99"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn server_side_queries() {
        let client = seeded();
        let search = client
            .list_products(&ProductQuery::Search("led".into()))
            .unwrap();
        assert_eq!(search.data.unwrap().len(), 1);

        let low = client.list_products(&ProductQuery::LowStock(10)).unwrap();
        assert_eq!(low.data.unwrap()[0].name, "Hammer");

        let category = client
            .list_products(&ProductQuery::Category("light".into()))
            .unwrap();
        assert_eq!(category.data.unwrap()[0].name, "Desk Lamp");
    }

    #[test]
    fn failures_still_record_calls() {
        let client = seeded();
        client.set_failure(Some(SimulatedFailure::Offline));
        assert!(matches!(
            client.list_products(&ProductQuery::All),
            Err(ApiError::Transport(_))
        ));
        assert_eq!(client.calls(), vec![RecordedCall::List(ProductQuery::All)]);
    }
}
