//! # Record Editor
//!
//! Create-or-edit life cycle for a single product.
//!
//! The form keeps every field as the raw text the user typed. Price and quantity are only
//! parsed when validating and when building the submission payload, so a half-typed value
//! never gets lost or silently coerced.
//!
//! ## Validation
//!
//! [`FormState::validate`] is a pure function of the form. [`RecordEditor::validate`] runs it
//! and *replaces* the stored errors, so stale messages from an earlier attempt disappear even
//! for fields nobody touched. Editing a field drops only that field's message.
//!
//! ## Submission
//!
//! ```text
//! validate ──fail──> Invalid (no request)
//!    │
//!    ok ──> create / update ──success──────────> Saved (go back to the catalog)
//!                           ├─field errors─────> Rejected, errors replaced by the server's
//!                           └─anything else────> Rejected, page-level error banner
//! ```

use crate::client::ProductApi;
use crate::error::{ApiError, ErrorBanner};
use crate::model::{Product, ProductId, ProductPayload};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub const NAME_REQUIRED: &str = "Product name is required";
pub const PRICE_INVALID: &str = "Price must be greater than 0";
pub const QUANTITY_INVALID: &str = "Quantity cannot be negative";

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const FETCH_ERROR: &str = "Error fetching product";
pub const SAVE_FAILED: &str = "Failed to save product";
pub const SAVE_ERROR: &str = "Error saving product";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Name,
    Description,
    Price,
    Quantity,
    Category,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::Description,
        FormField::Price,
        FormField::Quantity,
        FormField::Category,
    ];

    /// Wire name, as used in payloads and server error maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Description => "description",
            FormField::Price => "price",
            FormField::Quantity => "quantity",
            FormField::Category => "category",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Product Name",
            FormField::Description => "Description",
            FormField::Price => "Price ($)",
            FormField::Quantity => "Quantity",
            FormField::Category => "Category",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            FormField::Name | FormField::Price | FormField::Quantity
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// Field name to message. Keys are wire names; server errors may use names we don't know.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(field.as_str()).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn remove(&mut self, field: FormField) -> Option<String> {
        self.0.remove(field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for ValidationErrors {
    fn from(errors: BTreeMap<String, String>) -> Self {
        Self(errors)
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

fn parse_quantity(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|qty| *qty >= 0)
}

/// Raw text of every editable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
    pub category: String,
}

impl FormState {
    /// Seeds the form from a fetched product. Absent values become empty text.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.map(|p| p.to_string()).unwrap_or_default(),
            quantity: product.quantity.map(|q| q.to_string()).unwrap_or_default(),
            category: product.category.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
            FormField::Price => &self.price,
            FormField::Quantity => &self.quantity,
            FormField::Category => &self.category,
        }
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Description => &mut self.description,
            FormField::Price => &mut self.price,
            FormField::Quantity => &mut self.quantity,
            FormField::Category => &mut self.category,
        }
    }

    /// Checks every rule; never stops at the first failure.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.insert(FormField::Name.as_str(), NAME_REQUIRED);
        }
        if parse_price(&self.price).is_none() {
            errors.insert(FormField::Price.as_str(), PRICE_INVALID);
        }
        if parse_quantity(&self.quantity).is_none() {
            errors.insert(FormField::Quantity.as_str(), QUANTITY_INVALID);
        }
        errors
    }

    /// The request body, or `None` if price or quantity do not parse.
    pub fn to_payload(&self) -> Option<ProductPayload> {
        Some(ProductPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: parse_price(&self.price)?,
            quantity: parse_quantity(&self.quantity)?,
            category: self.category.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(ProductId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Stored by the server. Navigate back to the catalog.
    Saved(Option<Product>),
    /// Client-side validation failed; nothing was sent.
    Invalid,
    /// The server refused or could not be reached; see the errors and banner.
    Rejected,
}

#[derive(Debug)]
pub struct RecordEditor {
    mode: EditorMode,
    form: FormState,
    errors: ValidationErrors,
    loading: bool,
    error: Option<ErrorBanner>,
}

impl RecordEditor {
    /// A non-empty id selects edit mode, anything else create mode. Fixed for the editor's
    /// lifetime.
    pub fn new(id: Option<&str>) -> Self {
        let mode = match id.map(str::trim) {
            Some(id) if !id.is_empty() => EditorMode::Edit(ProductId::new(id)),
            _ => EditorMode::Create,
        };
        Self {
            mode,
            form: FormState::default(),
            errors: ValidationErrors::new(),
            loading: false,
            error: None,
        }
    }

    pub fn create() -> Self {
        Self::new(None)
    }

    pub fn edit(id: &ProductId) -> Self {
        Self::new(Some(id.as_str()))
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditorMode::Edit(_))
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn heading(&self) -> &'static str {
        if self.is_editing() {
            "Edit Product"
        } else {
            "Add New Product"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.loading, self.is_editing()) {
            (true, _) => "Saving...",
            (false, true) => "Update Product",
            (false, false) => "Add Product",
        }
    }

    /// Populates the form from the server. Only meaningful in edit mode; in create mode it
    /// returns `false` without a request.
    pub fn load<C: ProductApi>(&mut self, client: &C) -> bool {
        let EditorMode::Edit(id) = &self.mode else {
            return false;
        };

        self.loading = true;
        let loaded = match client.get_product(id) {
            Ok(envelope) if envelope.success => match envelope.data {
                Some(product) => {
                    self.form = FormState::from_product(&product);
                    self.error = None;
                    true
                }
                None => {
                    self.error = Some(ErrorBanner::application(PRODUCT_NOT_FOUND));
                    false
                }
            },
            Ok(_) => {
                self.error = Some(ErrorBanner::application(PRODUCT_NOT_FOUND));
                false
            }
            Err(err) if err.is_not_found() => {
                self.error = Some(ErrorBanner::application(PRODUCT_NOT_FOUND));
                false
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to fetch product");
                self.error = Some(ErrorBanner::for_error(&err, FETCH_ERROR));
                false
            }
        };
        self.loading = false;
        loaded
    }

    /// Updates one field and drops any validation message attached to it.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.form.slot_mut(field) = value.into();
        self.errors.remove(field);
    }

    /// Re-validates the whole form, replacing the stored errors. True when valid.
    pub fn validate(&mut self) -> bool {
        self.errors = self.form.validate();
        self.errors.is_empty()
    }

    pub fn submit<C: ProductApi>(&mut self, client: &C) -> SubmitOutcome {
        if !self.validate() {
            debug!(errors = self.errors.len(), "form invalid, not submitting");
            return SubmitOutcome::Invalid;
        }
        let Some(payload) = self.form.to_payload() else {
            return SubmitOutcome::Invalid;
        };

        self.loading = true;
        self.error = None;
        let response = match &self.mode {
            EditorMode::Create => client.create_product(&payload),
            EditorMode::Edit(id) => client.update_product(id, &payload),
        };

        let outcome = match response {
            Ok(envelope) if envelope.success => {
                debug!(name = %payload.name, "product saved");
                SubmitOutcome::Saved(envelope.data)
            }
            Ok(envelope) => {
                match envelope.field_errors() {
                    Some(errors) => self.errors = errors.clone().into(),
                    None => {
                        let message = envelope.message.as_deref().unwrap_or(SAVE_FAILED);
                        self.error = Some(ErrorBanner::application(message));
                    }
                }
                SubmitOutcome::Rejected
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.apply_save_error(err);
                SubmitOutcome::Rejected
            }
        };
        self.loading = false;
        outcome
    }

    fn apply_save_error(&mut self, err: ApiError) {
        match err {
            ApiError::Status {
                body: Some(body), ..
            } => match body.field_errors() {
                Some(errors) => self.errors = errors.clone().into(),
                None => {
                    let message = body.message.as_deref().unwrap_or(SAVE_ERROR);
                    self.error = Some(ErrorBanner::application(message));
                }
            },
            other => self.error = Some(ErrorBanner::for_error(&other, SAVE_ERROR)),
        }
    }
}
