use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Server-assigned product identifier.
///
/// Opaque on the client: the API may send a number or a string, we only ever compare it and
/// put it back into URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// A product as the server reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    // Display-only; a malformed timestamp should not sink the whole listing
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price: None,
            quantity: None,
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub category: String,
}

/// The `{ success, data, message, errors }` wrapper every endpoint answers with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, String>>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    /// A `success: false` answer with an optional message.
    pub fn failed(message: Option<&str>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.map(str::to_string),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, String>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Field errors, if the server sent a non-empty set.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        self.errors.as_ref().filter(|errors| !errors.is_empty())
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

/// Parses RFC 3339 or a zone-less `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn product_id_accepts_numbers_and_strings() {
        let numeric: ProductId = serde_json::from_value(json!(42)).unwrap();
        let text: ProductId = serde_json::from_value(json!("sku-7")).unwrap();
        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text.as_str(), "sku-7");
    }

    #[test]
    fn product_parses_server_shape() {
        let product: Product = serde_json::from_value(json!({
            "id": 3,
            "name": "Widget",
            "description": null,
            "price": 9.99,
            "quantity": 10,
            "category": "Tools",
            "createdAt": "2024-01-15T10:30:00"
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::from(3));
        assert_eq!(product.description, None);
        assert_eq!(product.price, Some(9.99));
        let created = product.created_at.unwrap();
        assert_eq!((created.year(), created.month(), created.day()), (2024, 1, 15));
        assert_eq!(created.hour(), 10);
    }

    #[test]
    fn malformed_timestamp_is_dropped() {
        let product: Product = serde_json::from_value(json!({
            "id": "a",
            "name": "Widget",
            "createdAt": [2024, 1, 15]
        }))
        .unwrap();
        assert_eq!(product.created_at, None);
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let ts = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn envelope_defaults_missing_fields() {
        let env: Envelope<Vec<Product>> = serde_json::from_value(json!({})).unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
        assert!(env.field_errors().is_none());
    }

    #[test]
    fn empty_error_map_is_not_field_errors() {
        let env: Envelope<Product> =
            serde_json::from_value(json!({"success": false, "errors": {}})).unwrap();
        assert!(env.field_errors().is_none());
    }

    #[test]
    fn payload_serializes_numbers() {
        let payload = ProductPayload {
            name: "Widget".into(),
            description: "".into(),
            price: 9.99,
            quantity: 10,
            category: "Tools".into(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"name": "Widget", "description": "", "price": 9.99, "quantity": 10, "category": "Tools"})
        );
    }
}
