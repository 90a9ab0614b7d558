use super::{ApiResult, ProductApi, ProductQuery};
use crate::error::{ApiError, Result, StockroomError};
use crate::model::{Envelope, Product, ProductId, ProductPayload};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Product API client speaking JSON over HTTP.
///
/// The base URL is the API root (e.g. `http://localhost:8080/api`); resource paths are
/// appended to it segment by segment so ids and categories are always percent-encoded.
#[derive(Clone)]
pub struct HttpClient {
    base_url: Url,
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self { base_url, agent })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn products_url(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut all = Vec::with_capacity(segments.len() + 1);
        all.push("products");
        all.extend_from_slice(segments);
        build_url(&self.base_url, &all)
    }

    fn request_json<T, R>(&self, method: &str, url: &Url, body: Option<&T>) -> ApiResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        debug!(method, url = %url, "sending request");
        let request = self
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let response = match body {
            None => request.call(),
            Some(body) => {
                let payload = serde_json::to_string(body)
                    .map_err(|err| ApiError::Decode(format!("failed to encode request: {err}")))?;
                request
                    .set("Content-Type", "application/json")
                    .send_string(&payload)
            }
        };

        match response {
            Ok(resp) => read_envelope(resp),
            Err(ureq::Error::Status(status, resp)) => {
                warn!(method, url = %url, status, "server returned an error status");
                Err(parse_error_response(status, resp))
            }
            Err(ureq::Error::Transport(err)) => {
                warn!(method, url = %url, error = %err, "request failed");
                Err(ApiError::Transport(err.to_string()))
            }
        }
    }
}

impl ProductApi for HttpClient {
    fn list_products(&self, query: &ProductQuery) -> ApiResult<Vec<Product>> {
        let url = match query {
            ProductQuery::All => self.products_url(&[])?,
            ProductQuery::Search(term) => {
                let mut url = self.products_url(&["search"])?;
                url.query_pairs_mut().append_pair("q", term);
                url
            }
            ProductQuery::Category(category) => self.products_url(&["category", category])?,
            ProductQuery::LowStock(threshold) => {
                let mut url = self.products_url(&["low-stock"])?;
                url.query_pairs_mut()
                    .append_pair("threshold", &threshold.to_string());
                url
            }
        };
        self.request_json::<(), _>("GET", &url, None)
    }

    fn get_product(&self, id: &ProductId) -> ApiResult<Product> {
        let url = self.products_url(&[id.as_str()])?;
        self.request_json::<(), _>("GET", &url, None)
    }

    fn create_product(&self, payload: &ProductPayload) -> ApiResult<Product> {
        let url = self.products_url(&[])?;
        self.request_json("POST", &url, Some(payload))
    }

    fn update_product(&self, id: &ProductId, payload: &ProductPayload) -> ApiResult<Product> {
        let url = self.products_url(&[id.as_str()])?;
        self.request_json("PUT", &url, Some(payload))
    }

    fn delete_product(&self, id: &ProductId) -> ApiResult<serde_json::Value> {
        let url = self.products_url(&[id.as_str()])?;
        self.request_json::<(), _>("DELETE", &url, None)
    }
}

/// Validates the API root and strips query/fragment. The path is kept: APIs commonly live
/// under a prefix such as `/api`.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| StockroomError::Config(format!("invalid API url '{}': {}", raw, err)))?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(StockroomError::Config(format!(
            "API url must use http or https, got '{}'",
            scheme
        )));
    }
    if url.cannot_be_a_base() {
        return Err(StockroomError::Config(format!(
            "API url '{}' cannot be a base",
            raw
        )));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str]) -> std::result::Result<Url, ApiError> {
    let mut url = base_url.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::Transport("API url cannot be a base".to_string()))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn read_envelope<R: DeserializeOwned>(response: ureq::Response) -> ApiResult<R> {
    let body = response
        .into_string()
        .map_err(|err| ApiError::Transport(format!("failed to read response body: {err}")))?;
    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn parse_error_response(status: u16, response: ureq::Response) -> ApiError {
    let body = response.into_string().unwrap_or_default();
    let body = serde_json::from_str::<Envelope<serde_json::Value>>(&body).ok();
    ApiError::Status { status, body }
}
