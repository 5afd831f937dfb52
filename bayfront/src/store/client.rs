//! HTTP client for the hosted data service.
//!
//! The service speaks a PostgREST-style REST dialect: one route per collection,
//! filters and ordering as query parameters (`status=eq.approved`,
//! `order=created_at.desc`), writes as POST/PATCH/DELETE with a
//! `Prefer: return=representation` header when the caller wants the row back,
//! and stored procedures under `/rpc/<name>`.
//!
//! [`DataClient`] is cheap to clone (it wraps an `Arc`'d reqwest client) and is
//! shared through `AppState`. Repositories in [`super::handlers`] build typed
//! operations on top of [`Query`].

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::BackendConfig;

use super::errors::{Result, StoreError};

/// Sort direction for `order=` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Client handle for the hosted data service.
#[derive(Debug, Clone)]
pub struct DataClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DataClient {
    /// Build a client from backend configuration. The service key is attached to
    /// every request as both `apikey` and bearer token, the way the hosted
    /// service expects.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(&config.service_key).map_err(|e| StoreError::Decode {
            message: format!("service key is not a valid header value: {e}"),
        })?;
        headers.insert("apikey", key_value);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key)).map_err(|e| StoreError::Decode {
            message: format!("service key is not a valid header value: {e}"),
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.clone(),
        })
    }

    /// Start a query against a named collection.
    pub fn from(&self, table: &str) -> Query {
        Query {
            client: self.clone(),
            table: table.to_string(),
            params: Vec::new(),
        }
    }

    /// Invoke a stored procedure. Used for counter increments where a plain
    /// UPDATE would race with concurrent increments.
    #[tracing::instrument(skip(self, args))]
    pub async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        let url = self.join(&format!("rpc/{function}"))?;
        let response = self.http.post(url).json(&args).send().await?;
        let response = check_status(response).await?;
        if response.content_length() == Some(0) {
            return Ok(Value::Null);
        }
        let body = response.json::<Value>().await?;
        Ok(body)
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| StoreError::Decode {
            message: format!("invalid store path {path:?}: {e}"),
        })
    }
}

/// One pending request against a collection. Filters accumulate as query
/// parameters until a terminal method sends the request.
#[derive(Debug, Clone)]
pub struct Query {
    client: DataClient,
    table: String,
    params: Vec<(String, String)>,
}

impl Query {
    /// Restrict returned columns (PostgREST `select=` syntax, including
    /// embedded resources like `*,profile:profiles(display_name,avatar_url)`).
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// `column = value` filter.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params.push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// `column IN (values)` filter.
    pub fn in_(mut self, column: &str, values: &[impl ToString]) -> Self {
        let list = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        self.params.push((column.to_string(), format!("in.({list})")));
        self
    }

    /// Sort by a column.
    pub fn order(mut self, column: &str, direction: Order) -> Self {
        let suffix = match direction {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        };
        self.params.push(("order".to_string(), format!("{column}.{suffix}")));
        self
    }

    /// Offset/limit pagination.
    pub fn range(mut self, skip: i64, limit: i64) -> Self {
        self.params.push(("offset".to_string(), skip.to_string()));
        self.params.push(("limit".to_string(), limit.to_string()));
        self
    }

    /// Execute as a read and decode all rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let url = self.url()?;
        let response = self.client.http.get(url).query(&self.params).send().await?;
        let response = check_status(response).await?;
        let rows = response.json::<Vec<T>>().await.map_err(decode_error)?;
        Ok(rows)
    }

    /// Execute as a read expecting at most one row.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let mut rows = self.fetch::<T>().await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Execute as a read expecting exactly one row; zero rows is [`StoreError::NotFound`].
    pub async fn fetch_one<T: DeserializeOwned>(self) -> Result<T> {
        self.fetch_optional().await?.ok_or(StoreError::NotFound)
    }

    /// Insert a row and return the stored representation (server-assigned id,
    /// timestamps and defaults included).
    pub async fn insert<T: DeserializeOwned>(self, body: &impl serde::Serialize) -> Result<T> {
        let url = self.url()?;
        let response = self
            .client
            .http
            .post(url)
            .query(&self.params)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let mut rows = response.json::<Vec<T>>().await.map_err(decode_error)?;
        if rows.is_empty() {
            return Err(StoreError::Decode {
                message: "insert returned no representation".to_string(),
            });
        }
        Ok(rows.remove(0))
    }

    /// Update rows matching the accumulated filters and return the first updated
    /// representation; updating zero rows is [`StoreError::NotFound`].
    pub async fn update<T: DeserializeOwned>(self, body: &impl serde::Serialize) -> Result<T> {
        let url = self.url()?;
        let response = self
            .client
            .http
            .patch(url)
            .query(&self.params)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let mut rows = response.json::<Vec<T>>().await.map_err(decode_error)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }

    /// Delete rows matching the accumulated filters. Returns whether anything
    /// was deleted.
    pub async fn delete(self) -> Result<bool> {
        let url = self.url()?;
        let response = self
            .client
            .http
            .delete(url)
            .query(&self.params)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let response = check_status(response).await?;
        let rows = response.json::<Vec<Value>>().await.map_err(decode_error)?;
        Ok(!rows.is_empty())
    }

    fn url(&self) -> Result<Url> {
        self.client.join(&self.table)
    }
}

/// Map non-success responses to [`StoreError::Remote`], pulling the message and
/// error code out of the PostgREST error body when present.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (message, code) = match serde_json::from_str::<Value>(&body) {
        Ok(parsed) => (
            parsed
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
            parsed.get("code").and_then(Value::as_str).map(str::to_string),
        ),
        Err(_) => (body, None),
    };

    Err(StoreError::Remote {
        status: axum::http::StatusCode::from_u16(status.as_u16()).unwrap_or(axum::http::StatusCode::BAD_GATEWAY),
        message,
        code,
    })
}

fn decode_error(err: reqwest::Error) -> StoreError {
    if err.is_decode() {
        StoreError::Decode {
            message: err.to_string(),
        }
    } else {
        StoreError::Transport(err)
    }
}
