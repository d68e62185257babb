use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderValue, Method, RequestBuilder};
use serde_json::{Map, Value};
use tracing::{debug, error};
use url::Url;

use crate::filter::Filter;

use super::remote::{RemoteStore, RowSet};
use super::{Collection, StoreError};

/// Record operations against the hosted data API (`<base>/rest/v1/<collection>`),
/// authenticated with the service credential.
pub struct RestStore {
    client: reqwest::Client,
    base_url: Url,
    service_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, service_key: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::network(format!("invalid store url '{}': {}", base_url, e)))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url, service_key: service_key.into() })
    }

    pub fn endpoint(&self, collection: Collection) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/rest/v1/{}", url.path().trim_end_matches('/'), collection.as_str());
        url.set_path(&path);
        url
    }

    fn request(
        &self,
        method: Method,
        collection: Collection,
        filter: &Filter,
        prefer: Option<&'static str>,
    ) -> Result<RequestBuilder, StoreError> {
        let pairs = filter.to_query_pairs()?;
        let mut builder = self
            .client
            .request(method, self.endpoint(collection))
            .query(&pairs)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key);
        if let Some(prefer) = prefer {
            builder = builder.header("Prefer", HeaderValue::from_static(prefer));
        }
        Ok(builder)
    }

    async fn execute(&self, collection: Collection, builder: RequestBuilder) -> Result<RowSet, StoreError> {
        let response = builder.send().await.map_err(|e| {
            error!("Store request to '{}' failed: {}", collection, e);
            StoreError::from(e)
        })?;

        let status = response.status();
        let total_count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        let body = response.text().await?;

        if !status.is_success() {
            let err = StoreError::from_response(status.as_u16(), &body);
            error!("Store error on '{}': {}", collection, err);
            return Err(err);
        }

        let rows = if body.trim().is_empty() {
            vec![]
        } else {
            serde_json::from_str::<Vec<Value>>(&body)?
        };
        debug!("Store '{}' returned {} rows (status {})", collection, rows.len(), status);
        Ok(RowSet { rows, total_count })
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    fn kind(&self) -> &'static str {
        "rest"
    }

    async fn select(&self, collection: Collection, filter: &Filter) -> Result<RowSet, StoreError> {
        let prefer = filter.wants_count().then_some("count=exact");
        let builder = self.request(Method::GET, collection, filter, prefer)?;
        self.execute(collection, builder).await
    }

    async fn insert(&self, collection: Collection, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::POST, collection, &Filter::new(), Some("return=representation"))?
            .json(&rows);
        Ok(self.execute(collection, builder).await?.rows)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Map<String, Value>,
    ) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::PATCH, collection, filter, Some("return=representation"))?
            .json(&patch);
        Ok(self.execute(collection, builder).await?.rows)
    }

    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let builder = self.request(Method::DELETE, collection, filter, Some("return=representation"))?;
        Ok(self.execute(collection, builder).await?.rows)
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}
