use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use ortelius_types::RawCollection;

use super::{DatasetSource, DEFAULT_TIMEOUT, USER_AGENT};
use crate::error::OrteliusError;

/// Attribute filters and the result cap for a dataset request.
///
/// ```
/// use ortelius::source::DatasetQuery;
///
/// let query = DatasetQuery::new()
///     .with_filter("cuisine_description", "Pizza")
///     .with_limit(10_000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetQuery {
    filters: Vec<(String, String)>,
    limit: Option<u32>,
}

impl DatasetQuery {
    /// Creates an empty query matching the whole dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact-match filter on the given field.
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Caps the number of returned records.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The query as URL parameters. The result cap uses the `$limit`
    /// parameter understood by open-data portals.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = self.filters.clone();
        if let Some(limit) = self.limit {
            params.push(("$limit".into(), limit.to_string()));
        }
        params
    }
}

/// HTTP client for a fixed dataset collection endpoint.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    http_client: reqwest::Client,
    url: String,
}

impl DatasetClient {
    /// Creates a client for the dataset at `url` with the default request
    /// timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, OrteliusError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with the given request timeout.
    pub fn with_timeout(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OrteliusError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DatasetSource for DatasetClient {
    async fn fetch(&self, query: &DatasetQuery) -> Result<RawCollection, OrteliusError> {
        let response = self
            .http_client
            .get(&self.url)
            .query(&query.params())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(
                "dataset request to {} failed: {status}, {:?}",
                self.url,
                response.text().await
            );
            return Err(OrteliusError::Backend { status });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_include_filters_and_limit() {
        let query = DatasetQuery::new()
            .with_filter("cuisine_description", "Pizza")
            .with_limit(10_000);

        assert_eq!(
            query.params(),
            vec![
                ("cuisine_description".to_string(), "Pizza".to_string()),
                ("$limit".to_string(), "10000".to_string()),
            ]
        );
    }

    #[test]
    fn empty_query_has_no_params() {
        assert!(DatasetQuery::new().params().is_empty());
    }
}
