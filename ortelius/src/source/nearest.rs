use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use ortelius_types::{GeoPoint2d, RawCollection};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{NearestSource, DEFAULT_TIMEOUT, USER_AGENT};
use crate::error::OrteliusError;

#[derive(Debug, Serialize)]
struct NearestArgs {
    lat: f64,
    lon: f64,
    n: u32,
}

/// Client for a remote nearest-neighbor procedure.
///
/// The procedure takes a point and a result-count bound and returns an
/// ordered array of flat row objects; all spatial computation happens on the
/// server. A static credential, if configured, is passed on every call.
#[derive(Debug, Clone)]
pub struct NearestClient {
    http_client: reqwest::Client,
    url: String,
    credential: Option<String>,
}

impl NearestClient {
    /// Creates a client for the procedure at `url` with the default request
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
            credential: None,
        })
    }

    /// Sets the static credential passed with every call.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

#[async_trait]
impl NearestSource for NearestClient {
    async fn nearest(
        &self,
        origin: GeoPoint2d,
        count: u32,
    ) -> Result<RawCollection, OrteliusError> {
        let args = NearestArgs {
            lat: origin.lat(),
            lon: origin.lon(),
            n: count,
        };

        let mut request = self.http_client.post(&self.url).json(&args);
        if let Some(credential) = &self.credential {
            request = request
                .header("apikey", credential.as_str())
                .bearer_auth(credential);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(
                "nearest query to {} failed: {status}, {:?}",
                self.url,
                response.text().await
            );
            return Err(OrteliusError::Backend { status });
        }

        let body = response.text().await?;
        let rows: Vec<Map<String, Value>> = serde_json::from_str(&body)?;
        Ok(RawCollection::from_rows(rows))
    }
}
