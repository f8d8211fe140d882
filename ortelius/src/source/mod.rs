//! Clients for the remote services that produce raw point records.
//!
//! Two kinds of services are supported: open-data dataset APIs queried by
//! attribute filters over HTTP GET, and nearest-neighbor query services
//! invoked as a remote procedure. Both return dirty data; everything they
//! produce goes through [`normalize`](crate::normalize) before it reaches
//! the map.

use std::time::Duration;

use async_trait::async_trait;
use ortelius_types::{GeoPoint2d, RawCollection};

use crate::error::OrteliusError;

mod dataset;
mod nearest;

pub use dataset::{DatasetClient, DatasetQuery};
pub use nearest::NearestClient;

/// Request timeout applied by the HTTP clients unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const USER_AGENT: &str = "ortelius/0.1";

/// A remote collection of raw point records reachable by attribute queries.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetches the records matching `query`.
    async fn fetch(&self, query: &DatasetQuery) -> Result<RawCollection, OrteliusError>;
}

/// A remote procedure returning the records closest to a point.
#[async_trait]
pub trait NearestSource: Send + Sync {
    /// Returns up to `count` records closest to `origin`, closest first.
    async fn nearest(
        &self,
        origin: GeoPoint2d,
        count: u32,
    ) -> Result<RawCollection, OrteliusError>;
}
