//! The request-normalize-sync pipeline tying sources, normalization and
//! overlays together.

use log::{info, warn};
use ortelius_types::{GeoPoint2d, RawCollection};

use crate::engine::MapEngine;
use crate::error::OrteliusError;
use crate::messenger::{DummyMessenger, Messenger, Notice};
use crate::normalize::normalize;
use crate::overlay::Overlay;
use crate::source::{DatasetQuery, DatasetSource, NearestSource};

/// Outcome of one pipeline trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The given number of features was reconciled onto the overlay.
    Synced(usize),
    /// The response contained no usable records. The map was left unchanged
    /// and the messenger was notified.
    Empty,
}

struct DatasetSetup {
    source: Box<dyn DatasetSource>,
    query: DatasetQuery,
    overlay: Overlay,
}

struct NearestSetup {
    source: Box<dyn NearestSource>,
    count: u32,
    overlay: Overlay,
}

/// Context object owning everything a page's overlay flows need: the source
/// clients, the overlays they feed, and the notice channel.
///
/// A pipeline serves two triggers. The initial-load trigger
/// ([`SyncPipeline::load_dataset`]) fetches a fixed dataset once; the
/// map-click trigger ([`SyncPipeline::handle_map_click`]) runs a
/// nearest-neighbor query around the clicked point. Each trigger issues one
/// request; within it, normalization strictly precedes sync. Concurrent
/// triggers are not coordinated: requests cannot be cancelled, and whichever
/// response completes last wins its overlay's data (sync is idempotent, so
/// this is safe).
///
/// ```no_run
/// use ortelius::source::{DatasetClient, DatasetQuery};
/// use ortelius::style::{CircleStyle, ColorRule};
/// use ortelius::popup::PopupTemplate;
/// use ortelius::engine::TestEngine;
/// use ortelius::{Overlay, PipelineBuilder};
///
/// # tokio_test::block_on(async {
/// let dataset = DatasetClient::new(
///     "https://data.cityofnewyork.us/resource/43nn-pn8j.geojson",
/// )?;
/// let pipeline = PipelineBuilder::default()
///     .with_dataset(
///         dataset,
///         DatasetQuery::new().with_filter("cuisine_description", "Pizza"),
///         Overlay::new(
///             "restaurants",
///             CircleStyle::default(),
///             PopupTemplate::restaurant(),
///         ),
///     )
///     .build();
///
/// let mut engine = TestEngine::new();
/// pipeline.load_dataset(&mut engine).await?;
/// # Ok::<(), ortelius::OrteliusError>(())
/// # });
/// ```
pub struct SyncPipeline {
    dataset: Option<DatasetSetup>,
    nearest: Option<NearestSetup>,
    messenger: Box<dyn Messenger>,
}

impl SyncPipeline {
    /// Runs the initial-load trigger: fetches the configured dataset,
    /// normalizes the response and syncs it onto the dataset overlay.
    ///
    /// On a transport failure the error is returned and the map is left
    /// unchanged; the map stays interactive and later triggers proceed
    /// normally.
    pub async fn load_dataset(
        &self,
        engine: &mut dyn MapEngine,
    ) -> Result<SyncOutcome, OrteliusError> {
        let Some(setup) = &self.dataset else {
            return Err(OrteliusError::Generic(
                "no dataset source configured".into(),
            ));
        };

        let raw = match setup.source.fetch(&setup.query).await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(
                    "dataset request failed, overlay '{}' left unchanged: {error}",
                    setup.overlay.key()
                );
                return Err(error);
            }
        };

        self.finish(engine, &setup.overlay, raw)
    }

    /// Runs a nearest-neighbor query around `origin` and syncs the result
    /// onto the query overlay.
    pub async fn query_nearest(
        &self,
        engine: &mut dyn MapEngine,
        origin: GeoPoint2d,
    ) -> Result<SyncOutcome, OrteliusError> {
        let Some(setup) = &self.nearest else {
            return Err(OrteliusError::Generic(
                "no nearest-neighbor source configured".into(),
            ));
        };

        let raw = match setup.source.nearest(origin, setup.count).await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(
                    "nearest query failed, overlay '{}' left unchanged: {error}",
                    setup.overlay.key()
                );
                return Err(error);
            }
        };

        self.finish(engine, &setup.overlay, raw)
    }

    /// Entry point for map-scoped clicks: queries the records nearest to the
    /// clicked position.
    pub async fn handle_map_click(
        &self,
        engine: &mut dyn MapEngine,
        position: GeoPoint2d,
    ) -> Result<SyncOutcome, OrteliusError> {
        self.query_nearest(engine, position).await
    }

    fn finish(
        &self,
        engine: &mut dyn MapEngine,
        overlay: &Overlay,
        raw: RawCollection,
    ) -> Result<SyncOutcome, OrteliusError> {
        let collection = normalize(raw);

        if collection.is_empty() {
            info!(
                "response for overlay '{}' contained no usable records",
                overlay.key()
            );
            self.messenger.notice(&Notice::EmptyResult {
                overlay: overlay.key().to_string(),
            });
            return Ok(SyncOutcome::Empty);
        }

        overlay.sync(engine, &collection)?;
        Ok(SyncOutcome::Synced(collection.len()))
    }
}

/// Convenience type to initialize a [`SyncPipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    dataset: Option<DatasetSetup>,
    nearest: Option<NearestSetup>,
    messenger: Option<Box<dyn Messenger>>,
}

impl PipelineBuilder {
    /// Configures the initial-load trigger: the dataset source, the query it
    /// is asked, and the overlay the results feed.
    pub fn with_dataset(
        mut self,
        source: impl DatasetSource + 'static,
        query: DatasetQuery,
        overlay: Overlay,
    ) -> Self {
        self.dataset = Some(DatasetSetup {
            source: Box::new(source),
            query,
            overlay,
        });
        self
    }

    /// Configures the map-click trigger: the nearest-neighbor source, the
    /// result-count bound, and the overlay the results feed.
    pub fn with_nearest(
        mut self,
        source: impl NearestSource + 'static,
        count: u32,
        overlay: Overlay,
    ) -> Self {
        self.nearest = Some(NearestSetup {
            source: Box::new(source),
            count,
            overlay,
        });
        self
    }

    /// Sets the messenger notices are delivered through.
    ///
    /// Defaults to [`DummyMessenger`], which discards them.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Some(Box::new(messenger));
        self
    }

    /// Consumes the builder and creates the pipeline.
    pub fn build(self) -> SyncPipeline {
        let PipelineBuilder {
            dataset,
            nearest,
            messenger,
        } = self;

        SyncPipeline {
            dataset,
            nearest,
            messenger: messenger.unwrap_or_else(|| Box::new(DummyMessenger)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use ortelius_types::latlon;
    use serde_json::json;

    use super::*;
    use crate::engine::TestEngine;
    use crate::popup::PopupTemplate;
    use crate::style::{CircleStyle, ColorRule};

    struct StubDataset {
        response: Result<serde_json::Value, OrteliusError>,
    }

    #[async_trait]
    impl DatasetSource for StubDataset {
        async fn fetch(&self, _query: &DatasetQuery) -> Result<RawCollection, OrteliusError> {
            match &self.response {
                Ok(payload) => Ok(serde_json::from_value(payload.clone())
                    .expect("stub payload must deserialize")),
                Err(_) => Err(OrteliusError::Io),
            }
        }
    }

    struct StubNearest {
        calls: Arc<Mutex<Vec<(GeoPoint2d, u32)>>>,
        rows: serde_json::Value,
    }

    #[async_trait]
    impl NearestSource for StubNearest {
        async fn nearest(
            &self,
            origin: GeoPoint2d,
            count: u32,
        ) -> Result<RawCollection, OrteliusError> {
            self.calls
                .lock()
                .expect("lock is poisoned")
                .push((origin, count));
            Ok(serde_json::from_value(self.rows.clone()).expect("stub rows must deserialize"))
        }
    }

    struct TestMessenger {
        notices: Arc<Mutex<Vec<Notice>>>,
    }

    impl Messenger for TestMessenger {
        fn notice(&self, notice: &Notice) {
            self.notices
                .lock()
                .expect("lock is poisoned")
                .push(notice.clone());
        }
    }

    fn test_overlay(key: &str) -> Overlay {
        Overlay::new(
            key,
            CircleStyle::new(ColorRule::seating_choice()),
            PopupTemplate::restaurant(),
        )
    }

    fn restaurant_payload() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                { "properties": { "longitude": "-73.9", "latitude": "40.7", "dba": "Al's Pizza" } },
                { "properties": { "longitude": "n/a", "latitude": "40.7" } },
            ]
        })
    }

    #[tokio::test]
    async fn load_dataset_normalizes_and_syncs() {
        let pipeline = PipelineBuilder::default()
            .with_dataset(
                StubDataset {
                    response: Ok(restaurant_payload()),
                },
                DatasetQuery::new(),
                test_overlay("restaurants"),
            )
            .build();

        let mut engine = TestEngine::new();
        let outcome = pipeline
            .load_dataset(&mut engine)
            .await
            .expect("load succeeds");

        // The malformed record is dropped, the valid one is synced.
        assert_eq!(outcome, SyncOutcome::Synced(1));
        assert_eq!(engine.layer_count("restaurants-layer"), 1);
        assert_eq!(
            engine
                .source_data("restaurants")
                .expect("source exists")
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn empty_response_notifies_and_leaves_map_unchanged() {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let pipeline = PipelineBuilder::default()
            .with_dataset(
                StubDataset {
                    response: Ok(json!({
                        "features": [
                            { "properties": { "longitude": "n/a", "latitude": "40.7" } }
                        ]
                    })),
                },
                DatasetQuery::new(),
                test_overlay("restaurants"),
            )
            .with_messenger(TestMessenger {
                notices: notices.clone(),
            })
            .build();

        let mut engine = TestEngine::new();
        let outcome = pipeline
            .load_dataset(&mut engine)
            .await
            .expect("empty result is not an error");

        assert_eq!(outcome, SyncOutcome::Empty);
        assert!(!engine.has_source("restaurants"));
        assert_eq!(
            *notices.lock().expect("lock is poisoned"),
            vec![Notice::EmptyResult {
                overlay: "restaurants".into()
            }]
        );
    }

    #[tokio::test]
    async fn transport_failure_aborts_without_touching_the_map() {
        let pipeline = PipelineBuilder::default()
            .with_dataset(
                StubDataset {
                    response: Err(OrteliusError::Io),
                },
                DatasetQuery::new(),
                test_overlay("restaurants"),
            )
            .build();

        let mut engine = TestEngine::new();
        let result = pipeline.load_dataset(&mut engine).await;

        assert_matches!(result, Err(OrteliusError::Io));
        assert!(!engine.has_source("restaurants"));
    }

    #[tokio::test]
    async fn map_click_queries_nearest_records_at_position() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = PipelineBuilder::default()
            .with_nearest(
                StubNearest {
                    calls: calls.clone(),
                    rows: json!([
                        { "long": -73.95, "lat": 40.71, "seating_choice": "Outdoor" }
                    ]),
                },
                1000,
                test_overlay("inspections"),
            )
            .build();

        let mut engine = TestEngine::new();
        let clicked = latlon!(40.70491, -73.97144);
        let outcome = pipeline
            .handle_map_click(&mut engine, clicked)
            .await
            .expect("query succeeds");

        assert_eq!(outcome, SyncOutcome::Synced(1));
        assert_eq!(
            *calls.lock().expect("lock is poisoned"),
            vec![(clicked, 1000)]
        );
        assert!(engine.has_source("inspections"));
    }

    #[tokio::test]
    async fn unconfigured_triggers_are_an_error() {
        let pipeline = PipelineBuilder::default().build();
        let mut engine = TestEngine::new();

        assert_matches!(
            pipeline.load_dataset(&mut engine).await,
            Err(OrteliusError::Generic(_))
        );
        assert_matches!(
            pipeline
                .query_nearest(&mut engine, latlon!(40.7, -73.9))
                .await,
            Err(OrteliusError::Generic(_))
        );
    }
}
