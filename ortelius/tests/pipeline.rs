//! End-to-end flows: raw service responses through normalization and overlay
//! synchronization, observed from the engine side.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ortelius::engine::{ClickEvent, MapEngine, TestEngine};
use ortelius::popup::PopupTemplate;
use ortelius::source::{DatasetQuery, DatasetSource, NearestSource};
use ortelius::style::{CircleStyle, ColorRule};
use ortelius::{
    latlon, Messenger, Notice, Overlay, OrteliusError, PipelineBuilder, SyncOutcome,
};
use ortelius_types::{GeoPoint2d, RawCollection};
use serde_json::json;

struct StaticDataset(serde_json::Value);

#[async_trait]
impl DatasetSource for StaticDataset {
    async fn fetch(&self, _query: &DatasetQuery) -> Result<RawCollection, OrteliusError> {
        Ok(serde_json::from_value(self.0.clone()).expect("payload must deserialize"))
    }
}

struct StaticNearest(serde_json::Value);

#[async_trait]
impl NearestSource for StaticNearest {
    async fn nearest(
        &self,
        _origin: GeoPoint2d,
        _count: u32,
    ) -> Result<RawCollection, OrteliusError> {
        Ok(serde_json::from_value(self.0.clone()).expect("rows must deserialize"))
    }
}

#[derive(Default)]
struct CollectingMessenger(Mutex<Vec<Notice>>);

impl Messenger for CollectingMessenger {
    fn notice(&self, notice: &Notice) {
        self.0.lock().expect("lock is poisoned").push(notice.clone());
    }
}

fn restaurant_overlay() -> Overlay {
    Overlay::new(
        "restaurants",
        CircleStyle::default(),
        PopupTemplate::restaurant(),
    )
}

fn inspection_overlay() -> Overlay {
    Overlay::new(
        "inspections",
        CircleStyle::new(ColorRule::seating_choice()),
        PopupTemplate::restaurant(),
    )
}

#[tokio::test]
async fn dataset_with_string_coordinates_lands_on_the_map() {
    let pipeline = PipelineBuilder::default()
        .with_dataset(
            StaticDataset(json!({
                "type": "FeatureCollection",
                "features": [
                    { "properties": { "longitude": "-73.9", "latitude": "40.7", "dba": "Al's Pizza" } }
                ]
            })),
            DatasetQuery::new().with_filter("cuisine_description", "Pizza"),
            restaurant_overlay(),
        )
        .build();

    let mut engine = TestEngine::new();
    let outcome = pipeline
        .load_dataset(&mut engine)
        .await
        .expect("load succeeds");

    assert_eq!(outcome, SyncOutcome::Synced(1));
    assert_eq!(engine.layer_count("restaurants-layer"), 1);
    assert_eq!(engine.handler_count("restaurants-layer"), 1);

    let collection = engine.source_data("restaurants").expect("source exists");
    assert_eq!(collection.features()[0].position(), latlon!(40.7, -73.9));
}

#[tokio::test]
async fn invalid_dataset_triggers_the_empty_result_path() {
    let messenger = Arc::new(CollectingMessenger::default());
    let pipeline = PipelineBuilder::default()
        .with_dataset(
            StaticDataset(json!({
                "type": "FeatureCollection",
                "features": [
                    { "properties": { "longitude": "n/a", "latitude": "40.7" } }
                ]
            })),
            DatasetQuery::new(),
            restaurant_overlay(),
        )
        .with_messenger(messenger.clone())
        .build();

    let mut engine = TestEngine::new();
    let outcome = pipeline
        .load_dataset(&mut engine)
        .await
        .expect("empty result is not an error");

    assert_eq!(outcome, SyncOutcome::Empty);
    assert!(!engine.has_source("restaurants"));
    assert_eq!(
        *messenger.0.lock().expect("lock is poisoned"),
        vec![Notice::EmptyResult {
            overlay: "restaurants".into()
        }]
    );
}

#[tokio::test]
async fn nearest_query_rows_become_clickable_markers() {
    let pipeline = PipelineBuilder::default()
        .with_nearest(
            StaticNearest(json!([
                { "long": -73.95, "lat": 40.71, "seating_choice": "Outdoor", "dist_meters": 120.4 }
            ])),
            1000,
            inspection_overlay(),
        )
        .build();

    let mut engine = TestEngine::new();
    let outcome = pipeline
        .handle_map_click(&mut engine, latlon!(40.70491, -73.97144))
        .await
        .expect("query succeeds");

    assert_eq!(outcome, SyncOutcome::Synced(1));

    let collection = engine
        .source_data("inspections")
        .expect("source exists")
        .clone();
    let feature = collection.features()[0].clone();
    assert_eq!(feature.position(), latlon!(40.71, -73.95));

    engine.click(
        "inspections-layer",
        &ClickEvent {
            position: feature.position(),
            feature,
        },
    );

    assert_eq!(engine.popups().len(), 1);
    let html = &engine.popups()[0].html;
    assert!(html.contains("Outdoor"), "popup shows seating: {html}");
    assert!(html.contains("120 m"), "popup shows distance: {html}");
}

#[tokio::test]
async fn sequential_queries_replace_overlay_data_in_place() {
    let mut engine = TestEngine::new();

    let first = PipelineBuilder::default()
        .with_nearest(
            StaticNearest(json!([
                { "long": -73.95, "lat": 40.71, "dba": "Corner Slice" }
            ])),
            1000,
            inspection_overlay(),
        )
        .build();
    first
        .handle_map_click(&mut engine, latlon!(40.7, -73.9))
        .await
        .expect("first query succeeds");

    let second = PipelineBuilder::default()
        .with_nearest(
            StaticNearest(json!([
                { "long": -73.99, "lat": 40.73, "dba": "Lucali" },
                { "long": -73.98, "lat": 40.72, "dba": "Juliana's" }
            ])),
            1000,
            inspection_overlay(),
        )
        .build();
    second
        .handle_map_click(&mut engine, latlon!(40.72, -73.98))
        .await
        .expect("second query succeeds");

    assert_eq!(engine.layer_count("inspections-layer"), 1);
    assert_eq!(engine.handler_count("inspections-layer"), 1);

    let collection = engine.source_data("inspections").expect("source exists");
    assert_eq!(collection.len(), 2, "second collection is displayed");
    assert_eq!(
        collection.features()[0].property("dba"),
        Some(&json!("Lucali"))
    );
}
