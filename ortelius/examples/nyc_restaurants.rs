//! Fetches NYC pizza restaurant inspections from the open-data API and syncs
//! them onto a map engine that logs every operation it is asked to perform.
//!
//! Run with `cargo run --example nyc_restaurants`.

use std::collections::HashSet;

use anyhow::Result;
use ortelius::engine::{ClickHandler, MapEngine, Popup};
use ortelius::popup::PopupTemplate;
use ortelius::source::{DatasetClient, DatasetQuery};
use ortelius::style::{CircleStyle, LayerSpec};
use ortelius::{Overlay, OrteliusError, PipelineBuilder};
use ortelius_types::FeatureCollection;

/// Engine that logs the operations a renderer would perform.
#[derive(Default)]
struct LogEngine {
    sources: HashSet<String>,
}

impl MapEngine for LogEngine {
    fn add_source(
        &mut self,
        key: &str,
        collection: &FeatureCollection,
    ) -> Result<(), OrteliusError> {
        log::info!("add_source '{key}' with {} features", collection.len());
        self.sources.insert(key.into());
        Ok(())
    }

    fn has_source(&self, key: &str) -> bool {
        self.sources.contains(key)
    }

    fn set_source_data(
        &mut self,
        key: &str,
        collection: &FeatureCollection,
    ) -> Result<(), OrteliusError> {
        log::info!("set_source_data '{key}' with {} features", collection.len());
        Ok(())
    }

    fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), OrteliusError> {
        log::info!("add_layer '{}' over source '{}'", spec.id, spec.source);
        Ok(())
    }

    fn on_layer_click(
        &mut self,
        layer_id: &str,
        _handler: ClickHandler,
    ) -> Result<(), OrteliusError> {
        log::info!("on_layer_click '{layer_id}'");
        Ok(())
    }

    fn show_popup(&mut self, popup: &Popup) -> Result<(), OrteliusError> {
        log::info!(
            "show_popup at ({}, {}): {}",
            popup.position.lat(),
            popup.position.lon(),
            popup.html
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dataset = DatasetClient::new("https://data.cityofnewyork.us/resource/43nn-pn8j.geojson")?;
    let query = DatasetQuery::new()
        .with_filter("cuisine_description", "Pizza")
        .with_limit(10_000);
    let overlay = Overlay::new(
        "restaurants",
        CircleStyle::default(),
        PopupTemplate::restaurant(),
    );

    let pipeline = PipelineBuilder::default()
        .with_dataset(dataset, query, overlay)
        .build();

    let mut engine = LogEngine::default();
    let outcome = pipeline.load_dataset(&mut engine).await?;
    log::info!("initial load finished: {outcome:?}");

    Ok(())
}
