//! Ortelius keeps a live map in sync with remote point datasets.
//!
//! Remote geodata is dirty: coordinates arrive missing, malformed, or hidden
//! in flat `longitude`/`latitude` columns, and the same logical field is
//! spelled three different ways by three different services. Ortelius takes
//! such responses and reconciles them onto a map overlay with stable
//! identity, valid geometry, and click-to-popup interaction:
//!
//! * [`normalize`] repairs a raw response into a
//!   [`FeatureCollection`](ortelius_types::FeatureCollection) whose every
//!   feature has finite point coordinates, dropping what cannot be repaired;
//! * [`Overlay`] owns one named source+layer+popup binding on the map,
//!   creating it on first sync and replacing its data in place afterwards;
//! * [`SyncPipeline`] composes sources, normalization and overlays into the
//!   two flows a map page needs: load a dataset on startup, query the
//!   nearest records when the user clicks the map.
//!
//! The map itself is behind the [`engine::MapEngine`] trait: Ortelius drives
//! any engine that can register sources and layers, dispatch layer clicks
//! and show popups.
//!
//! # Quick start
//!
//! ```no_run
//! use ortelius::engine::TestEngine;
//! use ortelius::popup::PopupTemplate;
//! use ortelius::source::{DatasetClient, DatasetQuery, NearestClient};
//! use ortelius::style::{CircleStyle, ColorRule};
//! use ortelius::{latlon, Overlay, PipelineBuilder};
//!
//! # tokio_test::block_on(async {
//! let dataset = DatasetClient::new(
//!     "https://data.cityofnewyork.us/resource/43nn-pn8j.geojson",
//! )?;
//! let nearest = NearestClient::new(
//!     "https://example.supabase.co/rest/v1/rpc/find_nearest_n_restaurants",
//! )?
//! .with_credential("anon-key");
//!
//! let pipeline = PipelineBuilder::default()
//!     .with_dataset(
//!         dataset,
//!         DatasetQuery::new()
//!             .with_filter("cuisine_description", "Pizza")
//!             .with_limit(10_000),
//!         Overlay::new(
//!             "restaurants",
//!             CircleStyle::default(),
//!             PopupTemplate::restaurant(),
//!         ),
//!     )
//!     .with_nearest(
//!         nearest,
//!         1000,
//!         Overlay::new(
//!             "inspections",
//!             CircleStyle::new(ColorRule::seating_choice()),
//!             PopupTemplate::restaurant(),
//!         ),
//!     )
//!     .build();
//!
//! // In a real application the engine drives an actual map renderer.
//! let mut engine = TestEngine::new();
//!
//! // Initial load, then a nearest-neighbor query around a map click.
//! pipeline.load_dataset(&mut engine).await?;
//! pipeline
//!     .handle_map_click(&mut engine, latlon!(40.70491, -73.97144))
//!     .await?;
//! # Ok::<(), ortelius::OrteliusError>(())
//! # });
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod color;
pub mod engine;
pub mod error;
pub mod messenger;
pub mod normalize;
pub mod overlay;
pub mod pipeline;
pub mod popup;
pub mod source;
pub mod style;

pub use color::Color;
pub use engine::{ClickEvent, ClickHandler, MapEngine, Popup};
pub use error::OrteliusError;
pub use messenger::{DummyMessenger, Messenger, Notice};
pub use normalize::normalize;
pub use overlay::Overlay;
pub use pipeline::{PipelineBuilder, SyncOutcome, SyncPipeline};
pub use popup::{FieldFormat, FieldSpec, PopupTemplate};
pub use style::{CircleStyle, ColorRule, LayerSpec};

// Reexport ortelius_types
pub use ortelius_types;
pub use ortelius_types::latlon;
