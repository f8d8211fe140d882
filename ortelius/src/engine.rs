//! The capability interface through which overlays drive a map engine.
//!
//! The crate does not render anything itself. It assumes a map engine
//! (MapLibre behind FFI, a native renderer, a test double) that exposes the
//! small set of operations overlay synchronization needs: named GeoJSON-like
//! data sources, styled layers bound to a source, layer-scoped click
//! handlers and anchored popups. [`MapEngine`] is that set, and nothing more.

use ortelius_types::{Feature, FeatureCollection, GeoPoint2d};

use crate::error::OrteliusError;
use crate::style::LayerSpec;

/// A click on a rendered overlay layer, as delivered by the map engine.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    /// Geographic position of the pointer at the time of the click.
    pub position: GeoPoint2d,
    /// The topmost feature of the layer under the pointer.
    pub feature: Feature,
}

/// A detail popup anchored to a geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// Anchor position of the popup.
    pub position: GeoPoint2d,
    /// HTML content of the popup.
    pub html: String,
}

/// Handler invoked by the engine when a layer is clicked.
///
/// Returning `Some` asks the engine to display the popup; `None` leaves the
/// map untouched.
pub type ClickHandler = Box<dyn Fn(&ClickEvent) -> Option<Popup> + Send + Sync>;

/// The set of map engine capabilities overlay synchronization depends on.
///
/// Implementations are expected to reject duplicate registrations: adding a
/// source or layer under an id that already exists is an error, not a
/// replacement. The synchronizer relies on this to catch accidental
/// double-registration, which would otherwise duplicate click handlers.
pub trait MapEngine {
    /// Registers a new data source under `key`.
    fn add_source(
        &mut self,
        key: &str,
        collection: &FeatureCollection,
    ) -> Result<(), OrteliusError>;

    /// Returns true if a source with `key` is registered.
    fn has_source(&self, key: &str) -> bool;

    /// Replaces the data of the existing source `key`.
    fn set_source_data(
        &mut self,
        key: &str,
        collection: &FeatureCollection,
    ) -> Result<(), OrteliusError>;

    /// Registers a new visual layer.
    fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), OrteliusError>;

    /// Registers a click handler scoped to the layer `layer_id`.
    fn on_layer_click(
        &mut self,
        layer_id: &str,
        handler: ClickHandler,
    ) -> Result<(), OrteliusError>;

    /// Displays a popup on the map.
    fn show_popup(&mut self, popup: &Popup) -> Result<(), OrteliusError>;
}

/// Used for doc-tests and as a test double for engine-driving code.
#[cfg(feature = "_tests")]
pub use test_engine::TestEngine;

#[cfg(feature = "_tests")]
mod test_engine {
    use std::collections::HashMap;

    use super::*;

    /// In-memory [`MapEngine`] that records every operation.
    ///
    /// ```
    /// use ortelius::engine::{MapEngine, TestEngine};
    /// use ortelius_types::FeatureCollection;
    ///
    /// let mut engine = TestEngine::new();
    /// engine.add_source("restaurants", &FeatureCollection::default()).unwrap();
    /// assert!(engine.has_source("restaurants"));
    /// ```
    #[derive(Default)]
    pub struct TestEngine {
        sources: HashMap<String, FeatureCollection>,
        layers: Vec<LayerSpec>,
        handlers: HashMap<String, Vec<ClickHandler>>,
        popups: Vec<Popup>,
    }

    impl TestEngine {
        /// Creates an empty engine.
        pub fn new() -> Self {
            Self::default()
        }

        /// Data currently held by the source `key`.
        pub fn source_data(&self, key: &str) -> Option<&FeatureCollection> {
            self.sources.get(key)
        }

        /// Number of registered layers with the given id.
        pub fn layer_count(&self, layer_id: &str) -> usize {
            self.layers
                .iter()
                .filter(|layer| layer.id == layer_id)
                .count()
        }

        /// The registered layer with the given id, if any.
        pub fn layer(&self, layer_id: &str) -> Option<&LayerSpec> {
            self.layers.iter().find(|layer| layer.id == layer_id)
        }

        /// Number of click handlers registered for the given layer.
        pub fn handler_count(&self, layer_id: &str) -> usize {
            self.handlers.get(layer_id).map_or(0, Vec::len)
        }

        /// Popups displayed so far, in display order.
        pub fn popups(&self) -> &[Popup] {
            &self.popups
        }

        /// Simulates a click on the layer `layer_id`, dispatching the event
        /// to every registered handler and displaying the popups they
        /// produce.
        pub fn click(&mut self, layer_id: &str, event: &ClickEvent) {
            let popups: Vec<Popup> = self
                .handlers
                .get(layer_id)
                .into_iter()
                .flatten()
                .filter_map(|handler| handler(event))
                .collect();

            for popup in popups {
                self.popups.push(popup);
            }
        }
    }

    impl MapEngine for TestEngine {
        fn add_source(
            &mut self,
            key: &str,
            collection: &FeatureCollection,
        ) -> Result<(), OrteliusError> {
            if self.sources.contains_key(key) {
                return Err(OrteliusError::Generic(format!(
                    "source '{key}' already exists"
                )));
            }

            self.sources.insert(key.into(), collection.clone());
            Ok(())
        }

        fn has_source(&self, key: &str) -> bool {
            self.sources.contains_key(key)
        }

        fn set_source_data(
            &mut self,
            key: &str,
            collection: &FeatureCollection,
        ) -> Result<(), OrteliusError> {
            match self.sources.get_mut(key) {
                Some(data) => {
                    *data = collection.clone();
                    Ok(())
                }
                None => Err(OrteliusError::Generic(format!(
                    "source '{key}' does not exist"
                ))),
            }
        }

        fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), OrteliusError> {
            if self.layers.iter().any(|layer| layer.id == spec.id) {
                return Err(OrteliusError::Generic(format!(
                    "layer '{}' already exists",
                    spec.id
                )));
            }

            self.layers.push(spec.clone());
            Ok(())
        }

        fn on_layer_click(
            &mut self,
            layer_id: &str,
            handler: ClickHandler,
        ) -> Result<(), OrteliusError> {
            self.handlers.entry(layer_id.into()).or_default().push(handler);
            Ok(())
        }

        fn show_popup(&mut self, popup: &Popup) -> Result<(), OrteliusError> {
            self.popups.push(popup.clone());
            Ok(())
        }
    }
}
