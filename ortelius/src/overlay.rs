//! Reconciliation of feature collections onto named map overlays.

use log::debug;
use ortelius_types::FeatureCollection;

use crate::engine::{MapEngine, Popup};
use crate::error::OrteliusError;
use crate::popup::PopupTemplate;
use crate::style::{CircleStyle, LayerSpec};

/// A named binding between a feature collection and a visual map layer.
///
/// An overlay owns one source key on the map. The first [`Overlay::sync`]
/// call registers the source, its layer and its click interaction; every
/// later call only replaces the source data. An overlay is never torn down
/// by this crate; removing layers is the embedding application's business.
///
/// ```
/// use ortelius::engine::TestEngine;
/// use ortelius::popup::PopupTemplate;
/// use ortelius::style::{CircleStyle, ColorRule};
/// use ortelius::Overlay;
/// use ortelius_types::FeatureCollection;
///
/// let overlay = Overlay::new(
///     "restaurants",
///     CircleStyle::new(ColorRule::seating_choice()),
///     PopupTemplate::restaurant(),
/// );
///
/// let mut engine = TestEngine::new();
/// let collection = FeatureCollection::default();
///
/// overlay.sync(&mut engine, &collection).unwrap();
/// overlay.sync(&mut engine, &collection).unwrap();
///
/// // However often the overlay syncs, the layer exists exactly once.
/// assert_eq!(engine.layer_count("restaurants-layer"), 1);
/// assert_eq!(engine.handler_count("restaurants-layer"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Overlay {
    key: String,
    style: CircleStyle,
    popup: PopupTemplate,
}

impl Overlay {
    /// Creates an overlay bound to the source key `key`.
    pub fn new(key: impl Into<String>, style: CircleStyle, popup: PopupTemplate) -> Self {
        Self {
            key: key.into(),
            style,
            popup,
        }
    }

    /// Key of the overlay's data source on the map.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Identifier of the overlay's visual layer.
    pub fn layer_id(&self) -> String {
        format!("{}-layer", self.key)
    }

    /// Reconciles `collection` onto the map.
    ///
    /// If the overlay's source does not exist yet, the source, the layer and
    /// the click-to-popup handler are registered; otherwise only the source
    /// data is replaced. Re-registering on update would stack duplicate
    /// click handlers on the layer, so creation happens at most once per key
    /// for the lifetime of the engine.
    pub fn sync(
        &self,
        engine: &mut dyn MapEngine,
        collection: &FeatureCollection,
    ) -> Result<(), OrteliusError> {
        if engine.has_source(&self.key) {
            debug!(
                "updating overlay '{}' with {} features",
                self.key,
                collection.len()
            );
            return engine.set_source_data(&self.key, collection);
        }

        debug!(
            "creating overlay '{}' with {} features",
            self.key,
            collection.len()
        );
        engine.add_source(&self.key, collection)?;
        engine.add_layer(&LayerSpec::for_overlay(&self.key, self.style.clone()))?;

        let template = self.popup.clone();
        engine.on_layer_click(
            &self.layer_id(),
            Box::new(move |event| {
                Some(Popup {
                    position: event.feature.position(),
                    html: template.render(&event.feature),
                })
            }),
        )
    }
}
