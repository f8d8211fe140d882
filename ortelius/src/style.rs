//! Declarative paint specification for overlay marker layers.

use ortelius_types::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Color;

/// How the fill color of overlay markers is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColorRule {
    /// The same color for every feature.
    Fixed(Color),
    /// Categorical match on a property value.
    ///
    /// The first arm whose value equals the feature's property wins;
    /// features without the property, or with an unmatched value, get the
    /// fallback color.
    Match {
        /// Property the arms are matched against.
        property: String,
        /// Pairs of property value and the color to use for it.
        arms: Vec<(String, Color)>,
        /// Color for features no arm matches.
        fallback: Color,
    },
}

impl ColorRule {
    /// The match table used by the restaurant inspection dataset: green for
    /// outdoor seating, blue for indoor, orange for everything else.
    pub fn seating_choice() -> Self {
        ColorRule::Match {
            property: "seating_choice".into(),
            arms: vec![
                ("Outdoor".into(), Color::from_hex("#1AAF54")),
                ("Indoor".into(), Color::from_hex("#3B6ED6")),
            ],
            fallback: Color::from_hex("#FF7800"),
        }
    }

    /// Resolves the fill color for the given feature.
    pub fn resolve(&self, feature: &Feature) -> Color {
        match self {
            ColorRule::Fixed(color) => *color,
            ColorRule::Match {
                property,
                arms,
                fallback,
            } => {
                let value = feature.property(property).and_then(Value::as_str);
                arms.iter()
                    .find(|(arm, _)| Some(arm.as_str()) == value)
                    .map(|(_, color)| *color)
                    .unwrap_or(*fallback)
            }
        }
    }
}

/// Paint specification for a circle marker layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleStyle {
    /// Marker radius in pixels.
    pub radius: f64,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Stroke color.
    pub stroke_color: Color,
    /// Fill color rule.
    pub color: ColorRule,
}

impl CircleStyle {
    /// Creates a style with the given fill rule and the default marker
    /// geometry: radius 6, white stroke of width 2.
    pub fn new(color: ColorRule) -> Self {
        Self {
            radius: 6.0,
            stroke_width: 2.0,
            stroke_color: Color::WHITE,
            color,
        }
    }

    /// Sets the marker radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the stroke width.
    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    /// Sets the stroke color.
    pub fn with_stroke_color(mut self, stroke_color: Color) -> Self {
        self.stroke_color = stroke_color;
        self
    }
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self::new(ColorRule::Fixed(Color::from_hex("#FF7800")))
    }
}

/// Declarative specification of a visual layer bound to a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Identifier of the layer, unique within the map.
    pub id: String,
    /// Key of the data source the layer renders.
    pub source: String,
    /// Paint specification.
    pub style: CircleStyle,
}

impl LayerSpec {
    /// Creates the layer specification for an overlay with the given source
    /// key. The layer id is derived from the key.
    pub fn for_overlay(key: &str, style: CircleStyle) -> Self {
        Self {
            id: format!("{key}-layer"),
            source: key.into(),
            style,
        }
    }
}
