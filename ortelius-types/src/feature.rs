use serde_json::{Map, Value};

use crate::GeoPoint2d;

/// One point entity on the map: a geometry plus opaque properties.
///
/// A `Feature` always carries finite coordinates. The normalization pass is
/// the only place where features are created from untrusted data, so
/// everything downstream can rely on the geometry being usable.
///
/// Properties are pass-through data. The crate does not interpret them beyond
/// a few display fields which are read defensively through
/// [`Feature::first_property`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    position: GeoPoint2d,
    properties: Map<String, Value>,
}

impl Feature {
    /// Creates a new feature at the given position.
    pub fn new(position: GeoPoint2d, properties: Map<String, Value>) -> Self {
        debug_assert!(position.is_finite());
        Self {
            position,
            properties,
        }
    }

    /// Position of the feature.
    pub fn position(&self) -> GeoPoint2d {
        self.position
    }

    /// All properties of the feature.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Returns the value of the property `key`, if present and not null.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|value| !value.is_null())
    }

    /// Returns the value of the first present, non-null property among the
    /// ordered candidate `keys`.
    ///
    /// Remote services spell the same logical field differently
    /// (`name` vs `RestaurantName`, `longitude` vs `long`). Callers list the
    /// spellings they are prepared to see, most likely first.
    ///
    /// ```
    /// use ortelius_types::{latlon, Feature};
    /// use serde_json::{json, Map};
    ///
    /// let mut properties = Map::new();
    /// properties.insert("RestaurantName".into(), json!("Al's Pizza"));
    ///
    /// let feature = Feature::new(latlon!(40.7, -73.9), properties);
    /// let name = feature.first_property(&["name", "RestaurantName", "dba"]);
    /// assert_eq!(name, Some(&json!("Al's Pizza")));
    /// ```
    pub fn first_property(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.property(key))
    }
}

impl From<&Feature> for geojson::Feature {
    fn from(feature: &Feature) -> Self {
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(
                feature.position.lon_lat().to_vec(),
            ))),
            id: None,
            properties: Some(feature.properties.clone()),
            foreign_members: None,
        }
    }
}

/// An ordered sequence of [`Feature`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection(Vec<Feature>);

impl FeatureCollection {
    /// Creates a collection from the given features.
    pub fn new(features: Vec<Feature>) -> Self {
        Self(features)
    }

    /// The features of the collection, in order.
    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    /// Number of features in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the collection contains no features.
    ///
    /// An empty collection is a valid value, distinct from "not yet loaded".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the features of the collection.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.0.iter()
    }

    /// Converts the collection into the type-tagged GeoJSON wire shape.
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        self.into()
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self(features)
    }
}

impl From<&FeatureCollection> for geojson::FeatureCollection {
    fn from(collection: &FeatureCollection) -> Self {
        geojson::FeatureCollection {
            bbox: None,
            features: collection.iter().map(Into::into).collect(),
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::latlon;

    fn test_feature() -> Feature {
        let mut properties = Map::new();
        properties.insert("dba".into(), json!("Al's Pizza"));
        properties.insert("grade".into(), Value::Null);
        Feature::new(latlon!(40.7, -73.9), properties)
    }

    #[test]
    fn property_skips_null_values() {
        let feature = test_feature();
        assert_eq!(feature.property("dba"), Some(&json!("Al's Pizza")));
        assert_eq!(feature.property("grade"), None);
        assert_eq!(feature.property("boro"), None);
    }

    #[test]
    fn first_property_respects_candidate_order() {
        let feature = test_feature();
        assert_eq!(
            feature.first_property(&["name", "dba"]),
            Some(&json!("Al's Pizza"))
        );
        assert_eq!(feature.first_property(&["grade", "name"]), None);
    }

    #[test]
    fn to_geojson_produces_tagged_point_features() {
        let collection = FeatureCollection::new(vec![test_feature()]);
        let geojson = collection.to_geojson();

        assert_eq!(geojson.features.len(), 1);
        let geometry = geojson.features[0]
            .geometry
            .as_ref()
            .expect("point geometry must be present");
        assert_eq!(geometry.value, geojson::Value::Point(vec![-73.9, 40.7]));

        let serialized = serde_json::to_value(&geojson).expect("serializable");
        assert_eq!(serialized["type"], json!("FeatureCollection"));
        assert_eq!(serialized["features"][0]["type"], json!("Feature"));
    }

    #[test]
    fn empty_collection_is_valid() {
        let collection = FeatureCollection::default();
        assert!(collection.is_empty());
        assert_eq!(collection.to_geojson().features.len(), 0);
    }
}
