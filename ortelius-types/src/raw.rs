use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};

use crate::{Feature, FeatureCollection, GeoPoint2d};

/// Flat property keys that may carry a longitude value, in priority order.
///
/// Covers the spellings used by the supported services: open-data datasets
/// expose `longitude`, nearest-neighbor RPC rows expose `long`.
pub const LONGITUDE_KEYS: &[&str] = &["longitude", "lon", "lng", "long"];

/// Flat property keys that may carry a latitude value, in priority order.
pub const LATITUDE_KEYS: &[&str] = &["latitude", "lat"];

/// A record as it arrived from a remote service, before normalization.
///
/// The geometry, if present at all, is kept as an uninterpreted JSON value:
/// upstream data routinely carries missing coordinates, coordinates encoded
/// as strings, or no geometry member whatsoever. [`RawRecord::resolve_geometry`]
/// decides what, if anything, can be made of it.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    geometry: Option<Value>,
    properties: Map<String, Value>,
}

/// Geometry resolution for a single raw record.
///
/// This is the explicit outcome of the duck-typed shapes the remote services
/// produce: a record either carries a usable point geometry, allows one to be
/// rebuilt from flat coordinate fields, or has no usable position at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordGeometry {
    /// The record carried a point geometry whose coordinate pair consists of
    /// two finite numbers. The geometry is accepted unchanged.
    Embedded(GeoPoint2d),
    /// The geometry was reconstructed from flat longitude/latitude fields.
    Flat(GeoPoint2d),
    /// Neither path yields two finite numbers. The record is invalid.
    Missing,
}

impl RawRecord {
    /// Creates a record from a wire geometry value and properties.
    pub fn new(geometry: Option<Value>, properties: Map<String, Value>) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Creates a record that has no geometry member, only flat properties.
    ///
    /// This is the shape nearest-neighbor RPC rows arrive in.
    pub fn from_properties(properties: Map<String, Value>) -> Self {
        Self {
            geometry: None,
            properties,
        }
    }

    /// Properties of the record.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Resolves the usable geometry of the record.
    ///
    /// The embedded geometry wins if its coordinate pair coerces to two
    /// finite numbers; otherwise a point is rebuilt from the flat
    /// longitude/latitude fields listed in [`LONGITUDE_KEYS`] and
    /// [`LATITUDE_KEYS`]. Coordinate range is not checked here.
    ///
    /// ```
    /// use ortelius_types::{RawRecord, RecordGeometry, latlon};
    /// use serde_json::{json, Map};
    ///
    /// let mut properties = Map::new();
    /// properties.insert("longitude".into(), json!("-73.9"));
    /// properties.insert("latitude".into(), json!("40.7"));
    ///
    /// let record = RawRecord::from_properties(properties);
    /// assert_eq!(
    ///     record.resolve_geometry(),
    ///     RecordGeometry::Flat(latlon!(40.7, -73.9))
    /// );
    /// ```
    pub fn resolve_geometry(&self) -> RecordGeometry {
        if let Some(point) = self.embedded_point() {
            return RecordGeometry::Embedded(point);
        }
        if let Some(point) = self.flat_point() {
            return RecordGeometry::Flat(point);
        }
        RecordGeometry::Missing
    }

    /// Resolves the geometry and returns it together with the properties,
    /// consuming the record.
    pub fn into_parts(self) -> (RecordGeometry, Map<String, Value>) {
        (self.resolve_geometry(), self.properties)
    }

    fn embedded_point(&self) -> Option<GeoPoint2d> {
        let coordinates = self.geometry.as_ref()?.get("coordinates")?.as_array()?;
        if coordinates.len() != 2 {
            return None;
        }

        let lon = coerce_finite(&coordinates[0])?;
        let lat = coerce_finite(&coordinates[1])?;
        Some(GeoPoint2d::latlon(lat, lon))
    }

    fn flat_point(&self) -> Option<GeoPoint2d> {
        let first_of = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| self.properties.get(*key))
                .and_then(coerce_finite)
        };

        let lon = first_of(LONGITUDE_KEYS)?;
        let lat = first_of(LATITUDE_KEYS)?;
        Some(GeoPoint2d::latlon(lat, lon))
    }
}

/// Coerces a JSON value to a finite number.
///
/// Accepts numbers and numeric strings. Non-numeric strings are invalid, not
/// zero; so are nulls, booleans and composite values.
pub fn coerce_finite(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(string) => string.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// A sequence of raw records, as returned by a remote service.
///
/// Deserializes from either of the two wire shapes the supported services
/// produce: a GeoJSON-style `{"type": "FeatureCollection", "features": [..]}`
/// object, or a bare array of flat row objects.
#[derive(Debug, Clone, Default)]
pub struct RawCollection {
    /// The records of the collection, in response order.
    pub features: Vec<RawRecord>,
}

impl RawCollection {
    /// Creates a collection from flat row objects, as returned by
    /// nearest-neighbor queries.
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        Self {
            features: rows.into_iter().map(RawRecord::from_properties).collect(),
        }
    }
}

// Anything that is not an object has no usable content; such records
// resolve to Missing and get dropped by normalization.
fn record_from_value(value: Value) -> RawRecord {
    let Value::Object(mut object) = value else {
        return RawRecord::default();
    };

    let geometry = object.remove("geometry").filter(|value| !value.is_null());
    let properties = match object.remove("properties") {
        Some(Value::Object(properties)) => properties,
        _ => Map::new(),
    };

    RawRecord::new(geometry, properties)
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(record_from_value(Value::deserialize(deserializer)?))
    }
}

impl<'de> Deserialize<'de> for RawCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            // GeoJSON-style payload; a missing or malformed `features`
            // member is an empty collection.
            Value::Object(mut object) => {
                let features = match object.remove("features") {
                    Some(Value::Array(items)) => {
                        items.into_iter().map(record_from_value).collect()
                    }
                    _ => Vec::new(),
                };
                Ok(RawCollection { features })
            }
            // Bare array of flat rows, as returned by RPC endpoints.
            Value::Array(items) => Ok(RawCollection {
                features: items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(row) => RawRecord::from_properties(row),
                        _ => RawRecord::default(),
                    })
                    .collect(),
            }),
            _ => Err(serde::de::Error::custom(
                "expected a feature collection object or an array of rows",
            )),
        }
    }
}

impl From<&Feature> for RawRecord {
    fn from(feature: &Feature) -> Self {
        RawRecord::new(
            Some(json!({
                "type": "Point",
                "coordinates": feature.position().lon_lat(),
            })),
            feature.properties().clone(),
        )
    }
}

impl From<&FeatureCollection> for RawCollection {
    fn from(collection: &FeatureCollection) -> Self {
        Self {
            features: collection.iter().map(Into::into).collect(),
        }
    }
}
