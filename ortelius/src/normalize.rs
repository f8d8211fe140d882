//! Repair pass converting raw service responses into valid feature
//! collections.

use log::{debug, warn};
use ortelius_types::{Feature, FeatureCollection, RawCollection, RecordGeometry};

/// Normalizes a raw response into a collection of features with guaranteed
/// finite point geometry.
///
/// Per record, in order: a geometry whose coordinate pair coerces to two
/// finite numbers is accepted unchanged; otherwise the point is rebuilt from
/// flat longitude/latitude fields; records where neither path succeeds are
/// dropped. Never fails: an unrecoverable record costs one entry of the
/// output, not the whole pipeline.
///
/// The output may be empty. That is a valid result; whether it warrants a
/// user notice is the caller's decision.
///
/// Coordinate range is not validated: a record with latitude 91 or swapped
/// coordinates passes through (with a warning), matching what the upstream
/// services themselves accept.
///
/// ```
/// use ortelius::normalize;
/// use ortelius_types::RawCollection;
///
/// let payload = serde_json::json!({
///     "type": "FeatureCollection",
///     "features": [
///         { "properties": { "longitude": "-73.9", "latitude": "40.7" } },
///         { "properties": { "longitude": "n/a", "latitude": "40.7" } },
///     ]
/// });
/// let raw: RawCollection = serde_json::from_value(payload).unwrap();
///
/// let collection = normalize(raw);
/// assert_eq!(collection.len(), 1);
/// assert_eq!(collection.features()[0].position().lon_lat(), [-73.9, 40.7]);
/// ```
pub fn normalize(raw: RawCollection) -> FeatureCollection {
    let total = raw.features.len();
    let mut features = Vec::with_capacity(total);

    for record in raw.features {
        let (geometry, properties) = record.into_parts();
        let point = match geometry {
            RecordGeometry::Embedded(point) | RecordGeometry::Flat(point) => point,
            RecordGeometry::Missing => continue,
        };

        if !point.is_in_range() {
            warn!(
                "keeping record with out-of-range coordinates: lat {}, lon {}",
                point.lat(),
                point.lon()
            );
        }

        features.push(Feature::new(point, properties));
    }

    if features.len() < total {
        debug!(
            "dropped {} of {total} records without usable coordinates",
            total - features.len()
        );
    }

    FeatureCollection::new(features)
}
