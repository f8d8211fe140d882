//! Data model shared by the Ortelius crates.
//!
//! This crate defines the types that flow through an overlay synchronization
//! pipeline:
//!
//! * [`GeoPoint2d`] - a geographic point in WGS84 coordinates;
//! * [`RawRecord`] and [`RawCollection`] - records as they arrive from remote
//!   services, with possibly missing or malformed geometry;
//! * [`Feature`] and [`FeatureCollection`] - repaired records that are
//!   guaranteed to carry a valid point geometry.
//!
//! The boundary between the raw and the repaired world is the
//! [`RecordGeometry`] resolution: every raw record can tell whether it carries
//! a usable geometry, whether one can be rebuilt from its flat coordinate
//! fields, or whether it must be dropped.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod feature;
mod point;
mod raw;

pub use feature::{Feature, FeatureCollection};
pub use point::GeoPoint2d;
pub use raw::{
    coerce_finite, RawCollection, RawRecord, RecordGeometry, LATITUDE_KEYS, LONGITUDE_KEYS,
};
