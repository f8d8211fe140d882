use serde::{Deserialize, Serialize};

/// 2d point on the surface of the Earth in WGS84 coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint2d {
    /// Creates a new point from latitude and longitude values (in degrees).
    pub fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Returns the point as a GeoJSON position: `[lon, lat]`.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Returns true if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Returns true if the point lies within the valid WGS84 coordinate
    /// range: latitude in `[-90, 90]`, longitude in `[-180, 180]`.
    ///
    /// Points outside the range are still representable. Whether they are
    /// meaningful is up to the caller.
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Creates a new [`GeoPoint2d`] from latitude and longitude values (in degrees).
///
/// ```
/// use ortelius_types::latlon;
///
/// let point = latlon!(40.70491, -73.97144);
/// assert_eq!(point.lat(), 40.70491);
/// assert_eq!(point.lon(), -73.97144);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        $crate::GeoPoint2d::latlon($lat, $lon)
    };
}
