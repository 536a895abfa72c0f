//! Geographic helpers for node positions and line geometries.
//!
//! Positions are WGS84 points with `x` = longitude and `y` = latitude, as the
//! [`geo`] crate expects for its haversine measures.

use geo::{HaversineDistance, HaversineLength, LineString, Point};

use crate::units::{Kilometres, Metres};

/// Position of a node on the earth's surface (x = longitude, y = latitude).
pub type GeoPosition = Point<f64>;

/// Offset applied to a coordinate that would otherwise collapse a line string
/// onto a single point.
const DEGENERATE_OFFSET_DEG: f64 = 1e-12;

/// Build a position from latitude and longitude in degrees.
pub fn position(lat: f64, lon: f64) -> GeoPosition {
    Point::new(lon, lat)
}

/// Great-circle distance between two positions.
pub fn haversine_distance(a: &GeoPosition, b: &GeoPosition) -> Metres {
    Metres(a.haversine_distance(b))
}

/// Straight two-point line string from `a` to `b`.
///
/// Coinciding end points yield a string whose second coordinate is nudged by
/// a negligible offset, so the geometry never degenerates to a point.
pub fn line_string_between(a: &GeoPosition, b: &GeoPosition) -> LineString<f64> {
    let end = if a == b {
        Point::new(b.x() + DEGENERATE_OFFSET_DEG, b.y() + DEGENERATE_OFFSET_DEG)
    } else {
        *b
    };
    LineString::from(vec![(a.x(), a.y()), (end.x(), end.y())])
}

/// Haversine length of a line string.
pub fn line_length(line_string: &LineString<f64>) -> Kilometres {
    Metres(line_string.haversine_length()).to_kilometres()
}
