//! Geo selection values
//!
//!     The `geo_*` operators take coordinates packed into a string:
//!
//!         geo_box       "lat,lng:lat,lng"        north-west and south-east corners
//!         geo_radius    "lat,lng:km"             center and radius in kilometers
//!         geo_polygon   "lat,lng:lat,lng:..."    at least three vertices
//!
//!     Box corners may be given in any order; they are normalized to north-west and
//!     south-east when parsed.

use serde::Serialize;
use std::fmt;
use std::num::ParseFloatError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoShape {
    Box,
    Radius,
    Polygon,
}

impl GeoShape {
    /// Shape edited for the arguments of `operator`, matched case-insensitively.
    pub fn for_operator(operator: &str) -> Option<Self> {
        match operator.to_ascii_lowercase().as_str() {
            "geo_box" => Some(GeoShape::Box),
            "geo_radius" => Some(GeoShape::Radius),
            "geo_polygon" => Some(GeoShape::Polygon),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GeoShape::Box => "box",
            GeoShape::Radius => "radius",
            GeoShape::Polygon => "polygon",
        }
    }
}

impl fmt::Display for GeoShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GeoValueError {
    #[error("{shape} value needs {expected} `:` separated parts, found {found}")]
    PartCount {
        shape: GeoShape,
        expected: &'static str,
        found: usize,
    },
    #[error("expected `lat,lng`, found `{0}`")]
    Coordinate(String),
    #[error("invalid number `{value}`")]
    Number {
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),
    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
    #[error("radius must be a positive number of kilometers, found {0}")]
    Radius(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoValueError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoValueError::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoValueError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    fn parse(text: &str) -> Result<Self, GeoValueError> {
        let (lat, lng) = text
            .split_once(',')
            .ok_or_else(|| GeoValueError::Coordinate(text.to_string()))?;
        if lng.contains(',') {
            return Err(GeoValueError::Coordinate(text.to_string()));
        }
        Self::new(parse_number(lat)?, parse_number(lng)?)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

fn parse_number(text: &str) -> Result<f64, GeoValueError> {
    let text = text.trim();
    text.parse::<f64>().map_err(|source| GeoValueError::Number {
        value: text.to_string(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum GeoValue {
    Box {
        north_west: GeoPoint,
        south_east: GeoPoint,
    },
    Radius {
        center: GeoPoint,
        kilometers: f64,
    },
    Polygon {
        points: Vec<GeoPoint>,
    },
}

impl GeoValue {
    pub fn parse(shape: GeoShape, text: &str) -> Result<Self, GeoValueError> {
        let parts: Vec<&str> = text.trim().split(':').collect();
        let part_count = |expected| GeoValueError::PartCount {
            shape,
            expected,
            found: parts.len(),
        };

        match shape {
            GeoShape::Box => {
                let [first, second] = parts.as_slice() else {
                    return Err(part_count("2"));
                };
                let a = GeoPoint::parse(first)?;
                let b = GeoPoint::parse(second)?;
                Ok(GeoValue::Box {
                    north_west: GeoPoint {
                        lat: a.lat.max(b.lat),
                        lng: a.lng.min(b.lng),
                    },
                    south_east: GeoPoint {
                        lat: a.lat.min(b.lat),
                        lng: a.lng.max(b.lng),
                    },
                })
            }
            GeoShape::Radius => {
                let [center, radius] = parts.as_slice() else {
                    return Err(part_count("2"));
                };
                let center = GeoPoint::parse(center)?;
                let kilometers = parse_number(radius)?;
                if kilometers <= 0.0 || !kilometers.is_finite() {
                    return Err(GeoValueError::Radius(kilometers));
                }
                Ok(GeoValue::Radius { center, kilometers })
            }
            GeoShape::Polygon => {
                if parts.len() < 3 {
                    return Err(part_count("at least 3"));
                }
                let points = parts
                    .iter()
                    .map(|part| GeoPoint::parse(part))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GeoValue::Polygon { points })
            }
        }
    }

    pub fn shape(&self) -> GeoShape {
        match self {
            GeoValue::Box { .. } => GeoShape::Box,
            GeoValue::Radius { .. } => GeoShape::Radius,
            GeoValue::Polygon { .. } => GeoShape::Polygon,
        }
    }
}

impl fmt::Display for GeoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoValue::Box {
                north_west,
                south_east,
            } => write!(f, "{north_west}:{south_east}"),
            GeoValue::Radius { center, kilometers } => write!(f, "{center}:{kilometers}"),
            GeoValue::Polygon { points } => {
                let joined: Vec<String> = points.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join(":"))
            }
        }
    }
}
