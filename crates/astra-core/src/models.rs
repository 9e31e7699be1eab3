//! Core data models for the Astra backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InputError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(InputError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(InputError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Point-of-interest category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Police,
    Hospital,
    /// Tagged with something we do not recognise, or not tagged at all
    Unknown,
}

impl Category {
    /// Categories searched when the caller does not ask for a subset.
    pub const SEARCHABLE: [Category; 2] = [Category::Police, Category::Hospital];

    /// Map an `amenity` tag value to a category.
    pub fn from_amenity(value: &str) -> Self {
        match value.trim() {
            "police" => Category::Police,
            "hospital" => Category::Hospital,
            _ => Category::Unknown,
        }
    }

    /// The `amenity` tag value used when querying for this category.
    pub fn amenity(&self) -> Option<&'static str> {
        match self {
            Category::Police => Some("police"),
            Category::Hospital => Some("hospital"),
            Category::Unknown => None,
        }
    }

    /// Label used when a place carries no name.
    pub fn default_name(&self) -> &'static str {
        match self {
            Category::Police => "Police Station",
            Category::Hospital => "Hospital",
            Category::Unknown => "Unnamed Place",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Police => f.write_str("police"),
            Category::Hospital => f.write_str("hospital"),
            Category::Unknown => f.write_str("unknown"),
        }
    }
}

impl FromStr for Category {
    type Err = InputError;

    /// Parses a requestable category. `unknown` is never requestable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "police" => Ok(Category::Police),
            "hospital" => Ok(Category::Hospital),
            other => Err(InputError::UnsupportedCategory(other.to_string())),
        }
    }
}

/// One inbound nearby-places search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    center: GeoPoint,
    radius_m: u32,
    categories: BTreeSet<Category>,
}

impl SearchRequest {
    pub fn new(
        center: GeoPoint,
        radius_m: i64,
        categories: impl IntoIterator<Item = Category>,
    ) -> Result<Self, InputError> {
        let radius_m = u32::try_from(radius_m)
            .ok()
            .filter(|radius| *radius > 0)
            .ok_or(InputError::InvalidRadius(radius_m))?;

        let categories: BTreeSet<Category> = categories.into_iter().collect();
        if categories.is_empty() {
            return Err(InputError::NoCategories);
        }
        if categories.contains(&Category::Unknown) {
            return Err(InputError::UnsupportedCategory(Category::Unknown.to_string()));
        }

        Ok(Self {
            center,
            radius_m,
            categories,
        })
    }

    /// Search both police stations and hospitals.
    pub fn all_categories(center: GeoPoint, radius_m: i64) -> Result<Self, InputError> {
        Self::new(center, radius_m, Category::SEARCHABLE)
    }

    /// Reject radii above an operator-configured ceiling.
    pub fn ensure_radius_within(&self, max_m: u32) -> Result<(), InputError> {
        if self.radius_m > max_m {
            return Err(InputError::RadiusTooLarge {
                radius_m: self.radius_m,
                max_m,
            });
        }
        Ok(())
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    /// Requested categories in stable (police, hospital) order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().copied()
    }
}

/// A normalized place returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    #[serde(rename = "type")]
    pub category: Category,
    pub name: String,
    #[serde(flatten)]
    pub location: GeoPoint,
    pub phone: String,
}

/// Outcome of a nearby search; also the unit held by the degraded-mode cache.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub success: bool,
    pub places: Vec<PlaceRecord>,
    pub message: String,
}

impl SearchResult {
    /// A fresh result straight from a provider.
    pub fn live(places: Vec<PlaceRecord>) -> Self {
        Self {
            success: true,
            places,
            message: String::new(),
        }
    }

    /// The "nothing cached yet" sentinel.
    pub fn no_data_yet() -> Self {
        Self {
            success: false,
            places: Vec::new(),
            message: "No nearby data available yet".to_string(),
        }
    }

    pub fn count(&self) -> usize {
        self.places.len()
    }
}

/// A single decoded route vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
}
