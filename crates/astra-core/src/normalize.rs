//! Maps raw Overpass elements to uniform place records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{Category, GeoPoint, PlaceRecord};

/// An element exactly as a provider returned it.
///
/// Kept opaque so that one malformed entry cannot fail a whole response;
/// it is only interpreted during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawElement(pub Value);

#[derive(Debug, Deserialize)]
struct ElementFields {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<Center>,
    #[serde(default)]
    tags: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Center {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

const PHONE_TAGS: [&str; 2] = ["phone", "contact:phone"];

/// Normalize provider elements, preserving input order.
///
/// Elements without a usable point or centroid are dropped.
pub fn normalize_elements(elements: &[RawElement]) -> Vec<PlaceRecord> {
    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let record = normalize_element(element);
            if record.is_none() {
                tracing::debug!("Dropping element {} without usable location", index);
            }
            record
        })
        .collect()
}

/// Normalize a single element, or `None` when it has no usable location.
pub fn normalize_element(element: &RawElement) -> Option<PlaceRecord> {
    let fields: ElementFields = serde_json::from_value(element.0.clone()).ok()?;
    let location = resolve_location(&fields)?;
    let tags = fields.tags.unwrap_or_default();

    // Non-police amenities are not assumed to be hospitals: anything
    // unrecognised stays `unknown` and gets a neutral name.
    let category = tag_str(&tags, "amenity")
        .map(Category::from_amenity)
        .unwrap_or(Category::Unknown);

    let name = tag_str(&tags, "name")
        .map(str::to_string)
        .unwrap_or_else(|| category.default_name().to_string());

    let phone = PHONE_TAGS
        .iter()
        .find_map(|key| tag_str(&tags, key))
        .map(str::to_string)
        .unwrap_or_default();

    Some(PlaceRecord {
        category,
        name,
        location,
        phone,
    })
}

fn resolve_location(fields: &ElementFields) -> Option<GeoPoint> {
    let point = match (fields.lat, fields.lon) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).ok(),
        _ => None,
    };
    point.or_else(|| {
        let center = fields.center.as_ref()?;
        GeoPoint::new(center.lat?, center.lon?).ok()
    })
}

/// Non-blank string tag value.
fn tag_str<'a>(tags: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    tags.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
