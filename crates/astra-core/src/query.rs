//! Overpass QL query construction for nearby searches.

use std::fmt::Write as _;

use crate::models::SearchRequest;

/// Element shapes queried for every category. Ways and relations are asked
/// for their centroid via `out center`.
const SHAPES: [&str; 3] = ["node", "way", "relation"];

/// Build the Overpass query for a validated search request.
///
/// `server_timeout_s` is the `[timeout:N]` budget the provider enforces on
/// its side; it should stay below the client attempt timeout.
pub fn build_overpass_query(request: &SearchRequest, server_timeout_s: u32) -> String {
    let center = request.center();
    let around = format!(
        "(around:{},{},{})",
        request.radius_m(),
        center.lat(),
        center.lon()
    );

    let mut query = format!("[out:json][timeout:{}];\n(\n", server_timeout_s.max(1));
    for category in request.categories() {
        let Some(amenity) = category.amenity() else {
            continue;
        };
        for shape in SHAPES {
            // Writing into a String cannot fail.
            let _ = writeln!(query, "  {shape}[\"amenity\"=\"{amenity}\"]{around};");
        }
    }
    query.push_str(");\nout center tags;\n");
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, GeoPoint};

    #[test]
    fn includes_every_shape_for_each_category() {
        let center = GeoPoint::new(6.9271, 79.8612).unwrap();
        let request = SearchRequest::all_categories(center, 3000).unwrap();
        let query = build_overpass_query(&request, 25);

        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.trim_end().ends_with("out center tags;"));
        for amenity in ["police", "hospital"] {
            for shape in SHAPES {
                let clause =
                    format!("{shape}[\"amenity\"=\"{amenity}\"](around:3000,6.9271,79.8612);");
                assert!(query.contains(&clause), "missing {clause} in {query}");
            }
        }
    }

    #[test]
    fn only_requested_categories_are_queried() {
        let center = GeoPoint::new(1.0, 2.0).unwrap();
        let request = SearchRequest::new(center, 500, [Category::Hospital]).unwrap();
        let query = build_overpass_query(&request, 25);

        assert!(query.contains("\"hospital\""));
        assert!(!query.contains("\"police\""));
        assert_eq!(query.matches("(around:500,1,2);").count(), 3);
    }

    #[test]
    fn police_clauses_come_first() {
        let center = GeoPoint::new(1.0, 2.0).unwrap();
        let request =
            SearchRequest::new(center, 500, [Category::Hospital, Category::Police]).unwrap();
        let query = build_overpass_query(&request, 25);

        let police = query.find("\"police\"").unwrap();
        let hospital = query.find("\"hospital\"").unwrap();
        assert!(police < hospital);
    }
}
