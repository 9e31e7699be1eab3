pub mod classifier;
pub mod error;
pub mod models;
pub mod normalize;
pub mod query;

pub use classifier::{analyze_text, Analysis, RiskLevel};
pub use error::InputError;
pub use models::{
    Category, GeoPoint, PlaceRecord, RoutePoint, SearchRequest, SearchResult,
};
pub use normalize::{normalize_elements, RawElement};
pub use query::build_overpass_query;
