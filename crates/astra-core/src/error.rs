//! Input validation errors.

use thiserror::Error;

/// A request rejected before any outbound call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),

    #[error("radius must be a positive number of meters, got {0}")]
    InvalidRadius(i64),

    #[error("radius {radius_m} m exceeds the maximum of {max_m} m")]
    RadiusTooLarge { radius_m: u32, max_m: u32 },

    #[error("at least one category must be requested")]
    NoCategories,

    #[error("unsupported category: {0}")]
    UnsupportedCategory(String),

    #[error("invalid routing profile: {0:?}")]
    InvalidProfile(String),

    /// Query string missing a parameter or carrying one of the wrong type.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
}
