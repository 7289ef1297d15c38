use thiserror::Error;

/// Errors the router surface can return. Each variant is distinguishable by
/// the caller; well-formed input never panics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouterError {
    #[error("bounding box is invalid: {0}")]
    InvalidBounds(String),

    #[error("coordinate out of range: lat={lat}, lng={lng}")]
    InvalidCoord { lat: f64, lng: f64 },

    #[error("safety weight {0} is outside [0, 1]")]
    InvalidWeight(f64),

    #[error("route() called before build_graph()")]
    GraphNotInitialised,

    #[error("no path found")]
    NoPath,
}

pub type Result<T> = std::result::Result<T, RouterError>;
