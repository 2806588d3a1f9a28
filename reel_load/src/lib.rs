pub mod loader;

/// Message to print before any loader logs
pub const LOADER_HEADING: &str = "[LOADER] ";

/// Ratings at or above this count as relevant when building the ground truth
pub const RELEVANT_RATING: f64 = 4.0;
