pub mod evaluation;
pub mod metrics;
pub mod recommender;

#[cfg(test)]
mod fixtures;

/// Message to print before any evaluation driver logs
pub const EVAL_HEADING: &str = "[EVAL] ";
