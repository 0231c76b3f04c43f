// Map object processing: normalization, priority scoring, filtering/aggregation

pub mod aggregate;
pub mod normalize;
pub mod priority;
