pub mod adjustments;
pub mod filters;
