//! Inspection cleaning, grading and per-inspection aggregation.
//!
//! Rows pass through the stages in order: normalization, temporal
//! filtering, eligibility filtering, score-based grading, and aggregation
//! into one record per inspection event. [`pipeline::clean_data`] runs them
//! all.

pub mod aggregate;
pub mod eligibility;
pub mod grade;
pub mod normalize;
pub mod pipeline;
pub mod temporal;
pub mod types;
