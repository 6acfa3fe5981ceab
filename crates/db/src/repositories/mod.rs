//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod threshold_repo;

pub use threshold_repo::ThresholdRepo;
