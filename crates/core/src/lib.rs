//! Domain building blocks for the threshold configuration service.
//!
//! Everything in this crate is pure: no database or network access. The
//! storage layer (`dx-db`) and the notification layer (`dx-events`) build on
//! these types.

pub mod change_detection;
pub mod error;
pub mod threshold_type;
pub mod threshold_validation;
pub mod types;
