//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and the `Deserialize` inputs accepted by its repository.

pub mod threshold;
