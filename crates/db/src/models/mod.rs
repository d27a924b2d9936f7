//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) where partial
//!   updates exist

pub mod character;
pub mod episode;
pub mod panel;
pub mod portrait;
pub mod series;
