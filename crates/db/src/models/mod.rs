//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches where the API accepts them

pub mod alert;
pub mod dimension;
pub mod metric;
pub mod project;
pub mod report;
pub mod threshold;
