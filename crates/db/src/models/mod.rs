//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO carrying raw caller input
//! - Where the engine parses input first, a `New*` insert struct with typed fields

pub mod alert;
pub mod birth_history;
pub mod breeding_record;
pub mod farm;
pub mod notification;
pub mod pen;
pub mod pig;
pub mod piglet;
