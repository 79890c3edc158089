//! Breeding lifecycle domain logic with zero I/O.
//!
//! Everything in this crate is pure: date arithmetic, the breeding rule
//! profile, the culling heuristic, alert conventions, and litter validation.
//! Persistence lives in `sowcycle-db`; orchestration in `sowcycle-engine`.

pub mod alert;
pub mod calendar;
pub mod culling;
pub mod error;
pub mod gestation;
pub mod lifecycle;
pub mod litter;
pub mod pig;
pub mod profile;
pub mod types;
