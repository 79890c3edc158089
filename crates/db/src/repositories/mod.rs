//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! any PostgreSQL executor as the first argument: a `&PgPool` for one-off
//! reads, or `&mut *tx` when the call is part of a unit of work.

pub mod alert_repo;
pub mod birth_history_repo;
pub mod breeding_record_repo;
pub mod farm_repo;
pub mod notification_repo;
pub mod pen_repo;
pub mod pig_repo;
pub mod piglet_repo;

pub use alert_repo::AlertRepo;
pub use birth_history_repo::BirthHistoryRepo;
pub use breeding_record_repo::BreedingRecordRepo;
pub use farm_repo::FarmRepo;
pub use notification_repo::NotificationRepo;
pub use pen_repo::PenRepo;
pub use pig_repo::PigRepo;
pub use piglet_repo::PigletRepo;
