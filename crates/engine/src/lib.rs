//! Breeding lifecycle and alert scheduling engine.
//!
//! Entry points:
//! - [`BreedingRecordManager`]: record a mating, record a birth outcome,
//!   delete an open record, read a sow's history.
//! - [`PigletRegistrar`]: register the offspring of a recorded birth.
//! - [`AlertScheduler`]: create, cancel and query scheduled alerts; used by
//!   both of the above inside their unit of work.
//!
//! Every mutating operation runs in one database transaction and is retried
//! once on an integrity conflict.

pub mod alert_scheduler;
pub mod breeding;
pub mod config;
pub mod context;
pub mod error;
pub mod litter;
mod retry;

use std::sync::Arc;

use sowcycle_core::calendar::Clock;
use sowcycle_core::profile::BreedingProfile;
use sowcycle_db::DbPool;
use sowcycle_events::EventBus;

pub use alert_scheduler::AlertScheduler;
pub use breeding::{BreedingRecordManager, OverduePregnancy};
pub use config::{ConfigError, EngineConfig};
pub use context::ActingContext;
pub use error::{EngineError, EngineResult};
pub use litter::{LitterRegistration, PigletRegistrar};

/// Shared dependencies of the engine components.
#[derive(Clone)]
pub struct EngineDeps {
    pub pool: DbPool,
    pub profile: Arc<BreedingProfile>,
    pub clock: Arc<dyn Clock>,
    pub bus: Arc<EventBus>,
}

impl EngineDeps {
    pub fn new(
        pool: DbPool,
        profile: BreedingProfile,
        clock: Arc<dyn Clock>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            profile: Arc::new(profile),
            clock,
            bus,
        }
    }
}

/// Both engine entry points over the same dependencies.
#[derive(Clone)]
pub struct Engine {
    pub breeding: BreedingRecordManager,
    pub litters: PigletRegistrar,
}

impl Engine {
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            breeding: BreedingRecordManager::new(deps.clone()),
            litters: PigletRegistrar::new(deps),
        }
    }
}
