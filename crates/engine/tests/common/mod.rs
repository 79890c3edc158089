//! Fixtures shared by the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;
use sowcycle_core::calendar::FixedClock;
use sowcycle_core::profile::BreedingProfile;
use sowcycle_core::types::{CalendarDate, DbId};
use sowcycle_db::models::breeding_record::{CreateBreedingRecord, RecordBirthOutcome};
use sowcycle_db::models::farm::CreateFarm;
use sowcycle_db::models::pen::{CreatePen, Pen};
use sowcycle_db::models::pig::{CreatePig, Pig};
use sowcycle_db::models::piglet::CreatePigletRecord;
use sowcycle_db::repositories::{FarmRepo, PenRepo, PigRepo};
use sowcycle_engine::{ActingContext, Engine, EngineDeps};
use sowcycle_events::EventBus;

pub const USER_ID: DbId = 7;

/// A farm with one pen, one sow (in the pen) and one boar.
pub struct Herd {
    pub ctx: ActingContext,
    pub pen: Pen,
    pub sow: Pig,
    pub boar: Pig,
}

pub fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engine over `pool` with the swine profile and a clock frozen at `today`.
pub fn engine_at(pool: &PgPool, today: CalendarDate) -> (Engine, Arc<EventBus>) {
    let bus = Arc::new(EventBus::default());
    let deps = EngineDeps::new(
        pool.clone(),
        BreedingProfile::swine(),
        Arc::new(FixedClock::at_date(today)),
        bus.clone(),
    );
    (Engine::new(deps), bus)
}

pub fn engine(pool: &PgPool) -> Engine {
    engine_at(pool, date(2025, 1, 1)).0
}

pub async fn create_pig(
    pool: &PgPool,
    farm_id: DbId,
    tag: &str,
    gender: &str,
    pen_id: Option<DbId>,
) -> Pig {
    PigRepo::create(
        pool,
        &CreatePig {
            farm_id,
            tag: tag.to_string(),
            gender: gender.to_string(),
            pen_id,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_herd(pool: &PgPool, name: &str) -> Herd {
    let farm = FarmRepo::create(
        pool,
        &CreateFarm {
            name: name.to_string(),
            owner_user_id: USER_ID,
            timezone: Some("Europe/Madrid".to_string()),
        },
    )
    .await
    .unwrap();
    let pen = PenRepo::create(
        pool,
        &CreatePen {
            farm_id: farm.id,
            name: "Farrowing 1".to_string(),
        },
    )
    .await
    .unwrap();
    let sow = create_pig(pool, farm.id, "S1", "female", Some(pen.id)).await;
    let boar = create_pig(pool, farm.id, "B1", "male", None).await;

    Herd {
        ctx: ActingContext::new(farm.id, USER_ID),
        pen,
        sow,
        boar,
    }
}

/// Mating input with the expected birth date 114 days later.
pub fn mating(sow: &Pig, boar: &Pig, on: CalendarDate) -> CreateBreedingRecord {
    let expected = on + chrono::Days::new(114);
    CreateBreedingRecord {
        sow_id: sow.id,
        boar_id: boar.id,
        mating_date: on.to_string(),
        expected_birth_date: expected.to_string(),
        notes: None,
        notify_on: None,
        confirmation_message: None,
    }
}

pub fn birth(on: CalendarDate, piglets: i32) -> RecordBirthOutcome {
    RecordBirthOutcome {
        actual_birth_date: on.to_string(),
        number_of_piglets: piglets,
        notes: None,
    }
}

pub fn piglet(breeding_record_id: DbId, number: &str) -> CreatePigletRecord {
    CreatePigletRecord {
        piglet_number: number.to_string(),
        breeding_record_id,
        birth_weight_kg: Some(1.4),
        gender: "female".to_string(),
        color: None,
        status: None,
        female_parent_id: None,
        male_parent_id: None,
    }
}

pub fn piglets(breeding_record_id: DbId, numbers: std::ops::RangeInclusive<u32>) -> Vec<CreatePigletRecord> {
    numbers
        .map(|n| piglet(breeding_record_id, &n.to_string()))
        .collect()
}
