//! Offspring registration for a recorded birth.
//!
//! A batch is all-or-nothing. Validation failures roll the transaction back
//! and come back as [`LitterRegistration::Rejected`]; lineage advisories are
//! returned alongside the registered rows.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;
use sqlx::PgConnection;
use sowcycle_core::alert::AlertType;
use sowcycle_core::calendar::shift_days;
use sowcycle_core::error::CoreError;
use sowcycle_core::gestation::GestationCalculator;
use sowcycle_core::litter::{
    assess_lineage, ensure_capacity, ensure_unique_in_batch, normalize_piglet_number,
    LineageWarning, ParentPig,
};
use sowcycle_core::pig::{validate_gender, validate_piglet_status, PIGLET_STATUS_ALIVE};
use sowcycle_core::types::{CalendarDate, DbId};
use sowcycle_db::models::alert::AlertSpec;
use sowcycle_db::models::birth_history::{NewBirthHistory, PigBirthHistory};
use sowcycle_db::models::breeding_record::BreedingRecord;
use sowcycle_db::models::piglet::{CreatePigletRecord, NewPigletRecord, PigletRecord};
use sowcycle_db::repositories::{BirthHistoryRepo, BreedingRecordRepo, PigRepo, PigletRepo};
use sowcycle_events::bus::LITTER_REGISTERED;
use sowcycle_events::FarmEvent;

use crate::alert_scheduler::AlertScheduler;
use crate::context::ActingContext;
use crate::error::{EngineError, EngineResult};
use crate::retry::{with_integrity_retry, OpContext};
use crate::EngineDeps;

/// Outcome of [`PigletRegistrar::register_litter`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LitterRegistration {
    /// Every piglet of the batch was stored.
    Registered {
        registered_count: usize,
        data: Vec<PigletRecord>,
        /// Lineage findings that did not block the write.
        warnings: Vec<LineageWarning>,
    },
    /// Nothing was stored.
    Rejected { message: String },
}

impl LitterRegistration {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    /// The stored piglets, or the rejection as a validation error.
    pub fn into_result(self) -> Result<Vec<PigletRecord>, CoreError> {
        match self {
            Self::Registered { data, .. } => Ok(data),
            Self::Rejected { message } => Err(CoreError::Validation(message)),
        }
    }
}

struct Applied {
    record: BreedingRecord,
    piglets: Vec<PigletRecord>,
    warnings: Vec<LineageWarning>,
    relocation_scheduled: bool,
}

/// Registers the piglets of a resolved breeding record.
#[derive(Clone)]
pub struct PigletRegistrar {
    deps: EngineDeps,
}

impl PigletRegistrar {
    pub fn new(deps: EngineDeps) -> Self {
        Self { deps }
    }

    /// Register a batch of piglets against `breeding_record_id`.
    ///
    /// A missing or deleted record is an error; every other precondition
    /// failure yields [`LitterRegistration::Rejected`].
    pub async fn register_litter(
        &self,
        ctx: ActingContext,
        breeding_record_id: DbId,
        piglets: &[CreatePigletRecord],
    ) -> EngineResult<LitterRegistration> {
        let op = OpContext::new("register_litter").record(breeding_record_id);
        with_integrity_retry(op, || self.try_register(ctx, breeding_record_id, piglets)).await
    }

    async fn try_register(
        &self,
        ctx: ActingContext,
        breeding_record_id: DbId,
        piglets: &[CreatePigletRecord],
    ) -> EngineResult<LitterRegistration> {
        let mut tx = self.deps.pool.begin().await?;

        let applied = match self.apply(&mut tx, ctx, breeding_record_id, piglets).await {
            Ok(applied) => applied,
            Err(EngineError::Core(err)) if err.is_validation() => {
                tx.rollback().await?;
                tracing::info!(
                    record_id = breeding_record_id,
                    submitted = piglets.len(),
                    error = %err,
                    "Litter registration rejected"
                );
                return Ok(LitterRegistration::Rejected {
                    message: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        };
        tx.commit().await?;

        let Applied {
            record,
            piglets,
            warnings,
            relocation_scheduled,
        } = applied;

        tracing::info!(
            record_id = record.id,
            sow_id = record.sow_id,
            registered = piglets.len(),
            warnings = warnings.len(),
            relocation_scheduled,
            "Litter registered"
        );
        self.deps.bus.publish(
            FarmEvent::new(LITTER_REGISTERED, record.farm_id)
                .with_pig(record.sow_id)
                .with_record(record.id)
                .with_actor(ctx.user_id)
                .with_payload(json!({
                    "registered_count": piglets.len(),
                    "piglet_numbers": piglets.iter().map(|p| &p.piglet_number).collect::<Vec<_>>(),
                })),
        );

        Ok(LitterRegistration::Registered {
            registered_count: piglets.len(),
            data: piglets,
            warnings,
        })
    }

    async fn apply(
        &self,
        conn: &mut PgConnection,
        ctx: ActingContext,
        breeding_record_id: DbId,
        input: &[CreatePigletRecord],
    ) -> EngineResult<Applied> {
        let profile = &*self.deps.profile;

        if input.is_empty() {
            return Err(CoreError::Validation("At least one piglet is required".into()).into());
        }

        let record = BreedingRecordRepo::lock_by_id(&mut *conn, breeding_record_id)
            .await?
            .filter(|r| r.farm_id == ctx.farm_id)
            .ok_or(CoreError::NotFound {
                entity: "BreedingRecord",
                id: breeding_record_id,
            })?;
        let (Some(birth_date), Some(recorded_litter)) =
            (record.actual_birth_date, record.number_of_piglets)
        else {
            return Err(CoreError::Validation(format!(
                "Breeding record {} has no recorded birth yet",
                record.id
            ))
            .into());
        };

        let mut numbers = Vec::with_capacity(input.len());
        for piglet in input {
            if piglet.breeding_record_id != record.id {
                return Err(CoreError::Validation(format!(
                    "Piglet {} references breeding record {}, expected {}",
                    piglet.piglet_number, piglet.breeding_record_id, record.id
                ))
                .into());
            }
            numbers.push(normalize_piglet_number(&piglet.piglet_number)?);
        }
        ensure_unique_in_batch(numbers.iter().map(String::as_str))?;

        let taken = PigletRepo::existing_numbers(&mut *conn, ctx.farm_id, &numbers).await?;
        if !taken.is_empty() {
            return Err(CoreError::Validation(format!(
                "Piglet number already registered in this farm: {}",
                taken.join(", ")
            ))
            .into());
        }

        let already_registered = PigletRepo::count_for_record(&mut *conn, record.id).await?;
        ensure_capacity(
            recorded_litter,
            profile.litter_tolerance,
            already_registered,
            input.len(),
        )?;

        let mut parents: HashMap<DbId, ParentPig> = HashMap::new();
        let mut warnings = Vec::new();
        let mut statuses = Vec::with_capacity(input.len());
        for (piglet, number) in input.iter().zip(&numbers) {
            validate_gender(&piglet.gender)?;
            let status = piglet
                .status
                .clone()
                .unwrap_or_else(|| PIGLET_STATUS_ALIVE.to_string());
            validate_piglet_status(&status)?;
            statuses.push(status);
            if let Some(weight) = piglet.birth_weight_kg {
                if !weight.is_finite() || weight <= 0.0 {
                    return Err(CoreError::Validation(format!(
                        "Piglet {number}: birth weight must be positive, got {weight}"
                    ))
                    .into());
                }
            }

            let female = match piglet.female_parent_id {
                Some(id) => Some(load_parent(conn, &mut parents, ctx.farm_id, id).await?),
                None => None,
            };
            let male = match piglet.male_parent_id {
                Some(id) => Some(load_parent(conn, &mut parents, ctx.farm_id, id).await?),
                None => None,
            };
            warnings.extend(assess_lineage(
                number,
                record.sow_id,
                record.boar_id,
                female.as_ref(),
                male.as_ref(),
            )?);
        }

        let history = birth_history_for(conn, ctx, &record, birth_date, recorded_litter).await?;
        let weaning_date = GestationCalculator::new(profile).weaning_date(birth_date)?;

        let mut stored = Vec::with_capacity(input.len());
        for ((piglet, number), status) in input.iter().zip(numbers).zip(statuses) {
            let row = PigletRepo::create(
                &mut *conn,
                &NewPigletRecord {
                    farm_id: ctx.farm_id,
                    breeding_record_id: record.id,
                    birth_history_id: history.id,
                    piglet_number: number,
                    birth_weight_kg: piglet.birth_weight_kg,
                    gender: piglet.gender.clone(),
                    color: piglet.color.clone(),
                    status,
                    female_parent_id: piglet.female_parent_id,
                    male_parent_id: piglet.male_parent_id,
                    birth_date,
                    weaning_date,
                    created_by: ctx.user_id,
                },
            )
            .await?;
            stored.push(row);
        }

        for warning in &warnings {
            tracing::warn!(
                record_id = record.id,
                piglet_number = %warning.piglet_number,
                "{}",
                warning.message
            );
        }

        let relocation_scheduled = already_registered == 0;
        if relocation_scheduled {
            let rule = &profile.relocation;
            let sow_tag = PigRepo::find_in_farm(&mut *conn, ctx.farm_id, record.sow_id)
                .await?
                .map(|sow| sow.tag)
                .unwrap_or_else(|| record.sow_id.to_string());
            AlertScheduler::create_alert(
                conn,
                &AlertSpec {
                    farm_id: ctx.farm_id,
                    pig_id: record.sow_id,
                    pen_id: None,
                    breeding_record_id: Some(record.id),
                    name: rule.key.clone(),
                    alert_type: AlertType::Birth,
                    severity: rule.severity,
                    message: rule.render_message(&sow_tag),
                    start_date: shift_days(birth_date, rule.offset_days)?,
                    notify_on: None,
                },
                ctx.user_id,
            )
            .await?;
        }

        Ok(Applied {
            record,
            piglets: stored,
            warnings,
            relocation_scheduled,
        })
    }
}

/// Resolve a declared parent, caching by ID. Unknown parents are rejected.
async fn load_parent(
    conn: &mut PgConnection,
    cache: &mut HashMap<DbId, ParentPig>,
    farm_id: DbId,
    id: DbId,
) -> EngineResult<ParentPig> {
    if let Some(parent) = cache.get(&id) {
        return Ok(parent.clone());
    }
    let pig = PigRepo::find_in_farm(conn, farm_id, id)
        .await?
        .ok_or_else(|| CoreError::Validation(format!("Parent pig {id} not found in farm {farm_id}")))?;
    let parent = ParentPig {
        id: pig.id,
        tag: pig.tag,
        gender: pig.gender,
    };
    cache.insert(id, parent.clone());
    Ok(parent)
}

/// The record's birth history, created on first use.
async fn birth_history_for(
    conn: &mut PgConnection,
    ctx: ActingContext,
    record: &BreedingRecord,
    birth_date: CalendarDate,
    total_piglets: i32,
) -> EngineResult<PigBirthHistory> {
    if let Some(history) = BirthHistoryRepo::find_for_record(&mut *conn, record.id).await? {
        return Ok(history);
    }
    let history = BirthHistoryRepo::create(
        conn,
        &NewBirthHistory {
            farm_id: ctx.farm_id,
            sow_id: record.sow_id,
            breeding_record_id: record.id,
            birth_date,
            total_piglets,
            created_by: ctx.user_id,
        },
    )
    .await?;
    Ok(history)
}
