//! Breeding record lifecycle: mating, birth outcome, deletion.
//!
//! Each mutating call runs as a single transaction. The sow row is locked
//! (`FOR UPDATE`) before any eligibility check so concurrent submissions for
//! the same sow serialise; the partial unique index on open records backs
//! this up and surfaces as an integrity conflict, which is retried once.

use serde::Serialize;
use serde_json::json;
use sqlx::PgConnection;
use sowcycle_core::alert::{AlertStatus, AlertType};
use sowcycle_core::calendar::{days_between, parse_calendar_date, shift_days};
use sowcycle_core::culling::{CullingAdvisor, CullingAssessment};
use sowcycle_core::error::CoreError;
use sowcycle_core::gestation::{GestationCalculator, ScheduledMilestone};
use sowcycle_core::lifecycle::{
    ensure_no_open_record, ensure_not_before_mating, ensure_rest_period_elapsed, validate_action,
    BreedingAction,
};
use sowcycle_core::pig::{ensure_gender, GENDER_FEMALE, GENDER_MALE};
use sowcycle_core::types::{CalendarDate, DbId};
use sowcycle_db::models::alert::AlertSpec;
use sowcycle_db::models::birth_history::NewBirthHistory;
use sowcycle_db::models::breeding_record::{
    BreedingRecord, CreateBreedingRecord, DeletedRecord, NewBreedingRecord, RecordBirthOutcome,
};
use sowcycle_db::models::notification::{NewNotification, PRIORITY_HIGH};
use sowcycle_db::models::pig::Pig;
use sowcycle_db::repositories::{
    BirthHistoryRepo, BreedingRecordRepo, NotificationRepo, PigRepo, PigletRepo,
};
use sowcycle_events::bus::{
    BREEDING_BIRTH_RECORDED, BREEDING_DELETED, BREEDING_MATED, CULLING_FLAGGED,
};
use sowcycle_events::FarmEvent;

use crate::alert_scheduler::AlertScheduler;
use crate::context::ActingContext;
use crate::error::EngineResult;
use crate::retry::{with_integrity_retry, OpContext};
use crate::EngineDeps;

/// An open record whose expected birth date plus grace has passed.
#[derive(Debug, Clone, Serialize)]
pub struct OverduePregnancy {
    pub record: BreedingRecord,
    /// Mating date plus the profile's gestation length.
    pub expected_birth_date: CalendarDate,
    /// Days past the expected birth date as of today.
    pub days_overdue: i64,
}

struct BirthRecorded {
    record: BreedingRecord,
    assessment: CullingAssessment,
}

/// Entry point for recording matings and birth outcomes.
#[derive(Clone)]
pub struct BreedingRecordManager {
    deps: EngineDeps,
}

impl BreedingRecordManager {
    pub fn new(deps: EngineDeps) -> Self {
        Self { deps }
    }

    fn calculator(&self) -> GestationCalculator<'_> {
        GestationCalculator::new(&self.deps.profile)
    }

    // -----------------------------------------------------------------------
    // recordMating
    // -----------------------------------------------------------------------

    /// Record a mating and schedule its alert cascade.
    ///
    /// Produces the breeding record, flags the sow as pregnant and creates
    /// the confirmation alert, the pre-birth milestones and one birth check
    /// per day of the window.
    pub async fn record_mating(
        &self,
        ctx: ActingContext,
        input: &CreateBreedingRecord,
    ) -> EngineResult<BreedingRecord> {
        let op = OpContext::new("record_mating").sow(input.sow_id);
        let record = with_integrity_retry(op, || self.try_record_mating(ctx, input)).await?;

        tracing::info!(
            record_id = record.id,
            sow_id = record.sow_id,
            boar_id = record.boar_id,
            mating_date = %record.mating_date,
            user_id = ctx.user_id,
            "Mating recorded"
        );
        self.deps.bus.publish(
            FarmEvent::new(BREEDING_MATED, record.farm_id)
                .with_pig(record.sow_id)
                .with_record(record.id)
                .with_actor(ctx.user_id)
                .with_payload(json!({
                    "boar_id": record.boar_id,
                    "mating_date": record.mating_date,
                    "expected_birth_date": record.expected_birth_date,
                })),
        );
        Ok(record)
    }

    async fn try_record_mating(
        &self,
        ctx: ActingContext,
        input: &CreateBreedingRecord,
    ) -> EngineResult<BreedingRecord> {
        let profile = &*self.deps.profile;
        let calc = self.calculator();

        let mating = parse_calendar_date("mating_date", &input.mating_date)?;
        let expected = parse_calendar_date("expected_birth_date", &input.expected_birth_date)?;
        ensure_not_before_mating("expected_birth_date", mating, expected)?;
        let notify_override = input
            .notify_on
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_calendar_date("notify_on", raw))
            .transpose()?;
        let alert_date = calc.pregnancy_check_date(mating)?;
        let schedule = calc.mating_schedule(mating)?;

        let mut tx = self.deps.pool.begin().await?;

        let sow = PigRepo::lock_in_farm(&mut *tx, ctx.farm_id, input.sow_id)
            .await?
            .ok_or_else(|| missing_pig("Sow", input.sow_id, ctx.farm_id))?;
        ensure_gender("Sow", &sow.tag, &sow.gender, GENDER_FEMALE)?;
        let boar = PigRepo::find_in_farm(&mut *tx, ctx.farm_id, input.boar_id)
            .await?
            .ok_or_else(|| missing_pig("Boar", input.boar_id, ctx.farm_id))?;
        ensure_gender("Boar", &boar.tag, &boar.gender, GENDER_MALE)?;

        let open = BreedingRecordRepo::find_open_for_sow(&mut *tx, ctx.farm_id, sow.id).await?;
        ensure_no_open_record(&sow.tag, open.map(|r| r.id))?;
        let last = BreedingRecordRepo::last_resolved_for_sow(&mut *tx, ctx.farm_id, sow.id).await?;
        ensure_rest_period_elapsed(
            profile,
            &sow.tag,
            last.and_then(|r| r.actual_birth_date),
            mating,
        )?;

        let record = BreedingRecordRepo::create(
            &mut *tx,
            &NewBreedingRecord {
                farm_id: ctx.farm_id,
                sow_id: sow.id,
                boar_id: boar.id,
                mating_date: mating,
                expected_birth_date: expected,
                alert_date,
                notes: input.notes.clone(),
                created_by: ctx.user_id,
            },
        )
        .await?;
        PigRepo::mark_pregnant(&mut *tx, sow.id, mating, expected).await?;

        let confirmation = &profile.mating_confirmation;
        let confirmation_start = shift_days(mating, confirmation.offset_days)?;
        let message = input
            .confirmation_message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| confirmation.render_message(&sow.tag));
        AlertScheduler::create_alert(
            &mut tx,
            &AlertSpec {
                farm_id: ctx.farm_id,
                pig_id: sow.id,
                pen_id: None,
                breeding_record_id: Some(record.id),
                name: confirmation.key.clone(),
                alert_type: AlertType::Breeding,
                severity: confirmation.severity,
                message,
                start_date: confirmation_start,
                notify_on: Some(vec![notify_override.unwrap_or(confirmation_start)]),
            },
            ctx.user_id,
        )
        .await?;

        schedule_milestones(
            &mut tx,
            ctx,
            &sow,
            record.id,
            AlertType::Breeding,
            &schedule,
        )
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // recordBirthOutcome
    // -----------------------------------------------------------------------

    /// Close an open record with its birth outcome.
    ///
    /// Runs the culling heuristic, clears the sow's pregnancy, completes the
    /// pending breeding alerts, schedules the post-birth alerts and stores
    /// the outcome, all in one transaction.
    pub async fn record_birth_outcome(
        &self,
        ctx: ActingContext,
        record_id: DbId,
        input: &RecordBirthOutcome,
    ) -> EngineResult<BreedingRecord> {
        let op = OpContext::new("record_birth_outcome").record(record_id);
        let BirthRecorded { record, assessment } =
            with_integrity_retry(op, || self.try_record_birth(ctx, record_id, input)).await?;

        tracing::info!(
            record_id = record.id,
            sow_id = record.sow_id,
            number_of_piglets = ?record.number_of_piglets,
            culling_flags = assessment.flags.len(),
            "Birth outcome recorded"
        );
        self.deps.bus.publish(
            FarmEvent::new(BREEDING_BIRTH_RECORDED, record.farm_id)
                .with_pig(record.sow_id)
                .with_record(record.id)
                .with_actor(ctx.user_id)
                .with_payload(json!({
                    "actual_birth_date": record.actual_birth_date,
                    "number_of_piglets": record.number_of_piglets,
                })),
        );
        for flag in &assessment.flags {
            self.deps.bus.publish(
                FarmEvent::new(CULLING_FLAGGED, record.farm_id)
                    .with_pig(record.sow_id)
                    .with_record(record.id)
                    .with_actor(ctx.user_id)
                    .with_payload(json!({
                        "reason": flag.reason,
                        "message": flag.message,
                        "litters": flag.litters,
                    })),
            );
        }
        Ok(record)
    }

    async fn try_record_birth(
        &self,
        ctx: ActingContext,
        record_id: DbId,
        input: &RecordBirthOutcome,
    ) -> EngineResult<BirthRecorded> {
        let profile = &*self.deps.profile;
        let calc = self.calculator();

        let birth = parse_calendar_date("actual_birth_date", &input.actual_birth_date)?;
        let count = input.number_of_piglets;
        if !(0..=profile.max_recordable_litter).contains(&count) {
            return Err(CoreError::Validation(format!(
                "number_of_piglets must be between 0 and {}, got {count}",
                profile.max_recordable_litter
            ))
            .into());
        }

        let mut tx = self.deps.pool.begin().await?;

        let record = lock_record_in_farm(&mut tx, ctx.farm_id, record_id).await?;
        validate_action(record.state(), BreedingAction::RecordBirth)?;
        ensure_not_before_mating("actual_birth_date", record.mating_date, birth)?;

        let sow = PigRepo::lock_in_farm(&mut *tx, ctx.farm_id, record.sow_id)
            .await?
            .ok_or_else(|| missing_pig("Sow", record.sow_id, ctx.farm_id))?;

        // 1. Culling heuristic over earlier litters.
        let history = BirthHistoryRepo::recent_litter_sizes(
            &mut *tx,
            sow.id,
            profile.culling.history_depth as i64,
        )
        .await?;
        let assessment = CullingAdvisor::new(profile.culling).evaluate(&sow.tag, &history, count);
        for flag in &assessment.flags {
            tracing::warn!(
                sow_id = sow.id,
                record_id = record.id,
                reason = flag.reason.notification_type(),
                "{}",
                flag.message
            );
            NotificationRepo::create(
                &mut *tx,
                &NewNotification {
                    user_id: ctx.user_id,
                    farm_id: Some(ctx.farm_id),
                    notification_type: flag.reason.notification_type().to_string(),
                    priority: PRIORITY_HIGH.to_string(),
                    title: flag.reason.title().to_string(),
                    message: flag.message.clone(),
                    payload: json!({
                        "sow_id": sow.id,
                        "sow_tag": sow.tag,
                        "breeding_record_id": record.id,
                        "current_litter": count,
                        "litters": flag.litters,
                    }),
                },
            )
            .await?;
        }

        // 2. Sow reproductive state.
        PigRepo::record_birth(&mut *tx, sow.id, birth).await?;

        // 3. Pregnancy alerts are done.
        AlertScheduler::cancel_alerts(
            &mut *tx,
            sow.id,
            &[AlertType::Breeding],
            AlertStatus::Completed,
            ctx.user_id,
        )
        .await?;

        // 4. Post-birth alerts.
        let schedule = calc.post_birth_schedule(birth)?;
        schedule_milestones(&mut tx, ctx, &sow, record.id, AlertType::Birth, &schedule).await?;

        // 5. The record itself.
        let updated = BreedingRecordRepo::record_birth(
            &mut *tx,
            record.id,
            birth,
            count,
            input.notes.as_deref(),
            ctx.user_id,
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "BreedingRecord",
            id: record.id,
        })?;

        if BirthHistoryRepo::find_for_record(&mut *tx, record.id)
            .await?
            .is_none()
        {
            BirthHistoryRepo::create(
                &mut *tx,
                &NewBirthHistory {
                    farm_id: ctx.farm_id,
                    sow_id: sow.id,
                    breeding_record_id: record.id,
                    birth_date: birth,
                    total_piglets: count,
                    created_by: ctx.user_id,
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(BirthRecorded {
            record: updated,
            assessment,
        })
    }

    // -----------------------------------------------------------------------
    // deleteRecord
    // -----------------------------------------------------------------------

    /// Soft-delete an open record.
    ///
    /// Also soft-deletes any piglets registered against it, clears the sow's
    /// pregnancy flags and rejects the sow's pending breeding and birth
    /// alerts. Deleting an already deleted record is `NotFound`.
    pub async fn delete_record(
        &self,
        ctx: ActingContext,
        record_id: DbId,
    ) -> EngineResult<DeletedRecord> {
        let op = OpContext::new("delete_record").record(record_id);
        let record = with_integrity_retry(op, || self.try_delete(ctx, record_id)).await?;

        tracing::info!(
            record_id = record.id,
            sow_id = record.sow_id,
            user_id = ctx.user_id,
            "Breeding record deleted"
        );
        self.deps.bus.publish(
            FarmEvent::new(BREEDING_DELETED, record.farm_id)
                .with_pig(record.sow_id)
                .with_record(record.id)
                .with_actor(ctx.user_id),
        );
        Ok(DeletedRecord { id: record.id })
    }

    async fn try_delete(&self, ctx: ActingContext, record_id: DbId) -> EngineResult<BreedingRecord> {
        let mut tx = self.deps.pool.begin().await?;

        let record = lock_record_in_farm(&mut tx, ctx.farm_id, record_id).await?;
        validate_action(record.state(), BreedingAction::Delete)?;

        if !BreedingRecordRepo::soft_delete(&mut *tx, record.id, ctx.user_id).await? {
            return Err(CoreError::NotFound {
                entity: "BreedingRecord",
                id: record.id,
            }
            .into());
        }
        let piglets = PigletRepo::soft_delete_for_record(&mut *tx, record.id, ctx.user_id).await?;
        if piglets > 0 {
            tracing::warn!(record_id = record.id, piglets, "Deleted piglets of an open record");
        }
        PigRepo::clear_pregnancy(&mut *tx, record.sow_id).await?;
        AlertScheduler::cancel_record_alerts(
            &mut *tx,
            record.id,
            &[AlertType::Breeding, AlertType::Birth],
            AlertStatus::Rejected,
            ctx.user_id,
        )
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Live records of a sow, newest mating first.
    pub async fn get_breeding_history(
        &self,
        farm_id: DbId,
        sow_id: DbId,
    ) -> EngineResult<Vec<BreedingRecord>> {
        let pool = &self.deps.pool;
        if PigRepo::find_in_farm(pool, farm_id, sow_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Pig",
                id: sow_id,
            }
            .into());
        }
        Ok(BreedingRecordRepo::list_for_sow(pool, farm_id, sow_id).await?)
    }

    /// Open records of a farm that are past their expected birth date by
    /// more than `grace_days`. Reporting only.
    pub async fn overdue_pregnancies(
        &self,
        farm_id: DbId,
        grace_days: i64,
    ) -> EngineResult<Vec<OverduePregnancy>> {
        let calc = self.calculator();
        let clock = &*self.deps.clock;
        let today = clock.today();

        let mut overdue = Vec::new();
        for record in BreedingRecordRepo::list_open_for_farm(&self.deps.pool, farm_id).await? {
            if !calc.is_overdue(record.mating_date, grace_days, clock)? {
                continue;
            }
            let expected_birth_date = calc.expected_birth_date(record.mating_date)?;
            overdue.push(OverduePregnancy {
                days_overdue: days_between(expected_birth_date, today),
                expected_birth_date,
                record,
            });
        }
        Ok(overdue)
    }
}

fn missing_pig(role: &str, id: DbId, farm_id: DbId) -> CoreError {
    CoreError::Validation(format!("{role} {id} not found in farm {farm_id}"))
}

/// Lock a live record, treating records of other farms as missing.
async fn lock_record_in_farm(
    conn: &mut PgConnection,
    farm_id: DbId,
    record_id: DbId,
) -> EngineResult<BreedingRecord> {
    BreedingRecordRepo::lock_by_id(conn, record_id)
        .await?
        .filter(|r| r.farm_id == farm_id)
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "BreedingRecord",
                id: record_id,
            }
            .into()
        })
}

/// One alert per scheduled milestone, default notify-on convention.
async fn schedule_milestones(
    conn: &mut PgConnection,
    ctx: ActingContext,
    sow: &Pig,
    record_id: DbId,
    alert_type: AlertType,
    schedule: &[ScheduledMilestone],
) -> EngineResult<()> {
    for scheduled in schedule {
        let milestone = &scheduled.milestone;
        AlertScheduler::create_alert(
            conn,
            &AlertSpec {
                farm_id: ctx.farm_id,
                pig_id: sow.id,
                pen_id: None,
                breeding_record_id: Some(record_id),
                name: milestone.key.clone(),
                alert_type,
                severity: milestone.severity,
                message: milestone.render_message(&sow.tag),
                start_date: scheduled.due_on,
                notify_on: None,
            },
            ctx.user_id,
        )
        .await?;
    }
    Ok(())
}
