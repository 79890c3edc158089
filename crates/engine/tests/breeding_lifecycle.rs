//! Integration tests for the breeding record lifecycle.
//!
//! Exercises `BreedingRecordManager` against a real database:
//! - Mating produces the record and the seven-alert cascade
//! - Birth outcome completes pregnancy alerts and schedules post-birth alerts
//! - Deletion rejects the record's own pending alerts and is not repeatable
//! - Eligibility rules (open record, rest period, genders, dates)
//! - Reporting queries

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;
use sowcycle_core::alert::{AlertStatus, AlertType};
use sowcycle_core::calendar::utc_midnight;
use sowcycle_core::error::CoreError;
use sowcycle_core::lifecycle::BreedingState;
use sowcycle_db::repositories::{AlertRepo, BirthHistoryRepo, PenRepo, PigRepo};
use sowcycle_engine::{AlertScheduler, EngineError};
use sowcycle_events::bus::{BREEDING_DELETED, BREEDING_MATED};

use common::{birth, create_pig, date, engine, engine_at, mating, piglets, seed_herd};

// ---------------------------------------------------------------------------
// Test: end-to-end breeding cycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_full_cycle_from_mating_to_litter(pool: PgPool) {
    let herd = seed_herd(&pool, "Cycle Farm").await;
    let engine = engine(&pool);

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    assert_eq!(record.expected_birth_date, date(2025, 4, 25));
    assert_eq!(record.alert_date, date(2025, 1, 22));
    assert_eq!(record.state(), BreedingState::Mated);

    let alerts = AlertRepo::list_for_record(&pool, record.id).await.unwrap();
    assert_eq!(alerts.len(), 7);
    assert!(alerts.iter().all(|a| a.status == "pending" && a.alert_type == "breeding"));

    let sow = PigRepo::find_in_farm(&pool, herd.ctx.farm_id, herd.sow.id)
        .await
        .unwrap()
        .unwrap();
    assert!(sow.is_pregnant);
    assert_eq!(sow.expected_birth_on, Some(date(2025, 4, 25)));

    let resolved = engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(date(2025, 4, 26), 6))
        .await
        .unwrap();
    assert_eq!(resolved.state(), BreedingState::Resolved);
    assert_eq!(resolved.number_of_piglets, Some(6));

    let alerts = AlertRepo::list_for_record(&pool, record.id).await.unwrap();
    let completed = alerts.iter().filter(|a| a.status == "completed").count();
    assert_eq!(completed, 7);

    let pending = AlertScheduler::pending_for_pig(&pool, herd.sow.id).await.unwrap();
    let starts: Vec<_> = pending.iter().map(|a| a.start_day()).collect();
    assert_eq!(
        starts,
        vec![date(2025, 4, 30), date(2025, 5, 16), date(2025, 6, 7)]
    );
    assert!(pending.iter().all(|a| a.alert_type == "birth"));

    let first = engine
        .litters
        .register_litter(herd.ctx, record.id, &piglets(record.id, 1..=6))
        .await
        .unwrap();
    let data = first.into_result().unwrap();
    assert_eq!(data.len(), 6);
    assert!(data.iter().all(|p| p.weaning_date == date(2025, 6, 7)));

    // One over the recorded size is tolerated.
    let seventh = engine
        .litters
        .register_litter(herd.ctx, record.id, &piglets(record.id, 7..=7))
        .await
        .unwrap();
    assert!(seventh.is_success());

    let eighth = engine
        .litters
        .register_litter(herd.ctx, record.id, &piglets(record.id, 8..=8))
        .await
        .unwrap();
    assert_matches!(
        eighth.into_result(),
        Err(CoreError::Validation(msg)) if msg.contains("Litter size exceeded")
    );
}

// ---------------------------------------------------------------------------
// Test: alert cascade shape
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_mating_alerts_use_day_before_and_day_of(pool: PgPool) {
    let herd = seed_herd(&pool, "Notify Farm").await;
    let engine = engine(&pool);

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let alerts = AlertRepo::list_for_record(&pool, record.id).await.unwrap();

    let confirmation = alerts.iter().find(|a| a.name == "breeding_recorded").unwrap();
    assert_eq!(confirmation.severity, "medium");
    assert_eq!(confirmation.notify_on, vec![utc_midnight(date(2025, 1, 1))]);

    let nesting = alerts.iter().find(|a| a.name == "nesting_box").unwrap();
    assert_eq!(nesting.start_day(), date(2025, 4, 21));
    assert_eq!(
        nesting.notify_on,
        vec![utc_midnight(date(2025, 4, 20)), utc_midnight(date(2025, 4, 21))]
    );

    let checks: Vec<_> = alerts
        .iter()
        .filter(|a| a.name.starts_with("birth_check_day_"))
        .collect();
    assert_eq!(checks.len(), 5);
    for check in checks {
        assert_eq!(check.severity, "high");
        assert_eq!(check.notify_on.len(), 2);
        assert_eq!(check.notify_on[1], check.alert_start_date);
    }

    assert!(alerts
        .iter()
        .all(|a| a.pen_id == Some(herd.pen.id) && a.pen_name.as_deref() == Some("Farrowing 1")));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_confirmation_override_and_custom_message(pool: PgPool) {
    let herd = seed_herd(&pool, "Override Farm").await;
    let engine = engine(&pool);

    let mut input = mating(&herd.sow, &herd.boar, date(2025, 1, 1));
    input.notify_on = Some("2025-01-03".to_string());
    input.confirmation_message = Some("Check S1 heat again".to_string());

    let record = engine.breeding.record_mating(herd.ctx, &input).await.unwrap();
    let alerts = AlertRepo::list_for_record(&pool, record.id).await.unwrap();
    let confirmation = alerts.iter().find(|a| a.name == "breeding_recorded").unwrap();

    assert_eq!(confirmation.notify_on, vec![utc_midnight(date(2025, 1, 3))]);
    assert_eq!(confirmation.message, "Check S1 heat again");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_alerts_without_pen_are_still_created(pool: PgPool) {
    let herd = seed_herd(&pool, "Penless Farm").await;
    let engine = engine(&pool);
    let loose_sow = create_pig(&pool, herd.ctx.farm_id, "S2", "female", None).await;

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&loose_sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let alerts = AlertRepo::list_for_record(&pool, record.id).await.unwrap();
    assert_eq!(alerts.len(), 7);
    assert!(alerts.iter().all(|a| a.pen_id.is_none() && a.pen_name.is_none()));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_deleted_pen_is_not_referenced(pool: PgPool) {
    let herd = seed_herd(&pool, "Moved Farm").await;
    let engine = engine(&pool);
    assert!(PenRepo::soft_delete(&pool, herd.pen.id).await.unwrap());

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let alerts = AlertRepo::list_for_record(&pool, record.id).await.unwrap();
    assert!(alerts.iter().all(|a| a.pen_id.is_none()));
}

// ---------------------------------------------------------------------------
// Test: eligibility rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_second_open_record_is_rejected(pool: PgPool) {
    let herd = seed_herd(&pool, "Open Farm").await;
    let engine = engine(&pool);

    engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let err = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 5)))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        EngineError::Core(CoreError::Validation(msg)) if msg.contains("already has an open breeding record")
    );
    let alerts = AlertRepo::list_for_pig(&pool, herd.sow.id).await.unwrap();
    assert_eq!(alerts.len(), 7, "rejected mating must not leave alerts behind");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_remating_respects_weaning_and_rest(pool: PgPool) {
    let herd = seed_herd(&pool, "Rest Farm").await;
    let engine = engine(&pool);

    let first = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let birth_day = date(2025, 4, 26);
    engine
        .breeding
        .record_birth_outcome(herd.ctx, first.id, &birth(birth_day, 7))
        .await
        .unwrap();

    let too_soon = birth_day + chrono::Days::new(48);
    let err = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, too_soon))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        EngineError::Core(CoreError::Validation(msg)) if msg.contains("re-mated too soon after weaning")
    );

    let eligible = birth_day + chrono::Days::new(50);
    let second = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, eligible))
        .await
        .unwrap();
    assert_eq!(second.mating_date, date(2025, 6, 15));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sow_and_boar_genders_are_checked(pool: PgPool) {
    let herd = seed_herd(&pool, "Gender Farm").await;
    let engine = engine(&pool);

    let swapped = mating(&herd.boar, &herd.sow, date(2025, 1, 1));
    let err = engine.breeding.record_mating(herd.ctx, &swapped).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Core(CoreError::Validation(msg)) if msg.contains("must be female")
    );

    let mut unknown_boar = mating(&herd.sow, &herd.boar, date(2025, 1, 1));
    unknown_boar.boar_id = 999_999;
    let err = engine
        .breeding
        .record_mating(herd.ctx, &unknown_boar)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        EngineError::Core(CoreError::Validation(msg)) if msg.contains("not found")
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_pig_of_another_farm_is_not_found(pool: PgPool) {
    let herd = seed_herd(&pool, "Home Farm").await;
    let other = seed_herd(&pool, "Other Farm").await;
    let engine = engine(&pool);

    let err = engine
        .breeding
        .record_mating(herd.ctx, &mating(&other.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_malformed_dates_are_rejected(pool: PgPool) {
    let herd = seed_herd(&pool, "Date Farm").await;
    let engine = engine(&pool);

    let mut input = mating(&herd.sow, &herd.boar, date(2025, 1, 1));
    input.mating_date = "2025-02-30".to_string();
    let err = engine.breeding.record_mating(herd.ctx, &input).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Core(CoreError::InvalidDate { field: "mating_date", .. })
    );

    let mut input = mating(&herd.sow, &herd.boar, date(2025, 1, 1));
    input.expected_birth_date = "2024-12-01".to_string();
    let err = engine.breeding.record_mating(herd.ctx, &input).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Test: birth outcome
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_birth_outcome_leaves_other_sows_untouched(pool: PgPool) {
    let herd = seed_herd(&pool, "Two Sow Farm").await;
    let engine = engine(&pool);
    let sow2 = create_pig(&pool, herd.ctx.farm_id, "S2", "female", None).await;

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    engine
        .breeding
        .record_mating(herd.ctx, &mating(&sow2, &herd.boar, date(2025, 1, 2)))
        .await
        .unwrap();

    engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(date(2025, 4, 25), 8))
        .await
        .unwrap();

    let other = AlertRepo::list_for_pig(&pool, sow2.id).await.unwrap();
    assert_eq!(other.len(), 7);
    assert!(other.iter().all(|a| a.status == "pending"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_birth_outcome_updates_sow_and_history(pool: PgPool) {
    let herd = seed_herd(&pool, "History Farm").await;
    let engine = engine(&pool);

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let mut outcome = birth(date(2025, 4, 24), 9);
    outcome.notes = Some("easy farrowing".to_string());
    let resolved = engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &outcome)
        .await
        .unwrap();
    assert_eq!(resolved.notes.as_deref(), Some("easy farrowing"));
    assert_eq!(resolved.updated_by, Some(herd.ctx.user_id));

    let sow = PigRepo::find_in_farm(&pool, herd.ctx.farm_id, herd.sow.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!sow.is_pregnant);
    assert_eq!(sow.mated_on, None);
    assert_eq!(sow.last_birth_on, Some(date(2025, 4, 24)));

    let history = BirthHistoryRepo::find_for_record(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(history.total_piglets, 9);
    assert_eq!(history.birth_date, date(2025, 4, 24));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_second_birth_outcome_is_rejected(pool: PgPool) {
    let herd = seed_herd(&pool, "Twice Farm").await;
    let engine = engine(&pool);

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(date(2025, 4, 26), 6))
        .await
        .unwrap();

    let err = engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(date(2025, 4, 27), 6))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        EngineError::Core(CoreError::Validation(msg)) if msg.contains("Resolved")
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_birth_outcome_validates_input(pool: PgPool) {
    let herd = seed_herd(&pool, "Input Farm").await;
    let engine = engine(&pool);

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();

    let err = engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(date(2024, 12, 31), 6))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));

    let err = engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(date(2025, 4, 26), -1))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));

    let other = seed_herd(&pool, "Foreign Farm").await;
    let err = engine
        .breeding
        .record_birth_outcome(other.ctx, record.id, &birth(date(2025, 4, 26), 6))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound { .. }));

    // Nothing changed.
    let pending = AlertScheduler::pending_for_pig(&pool, herd.sow.id).await.unwrap();
    assert_eq!(pending.len(), 7);
}

// ---------------------------------------------------------------------------
// Test: deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_rejects_alerts_and_is_not_repeatable(pool: PgPool) {
    let herd = seed_herd(&pool, "Delete Farm").await;
    let (engine, bus) = engine_at(&pool, date(2025, 1, 1));
    let mut events = bus.subscribe();

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let deleted = engine.breeding.delete_record(herd.ctx, record.id).await.unwrap();
    assert_eq!(deleted.id, record.id);

    let alerts = AlertRepo::list_for_record(&pool, record.id).await.unwrap();
    assert!(alerts.iter().all(|a| a.status == "rejected"));
    assert!(alerts.iter().all(|a| a.resolved_by == Some(herd.ctx.user_id)));

    let sow = PigRepo::find_in_farm(&pool, herd.ctx.farm_id, herd.sow.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!sow.is_pregnant);

    let err = engine
        .breeding
        .delete_record(herd.ctx, record.id)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound { .. }));

    assert_eq!(events.try_recv().unwrap().event_type, BREEDING_MATED);
    assert_eq!(events.try_recv().unwrap().event_type, BREEDING_DELETED);
    assert!(events.try_recv().is_err(), "failed delete must not publish");

    // The sow is free to be mated again.
    engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 10)))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_keeps_alerts_of_previous_litter(pool: PgPool) {
    let herd = seed_herd(&pool, "Second Litter Farm").await;
    let engine = engine(&pool);

    let first = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    let birth_day = date(2025, 4, 26);
    engine
        .breeding
        .record_birth_outcome(herd.ctx, first.id, &birth(birth_day, 6))
        .await
        .unwrap();
    engine
        .litters
        .register_litter(herd.ctx, first.id, &piglets(first.id, 1..=6))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    let second = engine
        .breeding
        .record_mating(
            herd.ctx,
            &mating(&herd.sow, &herd.boar, birth_day + chrono::Days::new(49)),
        )
        .await
        .unwrap();
    engine.breeding.delete_record(herd.ctx, second.id).await.unwrap();

    let second_alerts = AlertRepo::list_for_record(&pool, second.id).await.unwrap();
    assert_eq!(second_alerts.len(), 7);
    assert!(second_alerts
        .iter()
        .all(|a| a.status().unwrap() == AlertStatus::Rejected));

    let first_alerts = AlertRepo::list_for_record(&pool, first.id).await.unwrap();
    let mut still_pending: Vec<_> = first_alerts
        .iter()
        .filter(|a| a.status().unwrap() == AlertStatus::Pending)
        .map(|a| {
            assert_eq!(a.alert_type().unwrap(), AlertType::Birth);
            a.name.as_str()
        })
        .collect();
    still_pending.sort_unstable();
    assert_eq!(
        still_pending,
        vec!["fostering_check", "nesting_box_removal", "relocate_piglets", "weaning"]
    );
    assert!(first_alerts
        .iter()
        .filter(|a| a.alert_type().unwrap() == AlertType::Breeding)
        .all(|a| a.status().unwrap() == AlertStatus::Completed));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_resolved_record_cannot_be_deleted(pool: PgPool) {
    let herd = seed_herd(&pool, "Keep Farm").await;
    let engine = engine(&pool);

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(date(2025, 4, 26), 6))
        .await
        .unwrap();

    let err = engine
        .breeding
        .delete_record(herd.ctx, record.id)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Test: queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_breeding_history_is_newest_first(pool: PgPool) {
    let herd = seed_herd(&pool, "Ledger Farm").await;
    let engine = engine(&pool);

    let first = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();
    engine
        .breeding
        .record_birth_outcome(herd.ctx, first.id, &birth(date(2025, 4, 26), 6))
        .await
        .unwrap();
    let second = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 7, 1)))
        .await
        .unwrap();

    let history = engine
        .breeding
        .get_breeding_history(herd.ctx.farm_id, herd.sow.id)
        .await
        .unwrap();
    let ids: Vec<_> = history.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let err = engine
        .breeding
        .get_breeding_history(herd.ctx.farm_id, 999_999)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_overdue_pregnancies_respect_grace(pool: PgPool) {
    let herd = seed_herd(&pool, "Overdue Farm").await;
    let (engine, _bus) = engine_at(&pool, date(2025, 4, 29));

    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();

    let overdue = engine
        .breeding
        .overdue_pregnancies(herd.ctx.farm_id, 3)
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].record.id, record.id);
    assert_eq!(overdue[0].days_overdue, 4);

    let within_grace = engine
        .breeding
        .overdue_pregnancies(herd.ctx.farm_id, 5)
        .await
        .unwrap();
    assert!(within_grace.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_due_on_matches_notify_dates(pool: PgPool) {
    let herd = seed_herd(&pool, "Due Farm").await;
    let engine = engine(&pool);

    engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, date(2025, 1, 1)))
        .await
        .unwrap();

    let due: Vec<String> = AlertScheduler::due_on(&pool, date(2025, 4, 20))
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(due.len(), 2);
    assert!(due.contains(&"nesting_box".to_string()));
    assert!(due.contains(&"birth_check_day_110".to_string()));

    let mating_day = AlertScheduler::due_on(&pool, date(2025, 1, 1)).await.unwrap();
    assert_eq!(mating_day.len(), 1);
    assert_eq!(mating_day[0].name, "breeding_recorded");
}
