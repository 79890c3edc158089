use serde::Serialize;
use sowcycle_core::types::CalendarDate;
use sowcycle_db::repositories::FarmRepo;
use sowcycle_db::DbPool;
use sowcycle_engine::{AlertScheduler, BreedingRecordManager, EngineResult};

/// Counts produced by one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub day: CalendarDate,
    pub farms: usize,
    pub due_alerts: usize,
    pub overdue_pregnancies: usize,
}

/// Log every pending alert due on `day` and every overdue pregnancy.
pub async fn run(
    pool: &DbPool,
    breeding: &BreedingRecordManager,
    day: CalendarDate,
    grace_days: i64,
) -> EngineResult<SweepReport> {
    let due = AlertScheduler::due_on(pool, day).await?;
    for alert in &due {
        tracing::info!(
            farm_id = alert.farm_id,
            pig_id = alert.pig_id,
            alert_id = alert.id,
            name = %alert.name,
            severity = %alert.severity,
            pen = alert.pen_name.as_deref().unwrap_or("unknown"),
            starts = %alert.start_day(),
            "Alert due"
        );
    }

    let farms = FarmRepo::list(pool).await?;
    let mut overdue_pregnancies = 0;
    for farm in &farms {
        let overdue = breeding.overdue_pregnancies(farm.id, grace_days).await?;
        for pregnancy in &overdue {
            tracing::warn!(
                farm_id = farm.id,
                record_id = pregnancy.record.id,
                sow_id = pregnancy.record.sow_id,
                expected = %pregnancy.expected_birth_date,
                days_overdue = pregnancy.days_overdue,
                "Pregnancy overdue"
            );
        }
        overdue_pregnancies += overdue.len();
    }

    Ok(SweepReport {
        day,
        farms: farms.len(),
        due_alerts: due.len(),
        overdue_pregnancies,
    })
}
