//! Integration tests for culling flags raised when a birth is recorded.

mod common;

use sqlx::PgPool;
use sowcycle_core::types::CalendarDate;
use sowcycle_db::repositories::NotificationRepo;
use sowcycle_engine::Engine;
use sowcycle_events::bus::{BREEDING_BIRTH_RECORDED, CULLING_FLAGGED};

use common::{birth, date, engine, engine_at, mating, seed_herd, Herd, USER_ID};

/// Mate, then record a birth of `litter` piglets.
async fn cycle(engine: &Engine, herd: &Herd, mated: CalendarDate, born: CalendarDate, litter: i32) {
    let record = engine
        .breeding
        .record_mating(herd.ctx, &mating(&herd.sow, &herd.boar, mated))
        .await
        .unwrap();
    engine
        .breeding
        .record_birth_outcome(herd.ctx, record.id, &birth(born, litter))
        .await
        .unwrap();
}

fn count_of(notifications: &[sowcycle_db::models::notification::Notification], kind: &str) -> usize {
    notifications
        .iter()
        .filter(|n| n.notification_type == kind)
        .count()
}

// ---------------------------------------------------------------------------
// Test: single out-of-range litter
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_oversized_first_litter_raises_out_of_range(pool: PgPool) {
    let herd = seed_herd(&pool, "Big Litter Farm").await;
    let (engine, bus) = engine_at(&pool, date(2025, 1, 1));
    let mut events = bus.subscribe();

    cycle(&engine, &herd, date(2025, 1, 1), date(2025, 4, 25), 12).await;

    let notifications = NotificationRepo::list_for_user(&pool, USER_ID).await.unwrap();
    assert_eq!(notifications.len(), 1);
    let flag = &notifications[0];
    assert_eq!(flag.notification_type, "culling.out_of_range_litter");
    assert_eq!(flag.priority, "high");
    assert_eq!(flag.farm_id, Some(herd.ctx.farm_id));
    assert_eq!(flag.payload["sow_id"], herd.sow.id);
    assert_eq!(flag.payload["current_litter"], 12);
    assert!(flag.message.contains("S1"));

    let kinds: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| e.event_type)
        .collect();
    assert!(kinds.contains(&BREEDING_BIRTH_RECORDED.to_string()));
    assert!(kinds.contains(&CULLING_FLAGGED.to_string()));
}

// ---------------------------------------------------------------------------
// Test: healthy litters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_healthy_litters_raise_nothing(pool: PgPool) {
    let herd = seed_herd(&pool, "Healthy Farm").await;
    let engine = engine(&pool);

    cycle(&engine, &herd, date(2024, 1, 1), date(2024, 4, 24), 6).await;
    cycle(&engine, &herd, date(2024, 6, 20), date(2024, 10, 12), 7).await;
    cycle(&engine, &herd, date(2024, 12, 10), date(2025, 4, 3), 6).await;

    let notifications = NotificationRepo::list_for_user(&pool, USER_ID).await.unwrap();
    assert!(notifications.is_empty());
}

// ---------------------------------------------------------------------------
// Test: chronic low yield after three small litters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_three_small_litters_then_small_again_raises_both_flags(pool: PgPool) {
    let herd = seed_herd(&pool, "Small Litter Farm").await;
    let engine = engine(&pool);

    cycle(&engine, &herd, date(2023, 1, 1), date(2023, 4, 25), 4).await;
    cycle(&engine, &herd, date(2023, 6, 20), date(2023, 10, 12), 3).await;
    cycle(&engine, &herd, date(2023, 12, 10), date(2024, 4, 2), 4).await;

    let before = NotificationRepo::list_for_user(&pool, USER_ID).await.unwrap();
    assert_eq!(count_of(&before, "culling.chronic_low_yield"), 0);
    assert_eq!(count_of(&before, "culling.out_of_range_litter"), 3);

    cycle(&engine, &herd, date(2024, 6, 1), date(2024, 9, 23), 4).await;

    let after = NotificationRepo::list_for_user(&pool, USER_ID).await.unwrap();
    assert_eq!(count_of(&after, "culling.chronic_low_yield"), 1);
    assert_eq!(count_of(&after, "culling.out_of_range_litter"), 4);

    let chronic = after
        .iter()
        .find(|n| n.notification_type == "culling.chronic_low_yield")
        .unwrap();
    assert_eq!(chronic.payload["litters"], serde_json::json!([4, 3, 4]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_zero_litters_do_not_count_as_history(pool: PgPool) {
    let herd = seed_herd(&pool, "Empty Litter Farm").await;
    let engine = engine(&pool);

    cycle(&engine, &herd, date(2023, 1, 1), date(2023, 4, 25), 4).await;
    cycle(&engine, &herd, date(2023, 6, 20), date(2023, 10, 12), 0).await;
    cycle(&engine, &herd, date(2023, 12, 10), date(2024, 4, 2), 3).await;
    cycle(&engine, &herd, date(2024, 6, 1), date(2024, 9, 23), 7).await;

    let notifications = NotificationRepo::list_for_user(&pool, USER_ID).await.unwrap();
    assert_eq!(count_of(&notifications, "culling.chronic_low_yield"), 0);
}
