use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_gauge_vec, Counter,
    CounterVec, Gauge, GaugeVec,
};
use sqlx::PgPool;
use tracing::{debug, warn};

lazy_static! {
    // ── Event counters ──
    pub static ref COMPLETIONS_COUNTER: CounterVec = register_counter_vec!(
        "mealplan_completions_total",
        "Meal completion attempts by outcome",
        &["status"]
    ).unwrap();

    pub static ref GENERATED_ENTRIES_COUNTER: CounterVec = register_counter_vec!(
        "mealplan_generated_entries_total",
        "Meal plan entries written by generator",
        &["source"]
    ).unwrap();

    pub static ref WEEK_LOADS_COUNTER: Counter = register_counter!(
        "mealplan_week_loads_total",
        "Week views served"
    ).unwrap();

    // ── Snapshot gauges (refreshed by the collector) ──
    pub static ref ENTRIES_GAUGE: GaugeVec = register_gauge_vec!(
        "mealplan_entries",
        "Stored meal plan entries by completion status",
        &["status"]
    ).unwrap();

    pub static ref ACTIVE_DIETS_GAUGE: Gauge = register_gauge!(
        "mealplan_active_diets",
        "Users with an active diet plan"
    ).unwrap();
}

pub fn record_completion(status: &str) {
    COMPLETIONS_COUNTER.with_label_values(&[status]).inc();
}

pub fn record_generated(source: &str, count: u64) {
    GENERATED_ENTRIES_COUNTER
        .with_label_values(&[source])
        .inc_by(count as f64);
}

/// Spawn the background gauge collector (refreshes every 5 minutes).
pub fn start(pool: PgPool) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = collect(&pool).await {
                warn!("Metrics: collection failed: {}", e);
            }
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
        }
    });
}

async fn collect(pool: &PgPool) -> anyhow::Result<()> {
    let counts: Vec<(bool, i64)> = sqlx::query_as(
        "SELECT is_completed, COUNT(*)::BIGINT FROM meal_plans GROUP BY is_completed",
    )
    .fetch_all(pool)
    .await?;

    ENTRIES_GAUGE.with_label_values(&["pending"]).set(0.0);
    ENTRIES_GAUGE.with_label_values(&["completed"]).set(0.0);
    for (completed, count) in counts {
        let status = if completed { "completed" } else { "pending" };
        ENTRIES_GAUGE.with_label_values(&[status]).set(count as f64);
    }

    let active: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM user_diet_plans WHERE is_active")
            .fetch_one(pool)
            .await?;
    ACTIVE_DIETS_GAUGE.set(active as f64);

    debug!("Metrics: collected");
    Ok(())
}
