//! Seed meal plans for development and demos.
//!
//! Usage:
//!   seed-plans daily  --user-id UUID [--start DATE] [--end DATE]
//!   seed-plans diet   --user-id UUID --diet-plan-id UUID --diet-type keto [--calories 1800]
//!   seed-plans weekly --diet-plan-id UUID [--weeks 4]
//!
//! Dated plans are written straight to DATABASE_URL, or through a running API
//! when --api-url is given (the token is signed with JWT_SECRET). Weekly
//! templates always go to the database.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures_util::stream::{self, StreamExt};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use mealplan_api::calendar::CalendarDay;
use mealplan_api::middleware::auth::issue_access_token;
use mealplan_api::models::meal_plan::NewMealPlanEntry;
use mealplan_api::services::diet_plans::DietPlanService;
use mealplan_api::services::generator::{generate_daily_meal_plans, generate_diet_meal_plans};
use mealplan_api::store::http::HttpMealPlanStore;
use mealplan_api::store::postgres::PgMealPlanStore;
use mealplan_api::store::{MealPlanStore, StoreResult};

#[derive(Parser)]
#[command(name = "seed-plans", about = "Seed meal plans for a user or a diet")]
struct Args {
    /// Write through this API instead of the database
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Entries per bulk insert
    #[arg(long, global = true, default_value_t = 100)]
    chunk_size: usize,

    /// Bulk inserts in flight at once
    #[arg(long, global = true, default_value_t = 4)]
    concurrency: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generic plan: the same four meals every day
    Daily {
        #[arg(long)]
        user_id: Uuid,
        /// First day (default: today)
        #[arg(long)]
        start: Option<CalendarDay>,
        /// Last day (default: start + 29 days)
        #[arg(long)]
        end: Option<CalendarDay>,
    },
    /// Rotating menu of a diet type
    Diet {
        #[arg(long)]
        user_id: Uuid,
        #[arg(long)]
        diet_plan_id: Uuid,
        #[arg(long)]
        diet_type: String,
        #[arg(long, default_value_t = 2000)]
        calories: u32,
        #[arg(long)]
        start: Option<CalendarDay>,
        #[arg(long)]
        end: Option<CalendarDay>,
    },
    /// Week-numbered template plan of a diet
    Weekly {
        #[arg(long)]
        diet_plan_id: Uuid,
        #[arg(long, default_value_t = 4)]
        weeks: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let (user_id, entries) = match args.command {
        Command::Weekly {
            diet_plan_id,
            weeks,
        } => {
            let pool = connect().await?;
            let meals = DietPlanService::generate_weekly_meals(&pool, diet_plan_id, weeks).await?;
            tracing::info!("Stored {} weekly meals for diet {}", meals.len(), diet_plan_id);
            return Ok(());
        }
        Command::Daily { user_id, start, end } => {
            let (start, end) = period(start, end)?;
            (user_id, generate_daily_meal_plans(None, start, end))
        }
        Command::Diet {
            user_id,
            diet_plan_id,
            diet_type,
            calories,
            start,
            end,
        } => {
            let (start, end) = period(start, end)?;
            let entries = generate_diet_meal_plans(diet_plan_id, &diet_type, calories, start, end);
            (user_id, entries)
        }
    };

    tracing::info!("Generated {} entries for user {}", entries.len(), user_id);

    let written = match args.api_url {
        Some(url) => {
            let secret = std::env::var("JWT_SECRET").context("JWT_SECRET required with --api-url")?;
            let token = issue_access_token(user_id, &secret, 3600)?;
            let store = HttpMealPlanStore::new(url, token);
            insert_chunks(&store, user_id, &entries, args.chunk_size, args.concurrency).await?
        }
        None => {
            let store = PgMealPlanStore::new(connect().await?);
            insert_chunks(&store, user_id, &entries, args.chunk_size, args.concurrency).await?
        }
    };

    // Chunk failures have already returned; the rest met taken slots.
    tracing::info!(
        "Seed complete: {} written, {} skipped (slot taken)",
        written,
        entries.len() as u64 - written
    );
    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")
}

fn period(
    start: Option<CalendarDay>,
    end: Option<CalendarDay>,
) -> Result<(CalendarDay, CalendarDay)> {
    let start = start.unwrap_or_else(CalendarDay::today);
    let end = match end {
        Some(end) => end,
        None => start.add_days(29)?,
    };
    anyhow::ensure!(start <= end, "start {} is after end {}", start, end);
    Ok((start, end))
}

async fn insert_chunks<S: MealPlanStore>(
    store: &S,
    user_id: Uuid,
    entries: &[NewMealPlanEntry],
    chunk_size: usize,
    concurrency: usize,
) -> Result<u64> {
    let results: Vec<_> = stream::iter(entries.chunks(chunk_size.max(1)))
        .map(|chunk| async move {
            let result = store.bulk_insert_meal_plans(user_id, chunk).await;
            (chunk.len(), result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    tally(results)
}

/// Sums the written counts of every chunk. Any failed chunk fails the run,
/// after the chunks that did land are reported.
fn tally(results: Vec<(usize, StoreResult<u64>)>) -> Result<u64> {
    let mut written = 0;
    let mut failed_chunks = 0;
    let mut failed_entries = 0;
    for (len, result) in results {
        match result {
            Ok(n) => written += n,
            Err(e) => {
                tracing::error!("Bulk insert of {} entries failed: {}", len, e);
                failed_chunks += 1;
                failed_entries += len;
            }
        }
    }
    if failed_chunks > 0 {
        anyhow::bail!(
            "{} chunk(s) failed ({} entries not written), {} entries written",
            failed_chunks,
            failed_entries,
            written
        );
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealplan_api::store::memory::InMemoryMealPlanStore;
    use mealplan_api::store::StoreError;

    fn day(s: &str) -> CalendarDay {
        CalendarDay::parse(s).unwrap()
    }

    #[test]
    fn failed_chunks_fail_the_run() {
        let results = vec![
            (4, Ok(4)),
            (4, Err(StoreError::Unexpected("connection reset".into()))),
            (2, Ok(1)),
        ];
        let err = tally(results).unwrap_err().to_string();
        assert!(err.contains("1 chunk(s) failed"), "{err}");
        assert!(err.contains("4 entries not written"), "{err}");
        assert!(err.contains("5 entries written"), "{err}");
    }

    #[test]
    fn skipped_slots_are_not_failures() {
        assert_eq!(tally(vec![(4, Ok(4)), (4, Ok(0))]).unwrap(), 4);
    }

    #[tokio::test]
    async fn chunks_are_written_to_the_store() {
        let store = InMemoryMealPlanStore::new();
        let user = Uuid::new_v4();
        let entries = generate_daily_meal_plans(None, day("2024-06-10"), day("2024-06-16"));

        let written = insert_chunks(&store, user, &entries, 5, 2).await.unwrap();
        assert_eq!(written, 28);

        // A second run only meets taken slots.
        let again = insert_chunks(&store, user, &entries, 5, 2).await.unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn period_defaults_to_thirty_days() {
        let (start, end) = period(Some(day("2024-06-01")), None).unwrap();
        assert_eq!((start, end), (day("2024-06-01"), day("2024-06-30")));
        assert!(period(Some(day("2024-06-10")), Some(day("2024-06-01"))).is_err());
    }
}
