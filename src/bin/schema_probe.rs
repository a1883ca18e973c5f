//! Offline schema probe.
//!
//! Attempts a trial insert against a table to check that the expected
//! columns exist. On success the probe row is deleted so no test data is
//! left behind; on failure the backend's error message is printed for
//! manual inspection. A diagnostic, not part of the running service.

use anyhow::{bail, Context, Result};
use clap::Parser;
use uuid::Uuid;

use visage_api::database::manager::DatabaseManager;

#[derive(Parser, Debug)]
#[command(name = "schema_probe", about = "Trial-insert against a table to verify its columns")]
struct Args {
    /// Table to probe: video_jobs or avatars
    #[arg(long, default_value = "video_jobs")]
    table: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    if let Err(e) = probe(&args.table).await {
        eprintln!("Probe failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

async fn probe(table: &str) -> Result<()> {
    let pool = DatabaseManager::service_pool().context("database pool")?;

    match table {
        "video_jobs" => {
            let job_id = format!("probe_{}", Uuid::new_v4().simple());
            println!("Probing video_jobs with job_id {job_id}...");

            let insert = sqlx::query(
                "INSERT INTO video_jobs (job_id, status, progress, progress_message)
                 VALUES ($1, 'pending', 0, '')",
            )
            .bind(&job_id)
            .execute(&pool)
            .await;

            match insert {
                Ok(_) => {
                    println!("Insert succeeded; expected columns exist. Cleaning up.");
                    sqlx::query("DELETE FROM video_jobs WHERE job_id = $1")
                        .bind(&job_id)
                        .execute(&pool)
                        .await
                        .context("cleanup delete")?;
                }
                Err(e) => println!("Insert failed:\n{e}"),
            }
        }
        "avatars" => {
            let probe_id = Uuid::new_v4();
            println!("Probing avatars with id {probe_id}...");

            // user_id is a foreign key; a random uuid keeps the column check
            // honest even though the insert may fail on the constraint.
            let insert = sqlx::query(
                "INSERT INTO avatars (id, user_id, image_url, prompt)
                 VALUES ($1, $2, NULL, NULL)",
            )
            .bind(probe_id)
            .bind(Uuid::new_v4())
            .execute(&pool)
            .await;

            match insert {
                Ok(_) => {
                    println!("Insert succeeded; expected columns exist. Cleaning up.");
                    sqlx::query("DELETE FROM avatars WHERE id = $1")
                        .bind(probe_id)
                        .execute(&pool)
                        .await
                        .context("cleanup delete")?;
                }
                Err(e) => println!("Insert failed:\n{e}"),
            }
        }
        other => bail!("unknown table '{other}', expected video_jobs or avatars"),
    }

    Ok(())
}
