//! Seeds a database file with demo store data.
//!
//! Usage:
//! ```text
//! seed [DB_PATH] [STORE_ID]
//! ```
//! Defaults: `warung.db` in the working directory, store id `store-demo`.

use std::process::ExitCode;

use tracing::{error, info};

use warung_db::bootstrap::seed_demo_store;
use warung_db::pool::{Database, DbConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(|| "warung.db".to_string());
    let store_id = args.next().unwrap_or_else(|| "store-demo".to_string());

    info!(db_path = %db_path, store_id = %store_id, "Seeding demo data");

    let db = match Database::new(DbConfig::new(&db_path)).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to open database");
            return ExitCode::FAILURE;
        }
    };

    match seed_demo_store(&db, &store_id).await {
        Ok(true) => info!("Seeded"),
        Ok(false) => info!("Already seeded, nothing to do"),
        Err(e) => {
            error!(error = %e, "Seeding failed");
            db.close().await;
            return ExitCode::FAILURE;
        }
    }

    db.close().await;
    ExitCode::SUCCESS
}
