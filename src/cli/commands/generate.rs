use anyhow::Result;
use chrono::NaiveDate;
use engine::batch;
use sea_orm::Database;
use tracing::{debug, error, info, trace};

pub async fn generate_expected(database_url: &str, as_of: Option<NaiveDate>) -> Result<()> {
    trace!("Entering generate_expected function");
    info!("Running expected-transaction generation for all active templates");
    debug!("Database URL: {}", database_url);

    let db = match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    let outcome = match as_of {
        Some(today) => {
            debug!("Generating as of {}", today);
            batch::generate_for_all_active_as_of(&db, today).await
        }
        None => batch::generate_for_all_active(&db).await,
    };

    match outcome {
        Ok(outcome) => {
            info!(
                "Generation completed: {} templates processed, {} expected transactions created",
                outcome.templates_processed, outcome.rows_created
            );
            Ok(())
        }
        Err(e) => {
            error!("Generation failed, nothing was committed: {}", e);
            Err(e.into())
        }
    }
}
