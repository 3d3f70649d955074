use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};

pub mod memory;
pub mod models;
pub mod repositories;
pub mod types;
pub mod utils;

pub async fn init_database(database_url: &str, max_connections: u32) -> Result<PgPool> {
    // Create connection pool
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // Run migrations
    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}
