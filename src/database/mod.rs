use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};

pub mod models;
pub mod repositories;
pub mod store;
pub mod utils;

pub use store::PgStore;

pub async fn init_database(database_url: &str, max_connections: u32) -> Result<PgPool> {
    log::info!("Connecting to database (max {} connections)", max_connections);
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}
