use shopsite::config::{catalog, database};
use shopsite::core::{category, product, review};
use shopsite::errors::Result;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load the seed configuration
    let config = catalog::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and ensure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured categories
    category::seed_categories(&db, &config.categories)
        .await
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;

    info!(
        "Catalog ready: {} categories, {} products, {} reviews",
        category::list_categories(&db).await?.len(),
        product::list_products(&db).await?.len(),
        review::list_reviews(&db).await?.len()
    );

    Ok(())
}
