//! Shared test utilities for `shopsite`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{category, product, review, user},
    entities,
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // one connection, so every query sees the same in-memory database
    options.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with the given username.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, username).await
}

/// Creates a test category.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        category::NewCategory {
            name: name.to_string(),
            slug: slug.to_string(),
        },
    )
    .await
}

/// Builds product input with sensible defaults.
///
/// # Defaults
/// * `price`: 1000
/// * `description`: "Test description"
/// * `avg_score`: None
pub fn new_test_product(name: &str, category_id: Option<i64>) -> product::NewProduct {
    product::NewProduct {
        name: name.to_string(),
        price: 1000,
        description: "Test description".to_string(),
        avg_score: None,
        category_id,
    }
}

/// Creates a test product with sensible defaults.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    category_id: Option<i64>,
) -> Result<entities::product::Model> {
    product::create_product(db, new_test_product(name, category_id)).await
}

/// Creates a test review through the store, stamped with the current time.
pub async fn create_test_review(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    score: i16,
) -> Result<entities::review::Model> {
    review::create_review(
        db,
        review::NewReview {
            text: "Test review".to_string(),
            score,
            user_id,
            product_id,
        },
    )
    .await
}

/// Inserts a review row with a fixed `created_at`, bypassing the store.
/// Use this to test ordering and timestamp handling deterministically.
pub async fn insert_review_at(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    score: i16,
    created_at: DateTime<Utc>,
) -> Result<entities::review::Model> {
    let model = entities::review::ActiveModel {
        text: Set("Test review".to_string()),
        score: Set(score),
        created_at: Set(created_at),
        user_id: Set(user_id),
        product_id: Set(product_id),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Sets up a complete test environment with a category and a product in it.
/// Returns (db, category, product) for product and review tests.
pub async fn setup_with_product() -> Result<(
    DatabaseConnection,
    entities::category::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Test Category", "test-category").await?;
    let product = create_test_product(&db, "Test Product", Some(category.id)).await?;
    Ok((db, category, product))
}
