//! Product business logic - Handles all product-related operations.
//!
//! This module provides functions for creating, retrieving, updating, and deleting products.
//! Products are listed in catalog order: ascending by average score with unscored products
//! last, then by ID. Deleting a product removes its reviews in the same transaction.
//! The average score itself is written by whoever aggregates reviews; nothing here derives it.

use crate::{
    core::validate,
    entities::{Category, Product, Review, product, review},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Select, Set, TransactionTrait,
    prelude::*,
    sea_query::{NullOrdering, Order},
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Input for [`create_product`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    /// Name, at most 256 characters
    pub name: String,
    /// Non-negative price
    pub price: i64,
    /// Free-form description
    pub description: String,
    /// Average score in `[0, 5]`, if already known
    #[serde(default)]
    pub avg_score: Option<f64>,
    /// Category to list the product under
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// Partial update for [`update_product`].
///
/// The outer `Option` selects whether a field changes; for `avg_score` and
/// `category_id` the inner `None` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    /// New name
    pub name: Option<String>,
    /// New price
    pub price: Option<i64>,
    /// New description
    pub description: Option<String>,
    /// New average score, or `Some(None)` to clear it
    pub avg_score: Option<Option<f64>>,
    /// New category, or `Some(None)` to detach the product
    pub category_id: Option<Option<i64>>,
}

/// Applies catalog order to a product query.
pub(crate) fn catalog_order(select: Select<Product>) -> Select<Product> {
    select
        .order_by_with_nulls(product::Column::AvgScore, Order::Asc, NullOrdering::Last)
        .order_by_asc(product::Column::Id)
}

async fn ensure_category_exists<C>(db: &C, category_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    if Category::find_by_id(category_id).one(db).await?.is_none() {
        return Err(Error::integrity(format!(
            "category {category_id} does not exist"
        )));
    }
    Ok(())
}

/// Retrieves all products in catalog order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    let products = catalog_order(Product::find()).all(db).await?;
    debug!("Fetched {} products", products.len());
    Ok(products)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The name is blank or longer than 256 characters, or the description is blank
/// - The price is negative or out of range
/// - The average score is present and outside `[0, 5]` or not finite
/// - The category does not exist
/// - The database insert operation fails
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_product(db: &DatabaseConnection, new: NewProduct) -> Result<product::Model> {
    validate::required_text("name", &new.name, Some(validate::NAME_MAX_LEN))?;
    validate::price(new.price)?;
    validate::required_text("description", &new.description, None)?;
    validate::avg_score(new.avg_score)?;

    let txn = db.begin().await?;

    if let Some(category_id) = new.category_id {
        ensure_category_exists(&txn, category_id).await?;
    }

    let created = product::ActiveModel {
        name: Set(new.name),
        price: Set(new.price),
        description: Set(new.description),
        avg_score: Set(new.avg_score),
        category_id: Set(new.category_id),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| Error::from_write(e, "category"))?;

    txn.commit().await?;
    info!(
        "Added product '{}' (ID: {}) priced {} in category {:?}",
        created.name, created.id, created.price, created.category_id
    );
    Ok(created)
}

/// Applies a partial update to a product, validating every supplied field.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist
/// - A supplied field fails validation
/// - The new category does not exist
/// - The database update operation fails
#[instrument(skip(db))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: ProductChanges,
) -> Result<product::Model> {
    if let Some(name) = &changes.name {
        validate::required_text("name", name, Some(validate::NAME_MAX_LEN))?;
    }
    if let Some(price) = changes.price {
        validate::price(price)?;
    }
    if let Some(description) = &changes.description {
        validate::required_text("description", description, None)?;
    }
    if let Some(avg_score) = changes.avg_score {
        validate::avg_score(avg_score)?;
    }

    let txn = db.begin().await?;

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    if let Some(category_id) = changes.category_id {
        if let Some(category_id) = category_id {
            ensure_category_exists(&txn, category_id).await?;
        }
        product.category_id = Set(category_id);
    }
    if let Some(name) = changes.name {
        product.name = Set(name);
    }
    if let Some(price) = changes.price {
        product.price = Set(price);
    }
    if let Some(description) = changes.description {
        product.description = Set(description);
    }
    if let Some(avg_score) = changes.avg_score {
        product.avg_score = Set(avg_score);
    }

    let updated = product
        .update(&txn)
        .await
        .map_err(|e| Error::from_write(e, "category"))?;

    txn.commit().await?;
    info!("Updated product {} ('{}')", updated.id, updated.name);
    Ok(updated)
}

/// Deletes a product and all of its reviews, as one transaction.
///
/// Returns the number of reviews removed along with the product.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist
/// - Any statement fails, in which case nothing is deleted
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let reviews_removed = Review::delete_many()
        .filter(review::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let removed = Product::delete_by_id(product_id)
        .exec(&txn)
        .await?
        .rows_affected;
    if removed != 1 {
        return Err(Error::integrity(format!(
            "expected to delete product {product_id}, deleted {removed} row(s)"
        )));
    }

    txn.commit().await?;
    info!(
        "Deleted product {} together with {} review(s)",
        product_id, reviews_removed
    );
    Ok(reviews_removed)
}
