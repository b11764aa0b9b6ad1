//! Review business logic - Handles all review-related operations.
//!
//! A review references exactly one user and one product, both of which must exist
//! when it is written. `created_at` is stamped here on insert and is not part of
//! [`ReviewChanges`]; updates write only `text` and `score`, so the timestamp cannot
//! move after creation. Reviews are listed oldest first.

use crate::{
    core::validate,
    entities::{Product, Review, User, review},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Select, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Input for [`create_review`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewReview {
    /// Review body
    pub text: String,
    /// Score from 0 to 5
    pub score: i16,
    /// Author
    pub user_id: i64,
    /// Reviewed product
    pub product_id: i64,
}

/// Partial update for [`update_review`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewChanges {
    /// New review body
    pub text: Option<String>,
    /// New score
    pub score: Option<i16>,
}

fn oldest_first(select: Select<Review>) -> Select<Review> {
    select
        .order_by_asc(review::Column::CreatedAt)
        .order_by_asc(review::Column::Id)
}

/// Creates a review stamped with the current time.
///
/// # Errors
/// Returns an error if:
/// - The text is blank
/// - The score is outside `[0, 5]`
/// - The user or the product does not exist
/// - The database insert operation fails
#[instrument(skip(db, new), fields(user_id = new.user_id, product_id = new.product_id))]
pub async fn create_review(db: &DatabaseConnection, new: NewReview) -> Result<review::Model> {
    validate::required_text("text", &new.text, None)?;
    validate::score(new.score)?;

    let txn = db.begin().await?;

    if User::find_by_id(new.user_id).one(&txn).await?.is_none() {
        return Err(Error::integrity(format!(
            "user {} does not exist",
            new.user_id
        )));
    }
    if Product::find_by_id(new.product_id).one(&txn).await?.is_none() {
        return Err(Error::integrity(format!(
            "product {} does not exist",
            new.product_id
        )));
    }

    let created = review::ActiveModel {
        text: Set(new.text),
        score: Set(new.score),
        created_at: Set(chrono::Utc::now()),
        user_id: Set(new.user_id),
        product_id: Set(new.product_id),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| Error::from_write(e, "review"))?;

    txn.commit().await?;
    info!(
        "User {} reviewed product {} with score {} (review ID: {})",
        created.user_id, created.product_id, created.score, created.id
    );
    Ok(created)
}

/// Retrieves a specific review by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_review_by_id(
    db: &DatabaseConnection,
    review_id: i64,
) -> Result<Option<review::Model>> {
    Review::find_by_id(review_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all reviews, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_reviews(db: &DatabaseConnection) -> Result<Vec<review::Model>> {
    let reviews = oldest_first(Review::find()).all(db).await?;
    debug!("Fetched {} reviews", reviews.len());
    Ok(reviews)
}

/// Retrieves the reviews of one product, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_reviews_for_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<review::Model>> {
    oldest_first(Review::find().filter(review::Column::ProductId.eq(product_id)))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the reviews written by one user, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_reviews_by_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<review::Model>> {
    oldest_first(Review::find().filter(review::Column::UserId.eq(user_id)))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the text and/or score of a review. `created_at` is never written.
///
/// # Errors
/// Returns an error if:
/// - A supplied field fails validation
/// - The review does not exist
/// - The database update operation fails
#[instrument(skip(db, changes))]
pub async fn update_review(
    db: &DatabaseConnection,
    review_id: i64,
    changes: ReviewChanges,
) -> Result<review::Model> {
    if let Some(text) = &changes.text {
        validate::required_text("text", text, None)?;
    }
    if let Some(score) = changes.score {
        validate::score(score)?;
    }

    let txn = db.begin().await?;

    Review::find_by_id(review_id)
        .one(&txn)
        .await?
        .ok_or(Error::ReviewNotFound { id: review_id })?;

    let mut update = Review::update_many().filter(review::Column::Id.eq(review_id));
    let mut touched = false;
    if let Some(text) = changes.text {
        update = update.col_expr(review::Column::Text, Expr::value(text));
        touched = true;
    }
    if let Some(score) = changes.score {
        update = update.col_expr(review::Column::Score, Expr::value(score));
        touched = true;
    }
    if touched {
        update.exec(&txn).await?;
    }

    let updated = Review::find_by_id(review_id)
        .one(&txn)
        .await?
        .ok_or(Error::ReviewNotFound { id: review_id })?;

    txn.commit().await?;
    info!("Updated review {}", updated.id);
    Ok(updated)
}

/// Deletes a single review.
///
/// # Errors
/// Returns an error if the review does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_review(db: &DatabaseConnection, review_id: i64) -> Result<()> {
    let removed = Review::delete_by_id(review_id)
        .exec(db)
        .await?
        .rows_affected;
    if removed == 0 {
        return Err(Error::ReviewNotFound { id: review_id });
    }
    info!("Deleted review {}", review_id);
    Ok(())
}
