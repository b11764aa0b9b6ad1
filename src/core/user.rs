//! User mirror operations.
//!
//! Accounts are owned by the external identity subsystem. This module keeps the
//! local row that reviews point at, and removes a user's reviews together with
//! the user.

use crate::{
    core::validate,
    entities::{Review, User, review, user},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Registers a user by username, rejecting blank, overlong or duplicate names.
///
/// # Errors
/// Returns an error if:
/// - The username is blank or longer than 150 characters
/// - Another user already has this username
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_user(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    let username = username.trim();
    validate::required_text("username", username, Some(validate::USERNAME_MAX_LEN))?;

    if get_user_by_username(db, username).await?.is_some() {
        return Err(Error::validation(
            "username",
            format!("user '{username}' already exists"),
        ));
    }

    let created = user::ActiveModel {
        username: Set(username.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| Error::from_write(e, "username"))?;

    info!("Registered user '{}' (ID: {})", created.username, created.id);
    Ok(created)
}

/// Retrieves a user by identity key.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Retrieves a user by username.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes a user and every review they wrote, as one transaction.
///
/// Returns the number of reviews removed along with the user.
///
/// # Errors
/// Returns an error if:
/// - The user does not exist
/// - Any statement fails, in which case nothing is deleted
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let reviews_removed = Review::delete_many()
        .filter(review::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?
        .rows_affected;
    debug!("Removed {} review(s) of user {}", reviews_removed, user_id);

    let removed = User::delete_by_id(user_id).exec(&txn).await?.rows_affected;
    if removed != 1 {
        return Err(Error::integrity(format!(
            "expected to delete user {user_id}, deleted {removed} row(s)"
        )));
    }

    txn.commit().await?;
    info!(
        "Deleted user {} together with {} review(s)",
        user_id, reviews_removed
    );
    Ok(reviews_removed)
}
