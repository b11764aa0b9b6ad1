//! Category business logic - Handles all category-related operations.
//!
//! Categories are created by staff and addressed externally by their slug.
//! Deleting a category never deletes products: every product listed under it
//! has its `category_id` cleared in the same transaction as the delete, so no
//! reader can observe a product pointing at a removed category.

use crate::{
    config::catalog::CategoryConfig,
    core::{product::catalog_order, validate},
    entities::{Category, Product, category, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Input for [`create_category`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    /// Display name, at most 256 characters
    pub name: String,
    /// URL identifier: latin letters, digits, hyphen and underscore
    pub slug: String,
}

/// Partial update for [`update_category`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryChanges {
    /// New display name
    pub name: Option<String>,
    /// New slug
    pub slug: Option<String>,
}

async fn ensure_slug_free<C>(db: &C, slug: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(existing) = get_category_by_slug(db, slug).await? {
        if Some(existing.id) != except_id {
            return Err(Error::validation(
                "slug",
                format!("category with slug '{slug}' already exists"),
            ));
        }
    }
    Ok(())
}

/// Creates a category after validating its name and slug.
///
/// # Errors
/// Returns an error if:
/// - The name is blank or longer than 256 characters
/// - The slug is empty, too long, contains disallowed characters or is taken
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_category<C>(db: &C, new: NewCategory) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    validate::required_text("name", &new.name, Some(validate::NAME_MAX_LEN))?;
    validate::slug(&new.slug)?;
    ensure_slug_free(db, &new.slug, None).await?;

    let created = category::ActiveModel {
        name: Set(new.name),
        slug: Set(new.slug),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| Error::from_write(e, "slug"))?;

    info!(
        "Created category '{}' (ID: {}, slug: {})",
        created.name, created.id, created.slug
    );
    Ok(created)
}

/// Retrieves a category by its ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by its slug.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_category_by_slug<C>(db: &C, slug: &str) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all categories ordered by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    let categories = Category::find()
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?;
    debug!("Fetched {} categories", categories.len());
    Ok(categories)
}

/// Applies a partial update to a category.
///
/// # Errors
/// Returns an error if:
/// - The category does not exist
/// - A supplied field fails validation, or the new slug belongs to another category
/// - The database update operation fails
#[instrument(skip(db))]
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    changes: CategoryChanges,
) -> Result<category::Model> {
    if let Some(name) = &changes.name {
        validate::required_text("name", name, Some(validate::NAME_MAX_LEN))?;
    }
    if let Some(slug) = &changes.slug {
        validate::slug(slug)?;
    }

    let mut category: category::ActiveModel = Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            key: category_id.to_string(),
        })?
        .into();

    if let Some(slug) = changes.slug {
        ensure_slug_free(db, &slug, Some(category_id)).await?;
        category.slug = Set(slug);
    }
    if let Some(name) = changes.name {
        category.name = Set(name);
    }

    let updated = category
        .update(db)
        .await
        .map_err(|e| Error::from_write(e, "slug"))?;
    info!("Updated category {} ('{}')", updated.id, updated.name);
    Ok(updated)
}

/// Deletes a category, detaching its products in the same transaction.
///
/// Returns the number of products whose category was cleared.
///
/// # Errors
/// Returns an error if:
/// - The category does not exist
/// - Any statement fails, in which case nothing changes
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    Category::find_by_id(category_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            key: category_id.to_string(),
        })?;

    let detached = Product::update_many()
        .col_expr(product::Column::CategoryId, Expr::value(Option::<i64>::None))
        .filter(product::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let removed = Category::delete_by_id(category_id)
        .exec(&txn)
        .await?
        .rows_affected;
    if removed != 1 {
        return Err(Error::integrity(format!(
            "expected to delete category {category_id}, deleted {removed} row(s)"
        )));
    }

    txn.commit().await?;
    info!(
        "Deleted category {}; {} product(s) left without a category",
        category_id, detached
    );
    Ok(detached)
}

/// Retrieves the products listed under a category, in catalog order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_products_in_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Vec<product::Model>> {
    catalog_order(Product::find().filter(product::Column::CategoryId.eq(category_id)))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates the configured categories whose slug does not exist yet.
///
/// Runs in one transaction; returns how many categories were created.
///
/// # Errors
/// Returns an error if a configured entry fails validation or a statement fails,
/// in which case nothing is seeded.
#[instrument(skip(db, seeds))]
pub async fn seed_categories(db: &DatabaseConnection, seeds: &[CategoryConfig]) -> Result<usize> {
    info!(
        "Seeding categories. Found {} configuration entries.",
        seeds.len()
    );
    let txn = db.begin().await?;

    let mut created = 0;
    for seed in seeds {
        if get_category_by_slug(&txn, &seed.slug).await?.is_some() {
            warn!("Category '{}' already exists. Skipping.", seed.slug);
            continue;
        }
        create_category(
            &txn,
            NewCategory {
                name: seed.name.clone(),
                slug: seed.slug.clone(),
            },
        )
        .await?;
        created += 1;
    }

    txn.commit().await?;
    info!("Finished seeding categories, {} created.", created);
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::product::{NewProduct, create_product, get_product_by_id};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn books() -> NewCategory {
        NewCategory {
            name: "Books".to_string(),
            slug: "books".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_category_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_category(
            &db,
            NewCategory {
                name: String::new(),
                slug: "books".to_string(),
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        let result = create_category(
            &db,
            NewCategory {
                name: "x".repeat(257),
                slug: "books".to_string(),
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        let result = create_category(
            &db,
            NewCategory {
                name: "Books".to_string(),
                slug: "books & more".to_string(),
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "slug", .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_category_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_category(&db, books()).await?;
        assert_eq!(created.name, "Books");
        assert_eq!(created.slug, "books");

        let by_slug = get_category_by_slug(&db, "books").await?.unwrap();
        assert_eq!(by_slug, created);
        let by_id = get_category_by_id(&db, created.id).await?.unwrap();
        assert_eq!(by_id, created);
        assert!(get_category_by_slug(&db, "music").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, books()).await?;

        let result = create_category(
            &db,
            NewCategory {
                name: "Other books".to_string(),
                slug: "books".to_string(),
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "slug", .. }
        ));
        assert_eq!(list_categories(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_categories_ordered_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Toys", "toys").await?;
        create_test_category(&db, "Books", "books").await?;
        create_test_category(&db, "Music", "music").await?;

        let names: Vec<String> = list_categories(&db)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Books", "Music", "Toys"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_category_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let books = create_category(&db, books()).await?;
        let music = create_test_category(&db, "Music", "music").await?;

        let updated = update_category(
            &db,
            books.id,
            CategoryChanges {
                name: Some("Printed books".to_string()),
                slug: Some("printed-books".to_string()),
            },
        )
        .await?;
        assert_eq!(updated.name, "Printed books");
        assert_eq!(updated.slug, "printed-books");

        // keeping its own slug is fine
        let same = update_category(
            &db,
            books.id,
            CategoryChanges {
                slug: Some("printed-books".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(same.slug, "printed-books");

        // taking another category's slug is not
        let result = update_category(
            &db,
            music.id,
            CategoryChanges {
                slug: Some("printed-books".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "slug", .. }
        ));

        let result = update_category(&db, 999, CategoryChanges::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CategoryNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_detaches_products() -> Result<()> {
        let db = setup_test_db().await?;
        let books = create_category(&db, books()).await?;
        let music = create_test_category(&db, "Music", "music").await?;

        let novel = create_test_product(&db, "Novel", Some(books.id)).await?;
        let atlas = create_test_product(&db, "Atlas", Some(books.id)).await?;
        let vinyl = create_test_product(&db, "Vinyl", Some(music.id)).await?;

        let detached = delete_category(&db, books.id).await?;
        assert_eq!(detached, 2);
        assert!(get_category_by_id(&db, books.id).await?.is_none());

        let novel = get_product_by_id(&db, novel.id).await?.unwrap();
        let atlas = get_product_by_id(&db, atlas.id).await?.unwrap();
        let vinyl = get_product_by_id(&db, vinyl.id).await?.unwrap();
        assert_eq!(novel.category_id, None);
        assert_eq!(atlas.category_id, None);
        assert_eq!(vinyl.category_id, Some(music.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = delete_category(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CategoryNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_products_in_category() -> Result<()> {
        let db = setup_test_db().await?;
        let books = create_category(&db, books()).await?;

        create_product(
            &db,
            NewProduct {
                avg_score: Some(4.0),
                ..new_test_product("Novel", Some(books.id))
            },
        )
        .await?;
        create_product(
            &db,
            NewProduct {
                avg_score: Some(2.5),
                ..new_test_product("Atlas", Some(books.id))
            },
        )
        .await?;
        create_test_product(&db, "Loose", None).await?;

        let names: Vec<String> = get_products_in_category(&db, books.id)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Atlas", "Novel"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_categories_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, books()).await?;

        let seeds = vec![
            CategoryConfig {
                name: "Books".to_string(),
                slug: "books".to_string(),
            },
            CategoryConfig {
                name: "Music".to_string(),
                slug: "music".to_string(),
            },
        ];

        assert_eq!(seed_categories(&db, &seeds).await?, 1);
        assert_eq!(seed_categories(&db, &seeds).await?, 0);
        assert_eq!(list_categories(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_categories_invalid_entry_seeds_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let seeds = vec![
            CategoryConfig {
                name: "Music".to_string(),
                slug: "music".to_string(),
            },
            CategoryConfig {
                name: "Bad".to_string(),
                slug: "bad slug".to_string(),
            },
        ];

        let result = seed_categories(&db, &seeds).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "slug", .. }
        ));
        assert!(list_categories(&db).await?.is_empty());

        Ok(())
    }
}
