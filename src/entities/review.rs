//! Review entity - A user's scored opinion of a product.
//!
//! Each review has a `text`, a `score` in `[0, 5]`, a `created_at` stamped on
//! insert, and references to its `user_id` and `product_id`. Deleting either
//! parent removes the review.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Unique identifier for the review
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Review body
    #[sea_orm(column_type = "Text")]
    pub text: String,
    /// Score from 0 to 5
    pub score: i16,
    /// When the review was created, never changed afterwards
    pub created_at: DateTimeUtc,
    /// Author of the review
    pub user_id: i64,
    /// Reviewed product
    pub product_id: i64,
}

/// Defines relationships between Review and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review is written by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each review is about one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
