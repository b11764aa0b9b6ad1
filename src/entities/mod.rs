//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod product;
pub mod review;
pub mod user;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};

/// Singular and plural labels an administrative UI shows for an entity.
pub trait AdminLabel {
    /// Label for a single record
    const VERBOSE_NAME: &'static str;
    /// Label for the record list
    const VERBOSE_NAME_PLURAL: &'static str;
}

impl AdminLabel for Category {
    const VERBOSE_NAME: &'static str = "категория";
    const VERBOSE_NAME_PLURAL: &'static str = "Категории";
}

impl AdminLabel for Product {
    const VERBOSE_NAME: &'static str = "товар";
    const VERBOSE_NAME_PLURAL: &'static str = "Товары";
}

impl AdminLabel for Review {
    const VERBOSE_NAME: &'static str = "отзыв";
    const VERBOSE_NAME_PLURAL: &'static str = "Отзывы";
}
