//! Store operations, one module per entity.
//!
//! Each module takes a database connection, validates its input structs and
//! enforces the referential rules of its entity inside the same transaction as
//! the triggering write.

pub mod category;
pub mod product;
pub mod review;
pub mod user;
pub mod validate;
