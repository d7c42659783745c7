//! Validated data-access layer for the subscription tracker.
//!
//! Each store wraps an injected [`sea_orm::DatabaseConnection`] handle and is
//! the sole entry point for its entity's lifecycle: all integrity rules are
//! enforced here, before any write reaches the database.

pub mod category;
pub mod error;
pub mod subscription;
pub mod user;

pub use category::CategoryStore;
pub use error::{Result, StoreError};
pub use subscription::{CategoryRef, NewSubscription, SubscriptionPatch, SubscriptionStore};
pub use user::{NewUser, UserPatch, UserStore};
