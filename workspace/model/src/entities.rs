//! This file serves as the root for all SeaORM entity modules.
//! The data models for the subscription tracking application live here.
//! Table and column names keep the original French schema (`abonnement`,
//! `categorie`, `utilisateur`) so existing databases remain readable.

pub mod category;
pub mod subscription;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::category::Entity as Category;
    pub use super::subscription::Entity as Subscription;
    pub use super::user::Entity as User;
}
