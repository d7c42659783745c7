use sea_orm::entity::prelude::*;

/// A user-defined grouping label with a display color ("catégorie").
///
/// The name is unique; subscription creation may also match on the full
/// (name, color) pair when it upserts categories on the fly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categorie")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_categorie")]
    pub id: i32,
    #[sea_orm(column_name = "nom", unique)]
    pub name: String,
    /// Free-form display token, typically a CSS color.
    #[sea_orm(column_name = "couleur")]
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscription,
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
