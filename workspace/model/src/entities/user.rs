use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// An account holder ("utilisateur").
///
/// `password` always holds a bcrypt hash, never a plaintext value.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "utilisateur")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_utilisateur")]
    pub id: i32,
    #[sea_orm(column_name = "mail", unique)]
    pub mail: String,
    #[sea_orm(column_name = "motdepasse")]
    pub password: String,
    #[sea_orm(column_name = "nom")]
    pub last_name: Option<String>,
    #[sea_orm(column_name = "prenom")]
    pub first_name: Option<String>,
    #[sea_orm(column_name = "telephone")]
    pub phone: Option<String>,
    #[sea_orm(column_name = "salaire", column_type = "Decimal(Some((16, 4)))", nullable)]
    pub salary: Option<Decimal>,
    #[sea_orm(column_name = "ismailverif", default_value = "false")]
    pub email_verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
