use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::category;

/// Enum for billing frequencies.
///
/// The string values are the wire format used by the HTTP API as well as the
/// values stored in `frequence_prelevement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(5))")]
pub enum BillingPeriod {
    #[sea_orm(string_value = "week")]
    Week,
    #[sea_orm(string_value = "month")]
    Month,
    #[sea_orm(string_value = "year")]
    Year,
}

impl BillingPeriod {
    /// The wire representation (`week`, `month` or `year`).
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Week => "week",
            BillingPeriod::Month => "month",
            BillingPeriod::Year => "year",
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring payment subscription ("abonnement").
///
/// The table keeps the historical French schema; Rust field names are mapped
/// onto it with `column_name`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "abonnement")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_abonnement")]
    pub id: i32,
    #[sea_orm(column_name = "nom_abonnement", unique)]
    pub name: String,
    #[sea_orm(column_name = "nom_fournisseur")]
    pub supplier: String,
    /// The amount debited per billing period. Never negative.
    #[sea_orm(column_name = "montant", column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_name = "frequence_prelevement")]
    pub period: BillingPeriod,
    /// The next due date of the subscription.
    #[sea_orm(column_name = "date_echeance")]
    pub due_date: NaiveDate,
    /// End of the contractual lock-in. Present iff the subscription is
    /// under commitment, and always after `due_date`.
    #[sea_orm(column_name = "date_fin_engagement")]
    pub commitment_end: Option<NaiveDate>,
    /// Nullable in storage: legacy rows hold NULL, which reads as `false`.
    #[sea_orm(column_name = "is_engagement")]
    pub is_commitment: Option<bool>,
    #[sea_orm(column_name = "id_categorie")]
    pub category_id: i32,
}

impl Model {
    /// The commitment flag with NULL normalized to `false`.
    pub fn commitment_flag(&self) -> bool {
        self.is_commitment.unwrap_or(false)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
