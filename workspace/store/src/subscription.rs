use chrono::NaiveDate;
use model::entities::prelude::Subscription;
use model::entities::subscription::{self, BillingPeriod};
use model::entities::category;
use rust_decimal::Decimal;
use sea_orm::sea_query::JoinType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QuerySelect, RelationTrait, Set,
};
use tracing::{debug, info, instrument};

use crate::category::CategoryStore;
use crate::error::{on_unique_violation, Result, StoreError};

/// Parses the wire form of a billing frequency.
pub fn parse_period(value: &str) -> Result<BillingPeriod> {
    match value {
        "week" => Ok(BillingPeriod::Week),
        "month" => Ok(BillingPeriod::Month),
        "year" => Ok(BillingPeriod::Year),
        other => Err(StoreError::InvalidFrequency(other.to_string())),
    }
}

/// The category a new subscription attaches to: either a known id, or a
/// (name, color) pair resolved through the category store on write.
#[derive(Debug, Clone)]
pub enum CategoryRef {
    Id(i32),
    Named { name: String, color: String },
}

/// Input for creating a subscription.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub name: String,
    pub supplier: String,
    pub amount: Decimal,
    /// Wire form, one of `week`/`month`/`year`.
    pub period: String,
    pub due_date: NaiveDate,
    pub is_commitment: bool,
    pub commitment_end: Option<NaiveDate>,
    pub category: CategoryRef,
}

/// Fields of a partial subscription update. Only supplied fields end up in
/// the generated update statement.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub supplier: Option<String>,
    pub amount: Option<Decimal>,
    pub period: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_commitment: Option<bool>,
    pub commitment_end: Option<NaiveDate>,
    pub category_id: Option<i32>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.supplier.is_none()
            && self.amount.is_none()
            && self.period.is_none()
            && self.due_date.is_none()
            && self.is_commitment.is_none()
            && self.commitment_end.is_none()
            && self.category_id.is_none()
    }
}

/// A subscription joined with its category, for display lists.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SubscriptionWithCategory {
    pub name: String,
    pub supplier: String,
    pub amount: Decimal,
    pub period: BillingPeriod,
    pub due_date: NaiveDate,
    pub commitment_end: Option<NaiveDate>,
    pub is_commitment: Option<bool>,
    pub category_name: String,
    pub category_color: String,
}

impl SubscriptionWithCategory {
    pub fn commitment_flag(&self) -> bool {
        self.is_commitment.unwrap_or(false)
    }
}

/// The sole entry point for subscription lifecycle operations.
///
/// Every create and update goes through the validation below before a write
/// is issued; the unique key on the name column backs the duplicate checks
/// under concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SubscriptionStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_all(&self) -> Result<Vec<subscription::Model>> {
        Ok(Subscription::find().all(self.db).await?)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<subscription::Model> {
        Subscription::find()
            .filter(subscription::Column::Name.eq(name))
            .one(self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("subscription '{name}'")))
    }

    /// Validates and inserts one subscription.
    ///
    /// Validation order: duplicate name, frequency, commitment-end presence
    /// when under commitment, date ordering. A (name, color) category
    /// reference is resolved (upsert-on-write) before the insert.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn insert(&self, input: NewSubscription) -> Result<subscription::Model> {
        let taken = Subscription::find()
            .filter(subscription::Column::Name.eq(&input.name))
            .one(self.db)
            .await?;
        if taken.is_some() {
            return Err(StoreError::DuplicateName(input.name));
        }

        let period = parse_period(&input.period)?;

        if input.amount < Decimal::ZERO {
            return Err(StoreError::NegativeAmount(input.amount));
        }

        if input.is_commitment && input.commitment_end.is_none() {
            return Err(StoreError::MissingField("date_fin_engagement"));
        }

        if let Some(end) = input.commitment_end {
            if input.due_date >= end {
                return Err(StoreError::InvalidDateRange {
                    due: input.due_date,
                    end,
                });
            }
        }

        // Without a commitment the end date is meaningless and stays NULL.
        let commitment_end = if input.is_commitment {
            input.commitment_end
        } else {
            None
        };

        let category_id = match input.category {
            CategoryRef::Id(id) => id,
            CategoryRef::Named { name, color } => {
                CategoryStore::new(self.db).resolve(&name, &color).await?
            }
        };

        let inserted = subscription::ActiveModel {
            name: Set(input.name.clone()),
            supplier: Set(input.supplier),
            amount: Set(input.amount),
            period: Set(period),
            due_date: Set(input.due_date),
            commitment_end: Set(commitment_end),
            is_commitment: Set(Some(input.is_commitment)),
            category_id: Set(category_id),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|e| on_unique_violation(e, StoreError::DuplicateName(input.name)))?;

        info!("Subscription '{}' created with id {}", inserted.name, inserted.id);
        Ok(inserted)
    }

    /// Validates and applies a partial update to the subscription currently
    /// named `current_name`. Returns whether a row was affected.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, current_name: &str, patch: SubscriptionPatch) -> Result<bool> {
        if patch.is_empty() {
            return Err(StoreError::NoFieldsProvided);
        }

        let current = self.get_by_name(current_name).await?;

        if let Some(new_name) = &patch.name {
            if new_name == current_name {
                return Err(StoreError::UnchangedName);
            }
            let collision = Subscription::find()
                .filter(subscription::Column::Name.eq(new_name))
                .one(self.db)
                .await?;
            if collision.is_some() {
                return Err(StoreError::DuplicateName(new_name.clone()));
            }
        }

        let period = patch.period.as_deref().map(parse_period).transpose()?;

        // Re-check the date invariant on the patch merged over the stored row.
        let turning_off = patch.is_commitment == Some(false);
        let merged_due = patch.due_date.unwrap_or(current.due_date);
        let merged_end = if turning_off {
            None
        } else {
            patch.commitment_end.or(current.commitment_end)
        };
        if let Some(end) = merged_end {
            if merged_due >= end {
                return Err(StoreError::InvalidDateRange {
                    due: merged_due,
                    end,
                });
            }
        }
        let commitment_on = patch.is_commitment.unwrap_or(current.commitment_flag());
        if commitment_on && merged_end.is_none() {
            return Err(StoreError::MissingField("date_fin_engagement"));
        }
        // An end date only makes sense while the merged flag is on; a patch
        // carrying one against an off flag would break the pairing between
        // the two columns.
        if !commitment_on && patch.commitment_end.is_some() {
            return Err(StoreError::MissingField("IsEngagement"));
        }

        if let Some(amount) = patch.amount {
            if amount < Decimal::ZERO {
                return Err(StoreError::NegativeAmount(amount));
            }
            let effective_period = period.unwrap_or(current.period);
            self.check_amount_against_aggregates(amount, effective_period)
                .await?;
        }

        // Dynamic column set: only supplied fields are written, all values
        // bound through the query builder.
        let mut update = subscription::ActiveModel {
            ..Default::default()
        };
        if let Some(name) = patch.name.clone() {
            update.name = Set(name);
        }
        if let Some(supplier) = patch.supplier {
            update.supplier = Set(supplier);
        }
        if let Some(amount) = patch.amount {
            update.amount = Set(amount);
        }
        if let Some(period) = period {
            update.period = Set(period);
        }
        if let Some(due) = patch.due_date {
            update.due_date = Set(due);
        }
        match patch.is_commitment {
            // Turning the commitment off clears the stored end date.
            Some(false) => {
                update.is_commitment = Set(Some(false));
                update.commitment_end = Set(None);
            }
            Some(true) => {
                update.is_commitment = Set(Some(true));
                if let Some(end) = patch.commitment_end {
                    update.commitment_end = Set(Some(end));
                }
            }
            None => {
                if let Some(end) = patch.commitment_end {
                    update.commitment_end = Set(Some(end));
                }
            }
        }
        if let Some(category_id) = patch.category_id {
            update.category_id = Set(category_id);
        }

        let result = Subscription::update_many()
            .set(update)
            .filter(subscription::Column::Name.eq(current_name))
            .exec(self.db)
            .await
            .map_err(|e| {
                on_unique_violation(e, StoreError::DuplicateName(patch.name.unwrap_or_default()))
            })?;

        debug!(
            "Update of subscription '{}' affected {} row(s)",
            current_name, result.rows_affected
        );
        Ok(result.rows_affected > 0)
    }

    /// Physical delete by name. Fails with [`StoreError::NotFound`] if no
    /// subscription carried that name beforehand.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<bool> {
        self.get_by_name(name).await?;

        let result = Subscription::delete_many()
            .filter(subscription::Column::Name.eq(name))
            .exec(self.db)
            .await?;

        info!("Deleted subscription '{}'", name);
        Ok(result.rows_affected > 0)
    }

    /// Sums `montant` over subscriptions, optionally filtered by billing
    /// frequency. An empty match yields zero, never NULL.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, period: Option<BillingPeriod>) -> Result<Decimal> {
        let mut query = Subscription::find()
            .select_only()
            .column_as(subscription::Column::Amount.sum(), "total");
        if let Some(period) = period {
            query = query.filter(subscription::Column::Period.eq(period));
        }

        let total = query
            .into_tuple::<Option<Decimal>>()
            .one(self.db)
            .await?
            .flatten();

        Ok(total.unwrap_or(Decimal::ZERO))
    }

    /// Inner join against categorie, denormalized for display.
    pub async fn list_with_category(&self) -> Result<Vec<SubscriptionWithCategory>> {
        let rows = Subscription::find()
            .select_only()
            .column_as(subscription::Column::Name, "name")
            .column_as(subscription::Column::Supplier, "supplier")
            .column_as(subscription::Column::Amount, "amount")
            .column_as(subscription::Column::Period, "period")
            .column_as(subscription::Column::DueDate, "due_date")
            .column_as(subscription::Column::CommitmentEnd, "commitment_end")
            .column_as(subscription::Column::IsCommitment, "is_commitment")
            .column_as(category::Column::Name, "category_name")
            .column_as(category::Column::Color, "category_color")
            .join(JoinType::InnerJoin, subscription::Relation::Category.def())
            .into_model::<SubscriptionWithCategory>()
            .all(self.db)
            .await?;

        Ok(rows)
    }

    /// Sanity cap for amount changes, read fresh from the live aggregates:
    /// a weekly amount must not exceed a quarter of the monthly total, a
    /// monthly amount not one-twelfth of the annual total. Skipped while the
    /// relevant aggregate is still zero, otherwise nothing could ever grow
    /// on a sparsely populated table.
    async fn check_amount_against_aggregates(
        &self,
        amount: Decimal,
        period: BillingPeriod,
    ) -> Result<()> {
        match period {
            BillingPeriod::Week => {
                let monthly = self.aggregate(Some(BillingPeriod::Month)).await?;
                let limit = monthly / Decimal::from(4);
                if !monthly.is_zero() && amount > limit {
                    return Err(StoreError::AmountExceedsAggregate {
                        amount,
                        limit,
                        period: "weekly",
                    });
                }
            }
            BillingPeriod::Month => {
                let annual = self.aggregate(Some(BillingPeriod::Year)).await?;
                let limit = annual / Decimal::from(12);
                if !annual.is_zero() && amount > limit {
                    return Err(StoreError::AmountExceedsAggregate {
                        amount,
                        limit,
                        period: "monthly",
                    });
                }
            }
            BillingPeriod::Year => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None).await.expect("Migrations failed");
        db
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_category(db: &DatabaseConnection) -> i32 {
        CategoryStore::new(db)
            .resolve("Streaming", "#e50914")
            .await
            .unwrap()
    }

    fn netflix(category_id: i32) -> NewSubscription {
        NewSubscription {
            name: "Netflix".to_string(),
            supplier: "Netflix Inc".to_string(),
            amount: Decimal::new(1599, 2),
            period: "month".to_string(),
            due_date: date(2024, 1, 1),
            is_commitment: false,
            commitment_end: None,
            category: CategoryRef::Id(category_id),
        }
    }

    #[tokio::test]
    async fn insert_then_get_by_name_round_trips() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        store.insert(netflix(category_id)).await.unwrap();

        let found = store.get_by_name("Netflix").await.unwrap();
        assert_eq!(found.supplier, "Netflix Inc");
        assert_eq!(found.amount, Decimal::new(1599, 2));
        assert!(!found.commitment_flag());
        assert!(found.commitment_end.is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_name() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        store.insert(netflix(category_id)).await.unwrap();
        let err = store.insert(netflix(category_id)).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn insert_rejects_due_date_after_commitment_end() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        let err = store
            .insert(NewSubscription {
                due_date: date(2024, 6, 1),
                is_commitment: true,
                commitment_end: Some(date(2024, 1, 1)),
                ..netflix(category_id)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn insert_requires_commitment_end_when_under_commitment() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        let err = store
            .insert(NewSubscription {
                is_commitment: true,
                commitment_end: None,
                ..netflix(category_id)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::MissingField(_)));
    }

    #[tokio::test]
    async fn insert_without_commitment_clears_supplied_end_date() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        store
            .insert(NewSubscription {
                is_commitment: false,
                commitment_end: Some(date(2025, 1, 1)),
                ..netflix(category_id)
            })
            .await
            .unwrap();

        let found = store.get_by_name("Netflix").await.unwrap();
        assert!(found.commitment_end.is_none());
    }

    #[tokio::test]
    async fn insert_rejects_unknown_frequency() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        let err = store
            .insert(NewSubscription {
                period: "fortnight".to_string(),
                ..netflix(category_id)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidFrequency(_)));
    }

    #[tokio::test]
    async fn insert_resolves_named_category_once() {
        let db = setup_db().await;
        let store = SubscriptionStore::new(&db);

        let first = store
            .insert(NewSubscription {
                category: CategoryRef::Named {
                    name: "Cloud".to_string(),
                    color: "#336699".to_string(),
                },
                ..netflix(0)
            })
            .await
            .unwrap();

        let second = store
            .insert(NewSubscription {
                name: "Dropbox".to_string(),
                category: CategoryRef::Named {
                    name: "Cloud".to_string(),
                    color: "#336699".to_string(),
                },
                ..netflix(0)
            })
            .await
            .unwrap();

        assert_eq!(first.category_id, second.category_id);
        assert_eq!(
            CategoryStore::new(&db).list_all().await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn update_with_no_fields_is_rejected() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();

        let err = store
            .update("Netflix", SubscriptionPatch::default())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NoFieldsProvided));
    }

    #[tokio::test]
    async fn update_of_missing_subscription_is_not_found() {
        let db = setup_db().await;
        let store = SubscriptionStore::new(&db);

        let err = store
            .update(
                "Ghost",
                SubscriptionPatch {
                    supplier: Some("Anyone".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn rename_to_taken_name_or_same_name_is_rejected() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();
        store
            .insert(NewSubscription {
                name: "Spotify".to_string(),
                ..netflix(category_id)
            })
            .await
            .unwrap();

        let collision = store
            .update(
                "Spotify",
                SubscriptionPatch {
                    name: Some("Netflix".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(collision, StoreError::DuplicateName(_)));

        let noop = store
            .update(
                "Spotify",
                SubscriptionPatch {
                    name: Some("Spotify".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(noop, StoreError::UnchangedName));
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();

        let updated = store
            .update(
                "Netflix",
                SubscriptionPatch {
                    supplier: Some("Netflix EMEA".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let found = store.get_by_name("Netflix").await.unwrap();
        assert_eq!(found.supplier, "Netflix EMEA");
        // Everything else untouched
        assert_eq!(found.amount, Decimal::new(1599, 2));
        assert_eq!(found.period, BillingPeriod::Month);
        assert_eq!(found.due_date, date(2024, 1, 1));
    }

    #[tokio::test]
    async fn turning_commitment_off_clears_the_end_date() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store
            .insert(NewSubscription {
                is_commitment: true,
                commitment_end: Some(date(2025, 6, 1)),
                ..netflix(category_id)
            })
            .await
            .unwrap();

        store
            .update(
                "Netflix",
                SubscriptionPatch {
                    is_commitment: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let found = store.get_by_name("Netflix").await.unwrap();
        assert!(!found.commitment_flag());
        assert!(found.commitment_end.is_none());
    }

    #[tokio::test]
    async fn turning_commitment_on_requires_an_end_date() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();

        let err = store
            .update(
                "Netflix",
                SubscriptionPatch {
                    is_commitment: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField(_)));

        let err = store
            .update(
                "Netflix",
                SubscriptionPatch {
                    is_commitment: Some(true),
                    commitment_end: Some(date(2023, 1, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDateRange { .. }));

        store
            .update(
                "Netflix",
                SubscriptionPatch {
                    is_commitment: Some(true),
                    commitment_end: Some(date(2025, 1, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let found = store.get_by_name("Netflix").await.unwrap();
        assert!(found.commitment_flag());
        assert_eq!(found.commitment_end, Some(date(2025, 1, 1)));
    }

    #[tokio::test]
    async fn end_date_alone_is_rejected_without_the_commitment_flag() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();

        let err = store
            .update(
                "Netflix",
                SubscriptionPatch {
                    commitment_end: Some(date(2025, 1, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField("IsEngagement")));

        // The row keeps the end date and flag paired: both unset.
        let found = store.get_by_name("Netflix").await.unwrap();
        assert!(!found.commitment_flag());
        assert!(found.commitment_end.is_none());
    }

    #[tokio::test]
    async fn update_rejects_unknown_frequency() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();

        let err = store
            .update(
                "Netflix",
                SubscriptionPatch {
                    period: Some("daily".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidFrequency(_)));
    }

    #[tokio::test]
    async fn aggregate_of_empty_table_is_zero() {
        let db = setup_db().await;
        let store = SubscriptionStore::new(&db);

        let total = store.aggregate(Some(BillingPeriod::Month)).await.unwrap();
        assert_eq!(total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn aggregate_sums_by_frequency() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        store.insert(netflix(category_id)).await.unwrap();
        store
            .insert(NewSubscription {
                name: "Spotify".to_string(),
                amount: Decimal::new(999, 2),
                ..netflix(category_id)
            })
            .await
            .unwrap();
        store
            .insert(NewSubscription {
                name: "Domain".to_string(),
                amount: Decimal::new(1200, 2),
                period: "year".to_string(),
                ..netflix(category_id)
            })
            .await
            .unwrap();

        let monthly = store.aggregate(Some(BillingPeriod::Month)).await.unwrap();
        assert_eq!(monthly, Decimal::new(2598, 2));

        let all = store.aggregate(None).await.unwrap();
        assert_eq!(all, Decimal::new(3798, 2));
    }

    #[tokio::test]
    async fn weekly_amount_is_capped_by_monthly_aggregate() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        // Monthly aggregate of 40.00, so the weekly cap is 10.00
        store
            .insert(NewSubscription {
                amount: Decimal::new(4000, 2),
                ..netflix(category_id)
            })
            .await
            .unwrap();
        store
            .insert(NewSubscription {
                name: "Gym".to_string(),
                amount: Decimal::new(500, 2),
                period: "week".to_string(),
                ..netflix(category_id)
            })
            .await
            .unwrap();

        let err = store
            .update(
                "Gym",
                SubscriptionPatch {
                    amount: Some(Decimal::new(1100, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AmountExceedsAggregate { .. }));

        let ok = store
            .update(
                "Gym",
                SubscriptionPatch {
                    amount: Some(Decimal::new(900, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn monthly_amount_is_capped_by_annual_aggregate() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);

        // Annual aggregate of 120.00, so the monthly cap is 10.00
        store
            .insert(NewSubscription {
                name: "Domain".to_string(),
                amount: Decimal::new(12000, 2),
                period: "year".to_string(),
                ..netflix(category_id)
            })
            .await
            .unwrap();
        store.insert(netflix(category_id)).await.unwrap();

        let err = store
            .update(
                "Netflix",
                SubscriptionPatch {
                    amount: Some(Decimal::new(1099, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AmountExceedsAggregate { .. }));
    }

    #[tokio::test]
    async fn delete_missing_subscription_is_not_found() {
        let db = setup_db().await;
        let store = SubscriptionStore::new(&db);

        let err = store.delete("Ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();

        assert!(store.delete("Netflix").await.unwrap());
        assert!(matches!(
            store.get_by_name("Netflix").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn list_with_category_joins_names_and_colors() {
        let db = setup_db().await;
        let category_id = seed_category(&db).await;
        let store = SubscriptionStore::new(&db);
        store.insert(netflix(category_id)).await.unwrap();

        let rows = store.list_with_category().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Netflix");
        assert_eq!(rows[0].category_name, "Streaming");
        assert_eq!(rows[0].category_color, "#e50914");
        assert!(!rows[0].commitment_flag());
    }
}
