use model::entities::category;
use model::entities::prelude::Category;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, instrument};

use crate::error::{on_unique_violation, Result, StoreError};

/// Fields of a partial category update. Only supplied fields are written.
#[derive(Debug, Default, Clone)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

/// Maps (name, color) pairs to stable category identifiers and carries the
/// plain CRUD for the category routes.
#[derive(Debug, Clone, Copy)]
pub struct CategoryStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CategoryStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the id of the category matching both name and color exactly,
    /// inserting the row first if no such pair exists.
    ///
    /// The lookup key is the full pair: a name-only match is not reused, so a
    /// second color under an existing name surfaces the unique-key violation
    /// as [`StoreError::DuplicateName`].
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str, color: &str) -> Result<i32> {
        let existing = Category::find()
            .filter(category::Column::Name.eq(name))
            .filter(category::Column::Color.eq(color))
            .one(self.db)
            .await?;

        if let Some(found) = existing {
            debug!("Reusing category {} for ({}, {})", found.id, name, color);
            return Ok(found.id);
        }

        let inserted = category::ActiveModel {
            name: Set(name.to_string()),
            color: Set(color.to_string()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|e| on_unique_violation(e, StoreError::DuplicateName(name.to_string())))?;

        debug!("Created category {} for ({}, {})", inserted.id, name, color);
        Ok(inserted.id)
    }

    pub async fn list_all(&self) -> Result<Vec<category::Model>> {
        Ok(Category::find().all(self.db).await?)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<category::Model> {
        Category::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("category '{name}'")))
    }

    #[instrument(skip(self))]
    pub async fn insert(&self, name: &str, color: &str) -> Result<category::Model> {
        let taken = Category::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db)
            .await?;
        if taken.is_some() {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        category::ActiveModel {
            name: Set(name.to_string()),
            color: Set(color.to_string()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|e| on_unique_violation(e, StoreError::DuplicateName(name.to_string())))
    }

    /// Applies a partial update to the category currently named
    /// `current_name`. Returns whether a row was affected.
    #[instrument(skip(self))]
    pub async fn update(&self, current_name: &str, patch: CategoryPatch) -> Result<bool> {
        if patch.is_empty() {
            return Err(StoreError::NoFieldsProvided);
        }

        if let Some(new_name) = &patch.name {
            let collision = Category::find()
                .filter(category::Column::Name.eq(new_name))
                .filter(category::Column::Name.ne(current_name))
                .one(self.db)
                .await?;
            if collision.is_some() {
                return Err(StoreError::DuplicateName(new_name.clone()));
            }
        }

        let mut update = category::ActiveModel {
            ..Default::default()
        };
        if let Some(name) = patch.name.clone() {
            update.name = Set(name);
        }
        if let Some(color) = patch.color {
            update.color = Set(color);
        }

        let result = Category::update_many()
            .set(update)
            .filter(category::Column::Name.eq(current_name))
            .exec(self.db)
            .await
            .map_err(|e| {
                on_unique_violation(
                    e,
                    StoreError::DuplicateName(patch.name.unwrap_or_default()),
                )
            })?;

        Ok(result.rows_affected > 0)
    }

    /// Physical delete by name. Fails with [`StoreError::NotFound`] if no
    /// category carried that name beforehand.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<bool> {
        self.get_by_name(name).await?;

        let result = Category::delete_many()
            .filter(category::Column::Name.eq(name))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
