use bcrypt::{hash, verify, DEFAULT_COST};
use model::entities::prelude::User;
use model::entities::user;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{info, instrument};

use crate::error::{on_unique_violation, Result, StoreError};

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub mail: String,
    /// Plaintext at this point; hashed before it reaches the database.
    pub password: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<Decimal>,
    pub email_verified: bool,
}

/// Fields of a partial user update. Only supplied fields are written; a new
/// password is re-validated and re-hashed.
#[derive(Debug, Default, Clone)]
pub struct UserPatch {
    pub mail: Option<String>,
    pub password: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<Decimal>,
    pub email_verified: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.mail.is_none()
            && self.password.is_none()
            && self.last_name.is_none()
            && self.first_name.is_none()
            && self.phone.is_none()
            && self.salary.is_none()
            && self.email_verified.is_none()
    }
}

/// Enforces the password complexity policy: at least 8 characters with one
/// uppercase letter, one lowercase letter, one digit and one special
/// character.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < 8 {
        return Err(StoreError::WeakPassword(
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(StoreError::WeakPassword(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(StoreError::WeakPassword(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(StoreError::WeakPassword(
            "Password must contain at least one digit",
        ));
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err(StoreError::WeakPassword(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

/// User account lifecycle. Passwords are stored as bcrypt hashes only.
#[derive(Debug, Clone, Copy)]
pub struct UserStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_all(&self) -> Result<Vec<user::Model>> {
        Ok(User::find().all(self.db).await?)
    }

    pub async fn get_by_mail(&self, mail: &str) -> Result<user::Model> {
        User::find()
            .filter(user::Column::Mail.eq(mail))
            .one(self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user '{mail}'")))
    }

    #[instrument(skip(self, input), fields(mail = %input.mail))]
    pub async fn insert(&self, input: NewUser) -> Result<user::Model> {
        validate_password(&input.password)?;

        let taken = User::find()
            .filter(user::Column::Mail.eq(&input.mail))
            .one(self.db)
            .await?;
        if taken.is_some() {
            return Err(StoreError::DuplicateEmail(input.mail));
        }

        let hashed = hash(&input.password, DEFAULT_COST)?;

        let inserted = user::ActiveModel {
            mail: Set(input.mail.clone()),
            password: Set(hashed),
            last_name: Set(input.last_name),
            first_name: Set(input.first_name),
            phone: Set(input.phone),
            salary: Set(input.salary),
            email_verified: Set(input.email_verified),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|e| on_unique_violation(e, StoreError::DuplicateEmail(input.mail)))?;

        info!("User created for '{}'", inserted.mail);
        Ok(inserted)
    }

    /// Applies a partial update to the user currently registered under
    /// `current_mail`. Returns whether a row was affected.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, current_mail: &str, patch: UserPatch) -> Result<bool> {
        if patch.is_empty() {
            return Err(StoreError::NoFieldsProvided);
        }

        self.get_by_mail(current_mail).await?;

        if let Some(new_mail) = &patch.mail {
            let collision = User::find()
                .filter(user::Column::Mail.eq(new_mail))
                .filter(user::Column::Mail.ne(current_mail))
                .one(self.db)
                .await?;
            if collision.is_some() {
                return Err(StoreError::DuplicateEmail(new_mail.clone()));
            }
        }

        let mut update = user::ActiveModel {
            ..Default::default()
        };
        if let Some(mail) = patch.mail.clone() {
            update.mail = Set(mail);
        }
        if let Some(password) = &patch.password {
            validate_password(password)?;
            update.password = Set(hash(password, DEFAULT_COST)?);
        }
        if let Some(last_name) = patch.last_name {
            update.last_name = Set(Some(last_name));
        }
        if let Some(first_name) = patch.first_name {
            update.first_name = Set(Some(first_name));
        }
        if let Some(phone) = patch.phone {
            update.phone = Set(Some(phone));
        }
        if let Some(salary) = patch.salary {
            update.salary = Set(Some(salary));
        }
        if let Some(email_verified) = patch.email_verified {
            update.email_verified = Set(email_verified);
        }

        let result = User::update_many()
            .set(update)
            .filter(user::Column::Mail.eq(current_mail))
            .exec(self.db)
            .await
            .map_err(|e| {
                on_unique_violation(e, StoreError::DuplicateEmail(patch.mail.unwrap_or_default()))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// Physical delete by email. Fails with [`StoreError::NotFound`] if no
    /// account exists for that address.
    #[instrument(skip(self))]
    pub async fn delete(&self, mail: &str) -> Result<bool> {
        self.get_by_mail(mail).await?;

        let result = User::delete_many()
            .filter(user::Column::Mail.eq(mail))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Checks a login attempt against the stored bcrypt hash. Unknown email
    /// and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, mail: &str, password: &str) -> Result<user::Model> {
        let account = User::find()
            .filter(user::Column::Mail.eq(mail))
            .one(self.db)
            .await?
            .ok_or(StoreError::InvalidCredentials)?;

        if verify(password, &account.password)? {
            Ok(account)
        } else {
            Err(StoreError::InvalidCredentials)
        }
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

    fn alice() -> NewUser {
        NewUser {
            mail: "alice@example.com".to_string(),
            password: "Str0ng!passw0rd".to_string(),
            last_name: Some("Martin".to_string()),
            first_name: Some("Alice".to_string()),
            phone: None,
            salary: Some(Decimal::new(250000, 2)),
            email_verified: false,
        }
    }

    #[test]
    fn password_policy_catches_each_rule() {
        assert!(matches!(
            validate_password("Sh0rt!"),
            Err(StoreError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("alllower1!"),
            Err(StoreError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("ALLUPPER1!"),
            Err(StoreError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("NoDigits!!"),
            Err(StoreError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("NoSpecial1A"),
            Err(StoreError::WeakPassword(_))
        ));
        assert!(validate_password("Str0ng!passw0rd").is_ok());
    }

    #[tokio::test]
    async fn insert_hashes_the_password() {
        let db = setup_db().await;
        let store = UserStore::new(&db);

        let created = store.insert(alice()).await.unwrap();
        assert_ne!(created.password, "Str0ng!passw0rd");
        assert!(created.password.starts_with("$2"));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_mail() {
        let db = setup_db().await;
        let store = UserStore::new(&db);

        store.insert(alice()).await.unwrap();
        let err = store.insert(alice()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn insert_rejects_weak_password() {
        let db = setup_db().await;
        let store = UserStore::new(&db);

        let err = store
            .insert(NewUser {
                password: "weak".to_string(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn verify_credentials_round_trips() {
        let db = setup_db().await;
        let store = UserStore::new(&db);
        store.insert(alice()).await.unwrap();

        let verified = store
            .verify_credentials("alice@example.com", "Str0ng!passw0rd")
            .await
            .unwrap();
        assert_eq!(verified.mail, "alice@example.com");

        let wrong = store
            .verify_credentials("alice@example.com", "Wrong!passw0rd")
            .await
            .unwrap_err();
        assert!(matches!(wrong, StoreError::InvalidCredentials));

        let unknown = store
            .verify_credentials("bob@example.com", "Str0ng!passw0rd")
            .await
            .unwrap_err();
        assert!(matches!(unknown, StoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn update_rehashes_a_new_password() {
        let db = setup_db().await;
        let store = UserStore::new(&db);
        store.insert(alice()).await.unwrap();

        let updated = store
            .update(
                "alice@example.com",
                UserPatch {
                    password: Some("N3w!passw0rd".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        store
            .verify_credentials("alice@example.com", "N3w!passw0rd")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_with_no_fields_is_rejected() {
        let db = setup_db().await;
        let store = UserStore::new(&db);
        store.insert(alice()).await.unwrap();

        let err = store
            .update("alice@example.com", UserPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoFieldsProvided));
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let db = setup_db().await;
        let store = UserStore::new(&db);

        let err = store.delete("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
