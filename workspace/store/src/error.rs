use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;

/// Error types for the store crate.
///
/// Everything a write can be rejected for has its own variant so the HTTP
/// layer can map rejections to statuses without parsing messages.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error from the database driver. Routes genericize the message.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The requested row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A subscription or category with this name already exists.
    #[error("An entry named '{0}' already exists")]
    DuplicateName(String),

    /// A user with this email already exists.
    #[error("An account with email '{0}' already exists")]
    DuplicateEmail(String),

    /// Due date must precede the commitment-end date.
    #[error("Due date {due} must be before the commitment end date {end}")]
    InvalidDateRange { due: NaiveDate, end: NaiveDate },

    /// A required field is absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A partial update carried no fields at all.
    #[error("At least one field must be provided")]
    NoFieldsProvided,

    /// The new name equals the current one.
    #[error("The new name must differ from the current name")]
    UnchangedName,

    /// The billing frequency is not one of week/month/year.
    #[error("Invalid billing frequency '{0}' (expected week, month or year)")]
    InvalidFrequency(String),

    /// Amounts are never negative.
    #[error("Amount {0} must not be negative")]
    NegativeAmount(Decimal),

    /// The new amount is implausible against the live aggregates.
    #[error("Amount {amount} exceeds the {period} cap of {limit}")]
    AmountExceedsAggregate {
        amount: Decimal,
        limit: Decimal,
        period: &'static str,
    },

    /// The password does not satisfy the complexity policy.
    #[error("{0}")]
    WeakPassword(&'static str),

    /// Unknown email or wrong password.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Error from the password hasher.
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl StoreError {
    /// Stable machine-readable code for the HTTP error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::DuplicateName(_) => "DUPLICATE_NAME",
            StoreError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            StoreError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            StoreError::MissingField(_) => "MISSING_FIELD",
            StoreError::NoFieldsProvided => "NO_FIELDS_PROVIDED",
            StoreError::UnchangedName => "UNCHANGED_NAME",
            StoreError::InvalidFrequency(_) => "INVALID_FREQUENCY",
            StoreError::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            StoreError::AmountExceedsAggregate { .. } => "AMOUNT_EXCEEDS_AGGREGATE",
            StoreError::WeakPassword(_) => "WEAK_PASSWORD",
            StoreError::InvalidCredentials => "INVALID_CREDENTIALS",
            StoreError::Hash(_) => "HASH_ERROR",
        }
    }
}

/// Maps a unique-constraint violation surfaced by the driver to the given
/// duplicate error, so the database stays the source of truth when a race
/// slips past the pre-flight existence check.
pub(crate) fn on_unique_violation(err: DbErr, duplicate: StoreError) -> StoreError {
    match err {
        DbErr::Exec(ref exec_err) => {
            // SQLite says "UNIQUE constraint failed", Postgres "duplicate key
            // value violates unique constraint". Foreign-key violations do
            // not mention "unique" and keep flowing through as Database.
            let message = exec_err.to_string().to_lowercase();
            if message.contains("unique") {
                duplicate
            } else {
                StoreError::Database(err)
            }
        }
        other => StoreError::Database(other),
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
