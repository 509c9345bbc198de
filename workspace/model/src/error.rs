use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

use crate::entities::FIELD_CHECK_PREFIX;

/// Errors raised by identity and academic operations.
#[derive(Error, Debug)]
pub enum AcademyError {
    /// `create_user` was called with an empty phone.
    #[error("Phone number is required")]
    MissingPhone,

    /// The phone does not look like `+998901234567`.
    #[error("Invalid phone number '{0}': expected the format '+998901234567'")]
    InvalidPhone(String),

    /// A field value was rejected before it reached the database.
    #[error("Invalid field value: {0}")]
    FieldRejected(String),

    #[error("A user with phone '{0}' already exists")]
    DuplicatePhone(String),

    #[error("A study group titled '{0}' already exists")]
    DuplicateTitle(String),

    /// `create_superuser` was given an explicit `false` for a privilege flag.
    #[error("Superuser must have {0}=true")]
    SuperuserMisconfigured(&'static str),

    /// The course is still the course of at least one study group.
    #[error("Course {0} is still referenced by a study group")]
    CourseInUse(i32),

    #[error("{0} is already linked")]
    AlreadyLinked(String),

    /// A foreign key pointed at a row that does not exist.
    #[error("Referenced row does not exist: {0}")]
    MissingReference(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for AcademyError {
    fn from(error: DbErr) -> Self {
        match error {
            DbErr::Custom(ref message) if message.starts_with(FIELD_CHECK_PREFIX) => {
                AcademyError::FieldRejected(message.clone())
            }
            other => AcademyError::Database(other),
        }
    }
}

/// Classification of a failed write, as reported by the database driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
}

/// SQLite extended code for a constraint raised from its trigger path.
/// `ON DELETE RESTRICT` is reported this way instead of as code 787.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";
const SQLITE_FOREIGN_KEY_MESSAGE: &str = "FOREIGN KEY constraint failed";

/// Returns which constraint a write error violated, if any.
pub(crate) fn violation(error: &DbErr) -> Option<Violation> {
    match error.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Some(Violation::Unique),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => Some(Violation::ForeignKey),
        _ if is_sqlite_restrict(error) => Some(Violation::ForeignKey),
        _ => None,
    }
}

fn is_sqlite_restrict(error: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(inner)) | DbErr::Query(RuntimeErr::SqlxError(inner))) =
        error
    else {
        return false;
    };

    inner.as_database_error().is_some_and(|db_error| {
        db_error.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER)
            || db_error.message() == SQLITE_FOREIGN_KEY_MESSAGE
    })
}

/// Type alias for Result with AcademyError
pub type Result<T> = std::result::Result<T, AcademyError>;
