//! SeaORM entity modules for the academy schema.
//! Users carry the login identity; teachers and students hang off a user
//! one-to-one, and the remaining links are explicit junction tables.

use sea_orm::{ActiveValue, DbErr};

pub mod branch;
pub mod course;
pub mod student;
pub mod student_course;
pub mod student_study_group;
pub mod study_group;
pub mod study_group_teacher;
pub mod teacher;
pub mod teacher_branch;
pub mod teacher_course;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::branch::Entity as Branch;
    pub use super::course::Entity as Course;
    pub use super::student::Entity as Student;
    pub use super::student_course::Entity as StudentCourse;
    pub use super::student_study_group::Entity as StudentStudyGroup;
    pub use super::study_group::Entity as StudyGroup;
    pub use super::study_group_teacher::Entity as StudyGroupTeacher;
    pub use super::teacher::Entity as Teacher;
    pub use super::teacher_branch::Entity as TeacherBranch;
    pub use super::teacher_course::Entity as TeacherCourse;
    pub use super::user::Entity as User;
}

/// Maximum lengths shared by the string columns.
pub const TITLE_MAX_LEN: usize = 50;
pub const DESCRIPTIONS_MAX_LEN: usize = 500;

/// Prefix used in `DbErr::Custom` messages raised by field checks, so callers
/// can tell them apart from driver errors.
pub(crate) const FIELD_CHECK_PREFIX: &str = "field check failed";

/// Rejects a string column value longer than `max` characters.
///
/// SQLite ignores `VARCHAR(n)`, so the limit is re-checked before every save.
pub(crate) fn check_len(field: &str, value: &ActiveValue<String>, max: usize) -> Result<(), DbErr> {
    if let ActiveValue::Set(value) = value {
        ensure_len(field, value, max)?;
    }
    Ok(())
}

/// Same as [`check_len`] for nullable columns.
pub(crate) fn check_opt_len(
    field: &str,
    value: &ActiveValue<Option<String>>,
    max: usize,
) -> Result<(), DbErr> {
    if let ActiveValue::Set(Some(value)) = value {
        ensure_len(field, value, max)?;
    }
    Ok(())
}

fn ensure_len(field: &str, value: &str, max: usize) -> Result<(), DbErr> {
    let len = value.chars().count();
    if len > max {
        return Err(DbErr::Custom(format!(
            "{FIELD_CHECK_PREFIX}: {field} is {len} characters long, at most {max} allowed"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Set;

    #[test]
    fn test_check_len_counts_characters_not_bytes() {
        // 50 Cyrillic characters are 100 bytes
        let title: String = "я".repeat(50);
        assert!(check_len("title", &Set(title), TITLE_MAX_LEN).is_ok());

        let too_long: String = "я".repeat(51);
        let err = check_len("title", &Set(too_long), TITLE_MAX_LEN).unwrap_err();
        assert!(err.to_string().contains("title is 51 characters long"));
    }

    #[test]
    fn test_check_opt_len_ignores_null_and_unset() {
        assert!(check_opt_len("descriptions", &Set(None), DESCRIPTIONS_MAX_LEN).is_ok());
        assert!(check_opt_len("descriptions", &ActiveValue::NotSet, DESCRIPTIONS_MAX_LEN).is_ok());
        assert!(check_opt_len("price", &Set(Some("x".repeat(16))), 15).is_err());
    }
}
