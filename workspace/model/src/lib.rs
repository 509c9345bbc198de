pub mod academic;
pub mod entities;
pub mod error;
pub mod identity;

pub use error::AcademyError;

#[cfg(test)]
pub(crate) mod test_support {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

    /// Fresh in-memory SQLite database with the full schema applied.
    pub async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Cascade and restrict rules only apply with foreign keys on
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        Migrator::up(&db, None).await.expect("Migrations failed.");
        db
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, Set};

    use super::entities::*;
    use super::test_support::setup_db;
    use prelude::*;

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await;

        // Users
        let teacher_user = user::ActiveModel {
            phone: Set("+998901111111".to_string()),
            password: Set("!".to_string()),
            is_teacher: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let student_user = user::ActiveModel {
            phone: Set("+998902222222".to_string()),
            password: Set("!".to_string()),
            full_name: Set(Some("Jasur Toshmatov".to_string())),
            is_student: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        assert!(teacher_user.is_active);
        assert!(!teacher_user.is_admin);

        // Catalogue
        let course = course::ActiveModel {
            title: Set("IELTS".to_string()),
            descriptions: Set(Some("Exam preparation".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let branch = branch::ActiveModel {
            title: Set("Chilonzor".to_string()),
            descriptions: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let group = study_group::ActiveModel {
            title: Set("IELTS-7".to_string()),
            course_id: Set(course.id),
            start_date: Set(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()),
            end_date: Set(NaiveDate::from_ymd_opt(2024, 12, 20).unwrap()),
            price: Set(Some("900000".to_string())),
            descriptions: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Profiles
        let teacher = teacher::ActiveModel {
            user_id: Set(teacher_user.id),
            descriptions: Set(Some("Band 8.5".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let student = student::ActiveModel {
            user_id: Set(student_user.id),
            descriptions: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Junctions
        teacher_branch::ActiveModel {
            teacher_id: Set(teacher.id),
            branch_id: Set(branch.id),
        }
        .insert(&db)
        .await?;
        teacher_course::ActiveModel {
            teacher_id: Set(teacher.id),
            course_id: Set(course.id),
        }
        .insert(&db)
        .await?;
        student_course::ActiveModel {
            student_id: Set(student.id),
            course_id: Set(course.id),
        }
        .insert(&db)
        .await?;
        student_study_group::ActiveModel {
            student_id: Set(student.id),
            study_group_id: Set(group.id),
        }
        .insert(&db)
        .await?;
        study_group_teacher::ActiveModel {
            study_group_id: Set(group.id),
            teacher_id: Set(teacher.id),
        }
        .insert(&db)
        .await?;

        // Navigate the graph in both directions
        let branches = teacher.find_related(Branch).all(&db).await?;
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].title, "Chilonzor");

        let course_teachers = course.find_related(Teacher).all(&db).await?;
        assert_eq!(course_teachers.len(), 1);
        assert_eq!(course_teachers[0].id, teacher.id);

        let course_students = course.find_related(Student).all(&db).await?;
        assert_eq!(course_students.len(), 1);
        assert_eq!(course_students[0].id, student.id);

        let course_groups = course.find_related(StudyGroup).all(&db).await?;
        assert_eq!(course_groups.len(), 1);
        assert_eq!(course_groups[0].title, "IELTS-7");

        let group_teachers = group.find_related(Teacher).all(&db).await?;
        assert_eq!(group_teachers.len(), 1);

        let teacher_groups = teacher.find_related(StudyGroup).all(&db).await?;
        assert_eq!(teacher_groups.len(), 1);

        let owner = student.find_related(User).one(&db).await?.unwrap();
        assert_eq!(owner.phone, "+998902222222");

        let profile = teacher_user.find_related(Teacher).one(&db).await?;
        assert_eq!(profile.map(|t| t.id), Some(teacher.id));

        let found = User::find()
            .filter(user::Column::Phone.eq("+998902222222"))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(found.full_name.as_deref(), Some("Jasur Toshmatov"));

        Ok(())
    }

    #[tokio::test]
    async fn test_updated_timestamp_moves_on_save() -> Result<(), DbErr> {
        let db = setup_db().await;

        let created = user::ActiveModel {
            phone: Set("+998903333333".to_string()),
            password: Set("!".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let mut active: user::ActiveModel = created.clone().into();
        active.full_name = Set(Some("Renamed".to_string()));
        let updated = active.update(&db).await?;

        assert_eq!(updated.created, created.created);
        assert!(updated.updated > created.updated);
        Ok(())
    }

    #[tokio::test]
    async fn test_phone_is_checked_and_immutable_at_entity_level() -> Result<(), DbErr> {
        let db = setup_db().await;

        let bad = user::ActiveModel {
            phone: Set("+1 555 0100".to_string()),
            password: Set("!".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(bad.is_err());

        let created = user::ActiveModel {
            phone: Set("+998904444444".to_string()),
            password: Set("!".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let mut same_phone: user::ActiveModel = created.clone().into();
        same_phone.phone = Set("+998904444444".to_string());
        same_phone.full_name = Set(Some("Kept Phone".to_string()));
        let saved = same_phone.update(&db).await?;
        assert_eq!(saved.phone, "+998904444444");
        assert_eq!(saved.full_name.as_deref(), Some("Kept Phone"));

        let mut active: user::ActiveModel = created.into();
        active.phone = Set("+998905555555".to_string());
        let err = active.update(&db).await.unwrap_err();
        assert!(matches!(crate::AcademyError::from(err), crate::AcademyError::FieldRejected(_)));

        let stored = User::find_by_id(saved.id).one(&db).await?.unwrap();
        assert_eq!(stored.phone, "+998904444444");
        Ok(())
    }
}
