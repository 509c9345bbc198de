//! Operations over the academic graph: profiles, study groups, the
//! many-to-many links between them, and deletes whose outcome depends on
//! the referential rules declared in the schema.

use std::fmt;

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, Set};
use tracing::{debug, info, instrument, warn};

use crate::entities::{
    course, student, student_course, student_study_group, study_group, study_group_teacher,
    teacher, teacher_branch, teacher_course, user,
};
use crate::error::{AcademyError, Result, Violation, violation};

/// One row of a junction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    TeacherBranch { teacher_id: i32, branch_id: i32 },
    TeacherCourse { teacher_id: i32, course_id: i32 },
    StudentCourse { student_id: i32, course_id: i32 },
    StudentStudyGroup { student_id: i32, study_group_id: i32 },
    StudyGroupTeacher { study_group_id: i32, teacher_id: i32 },
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Link::TeacherBranch { teacher_id, branch_id } => {
                write!(f, "teacher {teacher_id} and branch {branch_id}")
            }
            Link::TeacherCourse { teacher_id, course_id } => {
                write!(f, "teacher {teacher_id} and course {course_id}")
            }
            Link::StudentCourse { student_id, course_id } => {
                write!(f, "student {student_id} and course {course_id}")
            }
            Link::StudentStudyGroup { student_id, study_group_id } => {
                write!(f, "student {student_id} and study group {study_group_id}")
            }
            Link::StudyGroupTeacher { study_group_id, teacher_id } => {
                write!(f, "study group {study_group_id} and teacher {teacher_id}")
            }
        }
    }
}

/// Inserts the junction row for `link`.
///
/// Each pair is stored at most once; a repeat fails with
/// [`AcademyError::AlreadyLinked`]. Unknown ids fail with
/// [`AcademyError::MissingReference`].
#[instrument(skip(db))]
pub async fn link<C>(db: &C, link: Link) -> Result<()>
where
    C: ConnectionTrait,
{
    let inserted: std::result::Result<(), DbErr> = match link {
        Link::TeacherBranch { teacher_id, branch_id } => teacher_branch::ActiveModel {
            teacher_id: Set(teacher_id),
            branch_id: Set(branch_id),
        }
        .insert(db)
        .await
        .map(|_| ()),
        Link::TeacherCourse { teacher_id, course_id } => teacher_course::ActiveModel {
            teacher_id: Set(teacher_id),
            course_id: Set(course_id),
        }
        .insert(db)
        .await
        .map(|_| ()),
        Link::StudentCourse { student_id, course_id } => student_course::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
        }
        .insert(db)
        .await
        .map(|_| ()),
        Link::StudentStudyGroup { student_id, study_group_id } => student_study_group::ActiveModel {
            student_id: Set(student_id),
            study_group_id: Set(study_group_id),
        }
        .insert(db)
        .await
        .map(|_| ()),
        Link::StudyGroupTeacher { study_group_id, teacher_id } => study_group_teacher::ActiveModel {
            study_group_id: Set(study_group_id),
            teacher_id: Set(teacher_id),
        }
        .insert(db)
        .await
        .map(|_| ()),
    };

    match inserted {
        Ok(()) => {
            info!("Linked {}", link);
            Ok(())
        }
        Err(db_error) => match violation(&db_error) {
            Some(Violation::Unique) => {
                debug!("Link between {} already present", link);
                Err(AcademyError::AlreadyLinked(link.to_string()))
            }
            Some(Violation::ForeignKey) => {
                warn!("Cannot link {}: a side does not exist", link);
                Err(AcademyError::MissingReference(link.to_string()))
            }
            None => Err(db_error.into()),
        },
    }
}

/// Removes the junction row for `link`. Returns false if it was not there.
#[instrument(skip(db))]
pub async fn unlink<C>(db: &C, link: Link) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = match link {
        Link::TeacherBranch { teacher_id, branch_id } => {
            teacher_branch::Entity::delete_by_id((teacher_id, branch_id)).exec(db).await?
        }
        Link::TeacherCourse { teacher_id, course_id } => {
            teacher_course::Entity::delete_by_id((teacher_id, course_id)).exec(db).await?
        }
        Link::StudentCourse { student_id, course_id } => {
            student_course::Entity::delete_by_id((student_id, course_id)).exec(db).await?
        }
        Link::StudentStudyGroup { student_id, study_group_id } => {
            student_study_group::Entity::delete_by_id((student_id, study_group_id))
                .exec(db)
                .await?
        }
        Link::StudyGroupTeacher { study_group_id, teacher_id } => {
            study_group_teacher::Entity::delete_by_id((study_group_id, teacher_id))
                .exec(db)
                .await?
        }
    };

    debug!("Unlink {} affected {} rows", link, result.rows_affected);
    Ok(result.rows_affected > 0)
}

pub async fn assign_teacher_to_branch<C: ConnectionTrait>(db: &C, teacher_id: i32, branch_id: i32) -> Result<()> {
    link(db, Link::TeacherBranch { teacher_id, branch_id }).await
}

pub async fn assign_teacher_to_course<C: ConnectionTrait>(db: &C, teacher_id: i32, course_id: i32) -> Result<()> {
    link(db, Link::TeacherCourse { teacher_id, course_id }).await
}

pub async fn enroll_student_in_course<C: ConnectionTrait>(db: &C, student_id: i32, course_id: i32) -> Result<()> {
    link(db, Link::StudentCourse { student_id, course_id }).await
}

pub async fn enroll_student_in_group<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    study_group_id: i32,
) -> Result<()> {
    link(db, Link::StudentStudyGroup { student_id, study_group_id }).await
}

pub async fn assign_teacher_to_group<C: ConnectionTrait>(
    db: &C,
    study_group_id: i32,
    teacher_id: i32,
) -> Result<()> {
    link(db, Link::StudyGroupTeacher { study_group_id, teacher_id }).await
}

/// Profile kind owned by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Teacher,
    Student,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Teacher => f.write_str("teacher"),
            Profile::Student => f.write_str("student"),
        }
    }
}

fn map_profile_error(db_error: DbErr, kind: Profile, user_id: i32) -> AcademyError {
    match violation(&db_error) {
        Some(Violation::Unique) => {
            AcademyError::AlreadyLinked(format!("user {user_id} to a {kind} profile"))
        }
        Some(Violation::ForeignKey) => AcademyError::MissingReference(format!("user {user_id}")),
        None => db_error.into(),
    }
}

/// Creates the teacher profile of `user_id`. A user has at most one.
#[instrument(skip(db, descriptions))]
pub async fn create_teacher<C>(db: &C, user_id: i32, descriptions: Option<String>) -> Result<teacher::Model>
where
    C: ConnectionTrait,
{
    let created = teacher::ActiveModel {
        user_id: Set(user_id),
        descriptions: Set(descriptions),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| map_profile_error(e, Profile::Teacher, user_id))?;

    info!("Teacher {} created for user {}", created.id, user_id);
    Ok(created)
}

/// Creates the student profile of `user_id`. A user has at most one.
#[instrument(skip(db, descriptions))]
pub async fn create_student<C>(db: &C, user_id: i32, descriptions: Option<String>) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    let created = student::ActiveModel {
        user_id: Set(user_id),
        descriptions: Set(descriptions),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| map_profile_error(e, Profile::Student, user_id))?;

    info!("Student {} created for user {}", created.id, user_id);
    Ok(created)
}

/// Attributes of a new study group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudyGroup {
    pub title: String,
    pub course_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: Option<String>,
    pub descriptions: Option<String>,
}

/// Inserts a study group. Titles are unique across all groups.
#[instrument(skip(db))]
pub async fn create_study_group<C>(db: &C, new_group: NewStudyGroup) -> Result<study_group::Model>
where
    C: ConnectionTrait,
{
    let title = new_group.title.clone();
    let course_id = new_group.course_id;

    let inserted = study_group::ActiveModel {
        title: Set(new_group.title),
        course_id: Set(new_group.course_id),
        start_date: Set(new_group.start_date),
        end_date: Set(new_group.end_date),
        price: Set(new_group.price),
        descriptions: Set(new_group.descriptions),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(group) => {
            info!("Study group {} '{}' created", group.id, group.title);
            Ok(group)
        }
        Err(db_error) => match violation(&db_error) {
            Some(Violation::Unique) => Err(AcademyError::DuplicateTitle(title)),
            Some(Violation::ForeignKey) => {
                Err(AcademyError::MissingReference(format!("course {course_id}")))
            }
            None => Err(db_error.into()),
        },
    }
}

/// Deletes a user. Its teacher and student profiles go with it.
#[instrument(skip(db))]
pub async fn delete_user<C>(db: &C, user_id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = user::Entity::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AcademyError::NotFound { entity: "User", id: user_id });
    }
    info!("User {} deleted", user_id);
    Ok(())
}

/// Deletes a course unless a study group still points at it.
#[instrument(skip(db))]
pub async fn delete_course<C>(db: &C, course_id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    match course::Entity::delete_by_id(course_id).exec(db).await {
        Ok(result) if result.rows_affected == 0 => {
            Err(AcademyError::NotFound { entity: "Course", id: course_id })
        }
        Ok(_) => {
            info!("Course {} deleted", course_id);
            Ok(())
        }
        Err(db_error) => match violation(&db_error) {
            Some(Violation::ForeignKey) => {
                warn!("Course {} is still used by a study group", course_id);
                Err(AcademyError::CourseInUse(course_id))
            }
            _ => Err(db_error.into()),
        },
    }
}

async fn owner_phone<C, M>(db: &C, profile: &M, user_id: i32) -> Result<String>
where
    C: ConnectionTrait,
    M: ModelTrait + Sync,
    M::Entity: sea_orm::Related<user::Entity>,
{
    profile
        .find_related(user::Entity)
        .one(db)
        .await?
        .map(|owner| owner.phone)
        .ok_or(AcademyError::NotFound { entity: "User", id: user_id })
}

impl teacher::Model {
    /// Text form of a teacher: the owning user's phone.
    pub async fn display_name<C: ConnectionTrait>(&self, db: &C) -> Result<String> {
        owner_phone(db, self, self.user_id).await
    }
}

impl student::Model {
    /// Text form of a student: the owning user's phone.
    pub async fn display_name<C: ConnectionTrait>(&self, db: &C) -> Result<String> {
        owner_phone(db, self, self.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{branch, prelude::*};
    use crate::identity::{UserFields, create_user};
    use crate::test_support::setup_db;
    use sea_orm::{DatabaseConnection, PaginatorTrait};

    async fn insert_course(db: &DatabaseConnection, title: &str) -> course::Model {
        course::ActiveModel {
            title: Set(title.to_string()),
            descriptions: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    async fn insert_branch(db: &DatabaseConnection, title: &str) -> branch::Model {
        branch::ActiveModel {
            title: Set(title.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    fn group(title: &str, course_id: i32) -> NewStudyGroup {
        NewStudyGroup {
            title: title.to_string(),
            course_id,
            start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            price: Some("1200000".to_string()),
            descriptions: None,
        }
    }

    #[tokio::test]
    async fn test_deleting_user_removes_teacher_but_keeps_the_rest() {
        let db = setup_db().await;

        let owner = create_user(&db, "+998901234567", Some("x"), UserFields::default())
            .await
            .unwrap();
        let teacher = create_teacher(&db, owner.id, Some("Mathematics".to_string())).await.unwrap();
        let course = insert_course(&db, "Algebra").await;
        let branch = insert_branch(&db, "Chilonzor").await;
        let group = create_study_group(&db, group("ALG-1", course.id)).await.unwrap();

        assign_teacher_to_branch(&db, teacher.id, branch.id).await.unwrap();
        assign_teacher_to_course(&db, teacher.id, course.id).await.unwrap();
        assign_teacher_to_group(&db, group.id, teacher.id).await.unwrap();

        delete_user(&db, owner.id).await.unwrap();

        assert_eq!(Teacher::find().count(&db).await.unwrap(), 0);
        assert_eq!(TeacherBranch::find().count(&db).await.unwrap(), 0);
        assert_eq!(TeacherCourse::find().count(&db).await.unwrap(), 0);
        assert_eq!(StudyGroupTeacher::find().count(&db).await.unwrap(), 0);
        assert_eq!(StudyGroup::find().count(&db).await.unwrap(), 1);
        assert_eq!(Branch::find().count(&db).await.unwrap(), 1);
        assert_eq!(Course::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_user_removes_student_profile() {
        let db = setup_db().await;

        let owner = create_user(&db, "+998901234567", Some("x"), UserFields::default())
            .await
            .unwrap();
        let student = create_student(&db, owner.id, None).await.unwrap();
        let course = insert_course(&db, "Physics").await;
        enroll_student_in_course(&db, student.id, course.id).await.unwrap();

        delete_user(&db, owner.id).await.unwrap();

        assert_eq!(Student::find().count(&db).await.unwrap(), 0);
        assert_eq!(StudentCourse::find().count(&db).await.unwrap(), 0);
        assert_eq!(Course::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let db = setup_db().await;
        let err = delete_user(&db, 42).await.unwrap_err();
        assert!(matches!(err, AcademyError::NotFound { entity: "User", id: 42 }));
    }

    #[tokio::test]
    async fn test_course_with_study_group_cannot_be_deleted() {
        let db = setup_db().await;

        let used = insert_course(&db, "English").await;
        let unused = insert_course(&db, "German").await;
        create_study_group(&db, group("ENG-A1", used.id)).await.unwrap();

        let err = delete_course(&db, used.id).await.unwrap_err();
        assert!(matches!(err, AcademyError::CourseInUse(id) if id == used.id));
        assert!(Course::find_by_id(used.id).one(&db).await.unwrap().is_some());

        delete_course(&db, unused.id).await.unwrap();
        assert!(Course::find_by_id(unused.id).one(&db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_course_becomes_deletable_after_its_groups_are_gone() {
        let db = setup_db().await;

        let course = insert_course(&db, "Chemistry").await;
        let group = create_study_group(&db, group("CHEM-1", course.id)).await.unwrap();

        assert!(delete_course(&db, course.id).await.is_err());
        StudyGroup::delete_by_id(group.id).exec(&db).await.unwrap();
        delete_course(&db, course.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_study_group_titles_are_unique() {
        let db = setup_db().await;

        let course = insert_course(&db, "Biology").await;
        create_study_group(&db, group("BIO-1", course.id)).await.unwrap();
        let err = create_study_group(&db, group("BIO-1", course.id)).await.unwrap_err();

        assert!(matches!(err, AcademyError::DuplicateTitle(ref t) if t == "BIO-1"));
    }

    #[tokio::test]
    async fn test_study_group_requires_existing_course() {
        let db = setup_db().await;

        let err = create_study_group(&db, group("GHOST", 404)).await.unwrap_err();
        assert!(matches!(err, AcademyError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_study_group_dates_are_stamped() {
        let db = setup_db().await;

        let course = insert_course(&db, "History").await;
        let created = create_study_group(&db, group("HIS-1", course.id)).await.unwrap();

        let today = chrono::Utc::now().date_naive();
        assert_eq!(created.created, today);
        assert_eq!(created.updated, today);
        assert_eq!(created.to_string(), "HIS-1");
    }

    #[tokio::test]
    async fn test_link_pairs_are_stored_once() {
        let db = setup_db().await;

        let owner = create_user(&db, "+998901234567", Some("x"), UserFields::default())
            .await
            .unwrap();
        let student = create_student(&db, owner.id, None).await.unwrap();
        let course = insert_course(&db, "Art").await;
        let group = create_study_group(&db, group("ART-1", course.id)).await.unwrap();

        enroll_student_in_group(&db, student.id, group.id).await.unwrap();
        let err = enroll_student_in_group(&db, student.id, group.id).await.unwrap_err();
        assert!(matches!(err, AcademyError::AlreadyLinked(_)));

        let groups = student.find_related(StudyGroup).all(&db).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, group.id);

        let students = group.find_related(Student).all(&db).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, student.id);
    }

    #[tokio::test]
    async fn test_link_to_missing_row_fails() {
        let db = setup_db().await;

        let branch = insert_branch(&db, "Yunusobod").await;
        let err = assign_teacher_to_branch(&db, 77, branch.id).await.unwrap_err();
        assert!(matches!(err, AcademyError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_unlink_reports_whether_a_row_was_removed() {
        let db = setup_db().await;

        let owner = create_user(&db, "+998901234567", Some("x"), UserFields::default())
            .await
            .unwrap();
        let teacher = create_teacher(&db, owner.id, None).await.unwrap();
        let course = insert_course(&db, "Music").await;
        let pair = Link::TeacherCourse { teacher_id: teacher.id, course_id: course.id };

        link(&db, pair).await.unwrap();
        assert!(unlink(&db, pair).await.unwrap());
        assert!(!unlink(&db, pair).await.unwrap());
        assert_eq!(TeacherCourse::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_may_be_teacher_and_student_but_only_once_each() {
        let db = setup_db().await;

        let owner = create_user(&db, "+998901234567", Some("x"), UserFields::default())
            .await
            .unwrap();
        let teacher = create_teacher(&db, owner.id, None).await.unwrap();
        let student = create_student(&db, owner.id, None).await.unwrap();

        assert_eq!(teacher.display_name(&db).await.unwrap(), "+998901234567");
        assert_eq!(student.display_name(&db).await.unwrap(), "+998901234567");

        let err = create_teacher(&db, owner.id, None).await.unwrap_err();
        assert!(matches!(err, AcademyError::AlreadyLinked(_)));
    }

    #[tokio::test]
    async fn test_profile_requires_existing_user() {
        let db = setup_db().await;
        let err = create_student(&db, 5, None).await.unwrap_err();
        assert!(matches!(err, AcademyError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_branch_defaults_to_active_and_title_limit_applies() {
        let db = setup_db().await;

        let branch = insert_branch(&db, "Sergeli").await;
        assert!(branch.is_active);
        assert_eq!(branch.to_string(), "Sergeli");

        let err = course::ActiveModel {
            title: Set("x".repeat(51)),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap_err();
        assert!(matches!(AcademyError::from(err), AcademyError::FieldRejected(_)));
    }
}
