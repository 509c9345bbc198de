use std::fmt;

use sea_orm::entity::prelude::*;

use super::{DESCRIPTIONS_MAX_LEN, TITLE_MAX_LEN, check_len, check_opt_len, student, study_group, teacher};

/// A subject offering, independent of any schedule.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub title: String,
    #[sea_orm(column_type = "String(StringLen::N(500))", nullable)]
    pub descriptions: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Scheduled groups of this course. They block deletion of the course.
    #[sea_orm(has_many = "study_group::Entity")]
    StudyGroup,
    #[sea_orm(has_many = "super::teacher_course::Entity")]
    TeacherCourse,
    #[sea_orm(has_many = "super::student_course::Entity")]
    StudentCourse,
}

impl Related<study_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudyGroup.def()
    }
}

impl Related<teacher::Entity> for Entity {
    fn to() -> RelationDef {
        super::teacher_course::Relation::Teacher.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::teacher_course::Relation::Course.def().rev())
    }
}

impl Related<student::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_course::Relation::Student.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::student_course::Relation::Course.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        check_len("title", &self.title, TITLE_MAX_LEN)?;
        check_opt_len("descriptions", &self.descriptions, DESCRIPTIONS_MAX_LEN)?;
        Ok(self)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
