use std::fmt;

use chrono::NaiveDate;
use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;

use super::{DESCRIPTIONS_MAX_LEN, TITLE_MAX_LEN, check_len, check_opt_len, course, student, teacher};

/// Maximum length of the free-form price label.
pub const PRICE_MAX_LEN: usize = 15;

/// A scheduled run of a course with its own teachers and students.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "study_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, column_type = "String(StringLen::N(50))")]
    pub title: String,
    /// The course cannot be deleted while this group points at it.
    pub course_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Kept as text, e.g. "1 200 000 so'm".
    #[sea_orm(column_type = "String(StringLen::N(15))", nullable)]
    pub price: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(500))", nullable)]
    pub descriptions: Option<String>,
    // Day precision only
    pub created: NaiveDate,
    pub updated: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "course::Entity",
        from = "Column::CourseId",
        to = "course::Column::Id",
        on_delete = "Restrict"
    )]
    Course,
    #[sea_orm(has_many = "super::study_group_teacher::Entity")]
    StudyGroupTeacher,
    #[sea_orm(has_many = "super::student_study_group::Entity")]
    StudentStudyGroup,
}

impl Related<course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<teacher::Entity> for Entity {
    fn to() -> RelationDef {
        super::study_group_teacher::Relation::Teacher.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::study_group_teacher::Relation::StudyGroup.def().rev())
    }
}

impl Related<student::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_study_group::Relation::Student.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::student_study_group::Relation::StudyGroup.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        check_len("title", &self.title, TITLE_MAX_LEN)?;
        check_opt_len("price", &self.price, PRICE_MAX_LEN)?;
        check_opt_len("descriptions", &self.descriptions, DESCRIPTIONS_MAX_LEN)?;

        let today = chrono::Utc::now().date_naive();
        if insert && self.created.is_not_set() {
            self.created = ActiveValue::Set(today);
        }
        self.updated = ActiveValue::Set(today);
        Ok(self)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
