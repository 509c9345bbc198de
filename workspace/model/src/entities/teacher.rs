use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;

use super::{DESCRIPTIONS_MAX_LEN, branch, check_opt_len, course, study_group, user};

/// Teaching profile of a user. Removed together with its user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(column_type = "String(StringLen::N(500))", nullable)]
    pub descriptions: Option<String>,
    pub created: DateTimeUtc,
    pub updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::teacher_branch::Entity")]
    TeacherBranch,
    #[sea_orm(has_many = "super::teacher_course::Entity")]
    TeacherCourse,
    #[sea_orm(has_many = "super::study_group_teacher::Entity")]
    StudyGroupTeacher,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<branch::Entity> for Entity {
    fn to() -> RelationDef {
        super::teacher_branch::Relation::Branch.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::teacher_branch::Relation::Teacher.def().rev())
    }
}

impl Related<course::Entity> for Entity {
    fn to() -> RelationDef {
        super::teacher_course::Relation::Course.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::teacher_course::Relation::Teacher.def().rev())
    }
}

impl Related<study_group::Entity> for Entity {
    fn to() -> RelationDef {
        super::study_group_teacher::Relation::StudyGroup.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::study_group_teacher::Relation::Teacher.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        check_opt_len("descriptions", &self.descriptions, DESCRIPTIONS_MAX_LEN)?;

        let now = chrono::Utc::now();
        if insert && self.created.is_not_set() {
            self.created = ActiveValue::Set(now);
        }
        self.updated = ActiveValue::Set(now);
        Ok(self)
    }
}
