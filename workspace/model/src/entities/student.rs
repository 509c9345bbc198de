use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;

use super::{DESCRIPTIONS_MAX_LEN, check_opt_len, course, study_group, user};

/// Learner profile of a user. Removed together with its user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
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
    #[sea_orm(has_many = "super::student_course::Entity")]
    StudentCourse,
    #[sea_orm(has_many = "super::student_study_group::Entity")]
    StudentStudyGroup,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<course::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_course::Relation::Course.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::student_course::Relation::Student.def().rev())
    }
}

impl Related<study_group::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_study_group::Relation::StudyGroup.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::student_study_group::Relation::Student.def().rev())
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
