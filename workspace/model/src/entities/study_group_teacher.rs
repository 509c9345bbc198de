use super::{study_group, teacher};
use sea_orm::entity::prelude::*;

/// Assignment of a teacher to a study group.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "study_group_teachers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub study_group_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub teacher_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "study_group::Entity",
        from = "Column::StudyGroupId",
        to = "study_group::Column::Id",
        on_delete = "Cascade"
    )]
    StudyGroup,
    #[sea_orm(
        belongs_to = "teacher::Entity",
        from = "Column::TeacherId",
        to = "teacher::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
}

impl Related<study_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudyGroup.def()
    }
}

impl Related<teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
