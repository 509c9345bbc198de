use std::fmt;

use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;

use super::{DESCRIPTIONS_MAX_LEN, TITLE_MAX_LEN, check_len, check_opt_len, teacher};

/// A physical or organizational location offering courses.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "branches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub title: String,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    #[sea_orm(column_type = "String(StringLen::N(500))", nullable)]
    pub descriptions: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::teacher_branch::Entity")]
    TeacherBranch,
}

impl Related<teacher::Entity> for Entity {
    fn to() -> RelationDef {
        super::teacher_branch::Relation::Teacher.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::teacher_branch::Relation::Branch.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            is_active: ActiveValue::Set(true),
            ..<Self as ActiveModelTrait>::default()
        }
    }

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
