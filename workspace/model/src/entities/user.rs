use std::fmt;

use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;

use super::{FIELD_CHECK_PREFIX, check_opt_len, student, teacher};
use crate::identity::PhoneNumber;

/// Maximum length of a user's full name.
pub const FULL_NAME_MAX_LEN: usize = 50;

/// A login identity. The phone number takes the place of a username.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `+998` followed by nine digits. Never changes after insert.
    #[sea_orm(unique, column_type = "String(StringLen::N(13))")]
    pub phone: String,
    /// bcrypt hash, or an unusable marker starting with `!`.
    pub password: String,
    #[sea_orm(column_type = "String(StringLen::N(50))", nullable)]
    pub full_name: Option<String>,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    #[sea_orm(default_value = "false")]
    pub is_staff: bool,
    #[sea_orm(default_value = "false")]
    pub is_admin: bool,
    #[sea_orm(default_value = "false")]
    pub is_superuser: bool,
    #[sea_orm(default_value = "false")]
    pub is_student: bool,
    #[sea_orm(default_value = "false")]
    pub is_teacher: bool,
    pub last_login: Option<DateTimeUtc>,
    pub created: DateTimeUtc,
    pub updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// At most one teacher profile per user.
    #[sea_orm(has_one = "teacher::Entity")]
    Teacher,
    /// At most one student profile per user.
    #[sea_orm(has_one = "student::Entity")]
    Student,
}

impl Related<teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            is_active: ActiveValue::Set(true),
            is_staff: ActiveValue::Set(false),
            is_admin: ActiveValue::Set(false),
            is_superuser: ActiveValue::Set(false),
            is_student: ActiveValue::Set(false),
            is_teacher: ActiveValue::Set(false),
            ..<Self as ActiveModelTrait>::default()
        }
    }

    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let ActiveValue::Set(phone) = &self.phone {
            if !insert {
                // Re-setting the stored value is a no-op, anything else is a change
                let stored = match &self.id {
                    ActiveValue::Set(id) | ActiveValue::Unchanged(id) => {
                        Entity::find_by_id(*id).one(db).await?
                    }
                    ActiveValue::NotSet => None,
                };
                if stored.is_some_and(|existing| existing.phone != *phone) {
                    return Err(DbErr::Custom(format!(
                        "{FIELD_CHECK_PREFIX}: phone cannot be changed once the user exists"
                    )));
                }
            }
            PhoneNumber::parse(phone)
                .map_err(|e| DbErr::Custom(format!("{FIELD_CHECK_PREFIX}: {e}")))?;
        }
        check_opt_len("full_name", &self.full_name, FULL_NAME_MAX_LEN)?;

        let now = chrono::Utc::now();
        if insert && self.created.is_not_set() {
            self.created = ActiveValue::Set(now);
        }
        self.updated = ActiveValue::Set(now);
        Ok(self)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phone)
    }
}
