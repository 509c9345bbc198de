//! Phone-keyed user identity: account factories, password credentials and
//! the single-bit permission model.

mod password;
mod phone;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument, warn};

use crate::entities::user;
use crate::error::{AcademyError, Result, Violation, violation};

pub use password::{
    PASSWORD_MAX_BYTES, UNUSABLE_PASSWORD_PREFIX, is_usable, make_password, verify_password,
};
pub use phone::PhoneNumber;

/// Capability: verification against a hashed credential.
pub trait PasswordCredential {
    /// Returns true when `raw` matches the stored hash.
    fn check_password(&self, raw: &str) -> Result<bool>;

    /// False for accounts created without a password.
    fn has_usable_password(&self) -> bool;
}

/// Capability: the permission hook consumed by authorization.
///
/// The model is flat: admins may do everything, everyone else nothing.
pub trait PermissionCheck {
    fn has_perm(&self, permission: &str, object: Option<i32>) -> bool;

    fn has_module_perms(&self, app_label: &str) -> bool;
}

impl PasswordCredential for user::Model {
    fn check_password(&self, raw: &str) -> Result<bool> {
        verify_password(raw, &self.password)
    }

    fn has_usable_password(&self) -> bool {
        is_usable(&self.password)
    }
}

impl PermissionCheck for user::Model {
    fn has_perm(&self, _permission: &str, _object: Option<i32>) -> bool {
        self.is_admin
    }

    fn has_module_perms(&self, _app_label: &str) -> bool {
        self.is_admin
    }
}

impl user::ActiveModel {
    /// Replaces the stored credential with a hash of `raw`.
    /// `None` leaves the account without a usable password.
    pub fn set_password(&mut self, raw: Option<&str>) -> Result<()> {
        self.password = Set(make_password(raw)?);
        Ok(())
    }
}

/// Optional attributes of a new user. `None` keeps the column default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_student: Option<bool>,
    pub is_teacher: Option<bool>,
}

impl UserFields {
    fn into_active_model(self, phone: PhoneNumber) -> user::ActiveModel {
        let mut model = user::ActiveModel {
            phone: Set(phone.into_inner()),
            full_name: Set(self.full_name),
            ..Default::default()
        };
        if let Some(value) = self.is_active {
            model.is_active = Set(value);
        }
        if let Some(value) = self.is_staff {
            model.is_staff = Set(value);
        }
        if let Some(value) = self.is_admin {
            model.is_admin = Set(value);
        }
        if let Some(value) = self.is_superuser {
            model.is_superuser = Set(value);
        }
        if let Some(value) = self.is_student {
            model.is_student = Set(value);
        }
        if let Some(value) = self.is_teacher {
            model.is_teacher = Set(value);
        }
        model
    }
}

/// Creates a regular user.
///
/// Phone uniqueness is left to the database constraint; no lookup is made
/// before the insert.
#[instrument(skip(db, password, fields))]
pub async fn create_user<C>(
    db: &C,
    phone: &str,
    password: Option<&str>,
    fields: UserFields,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let phone = PhoneNumber::parse(phone)?;
    debug!("Phone number validated");

    let mut model = fields.into_active_model(phone.clone());
    model.set_password(password)?;
    insert_user(db, model, &phone).await
}

/// Creates a user with `is_staff` and `is_superuser` forced on.
///
/// An explicit `Some(false)` for either flag is a caller mistake and is
/// rejected before anything is written.
#[instrument(skip(db, password, fields))]
pub async fn create_superuser<C>(
    db: &C,
    phone: &str,
    password: Option<&str>,
    mut fields: UserFields,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let is_staff = *fields.is_staff.get_or_insert(true);
    let is_superuser = *fields.is_superuser.get_or_insert(true);

    if !is_staff {
        warn!("Refusing to create superuser with is_staff=false");
        return Err(AcademyError::SuperuserMisconfigured("is_staff"));
    }
    if !is_superuser {
        warn!("Refusing to create superuser with is_superuser=false");
        return Err(AcademyError::SuperuserMisconfigured("is_superuser"));
    }

    create_user(db, phone, password, fields).await
}

async fn insert_user<C>(db: &C, model: user::ActiveModel, phone: &PhoneNumber) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    match model.insert(db).await {
        Ok(created) => {
            info!("User created with ID: {}", created.id);
            Ok(created)
        }
        Err(db_error) => match violation(&db_error) {
            Some(Violation::Unique) => {
                warn!("Phone {} is already registered", phone);
                Err(AcademyError::DuplicatePhone(phone.to_string()))
            }
            _ => Err(db_error.into()),
        },
    }
}

/// Looks up an active user by phone and verifies the password.
///
/// Returns `Ok(None)` for an unknown phone, an inactive account or a wrong
/// password. A successful check records `last_login`.
#[instrument(skip(db, password))]
pub async fn authenticate<C>(db: &C, phone: &str, password: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    let Some(found) = user::Entity::find()
        .filter(user::Column::Phone.eq(phone))
        .one(db)
        .await?
    else {
        debug!("No user with this phone");
        return Ok(None);
    };

    if !found.is_active {
        debug!("User {} is inactive", found.id);
        return Ok(None);
    }
    if !found.check_password(password)? {
        debug!("Password mismatch for user {}", found.id);
        return Ok(None);
    }

    let mut active: user::ActiveModel = found.into();
    active.last_login = Set(Some(Utc::now()));
    Ok(Some(active.update(db).await?))
}

/// Stores a new password for an existing user.
#[instrument(skip(db, raw))]
pub async fn change_password<C>(db: &C, user_id: i32, raw: Option<&str>) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let existing = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AcademyError::NotFound { entity: "User", id: user_id })?;

    let mut active: user::ActiveModel = existing.into();
    active.set_password(raw)?;
    Ok(active.update(db).await?)
}
