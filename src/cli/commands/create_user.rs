use anyhow::Result;
use model::identity::{create_superuser, create_user, UserFields};
use sea_orm::Database;
use tracing::{info, debug, error};

use crate::cli::AccountArgs;

/// Which factory the account goes through
#[derive(Debug, Clone, Copy)]
pub enum AccountKind {
    Regular { student: bool, teacher: bool },
    Superuser { admin: bool },
}

pub async fn create_account(args: AccountArgs, kind: AccountKind) -> Result<()> {
    debug!("Creating {:?} account for phone {}", kind, args.phone);

    let db = Database::connect(&args.database_url).await?;

    let mut fields = UserFields {
        full_name: args.full_name,
        ..Default::default()
    };

    let created = match kind {
        AccountKind::Regular { student, teacher } => {
            fields.is_student = Some(student);
            fields.is_teacher = Some(teacher);
            create_user(&db, &args.phone, args.password.as_deref(), fields).await
        }
        AccountKind::Superuser { admin } => {
            fields.is_admin = Some(admin);
            create_superuser(&db, &args.phone, args.password.as_deref(), fields).await
        }
    };

    match created {
        Ok(user) => {
            info!("Created user {} with ID {}", user, user.id);
            if args.password.is_none() {
                info!("No password given; the account cannot log in until one is set");
            }
            Ok(())
        }
        Err(e) => {
            error!("Failed to create user {}: {}", args.phone, e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::user;
    use model::identity::PasswordCredential;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    async fn fresh_database(tag: &str) -> (std::path::PathBuf, String) {
        let path = std::env::temp_dir().join(format!("academy-{}-{}.db", tag, std::process::id()));
        let _ = std::fs::remove_file(&path);
        let url = format!("sqlite://{}?mode=rwc", path.display());
        crate::cli::commands::init_database(&url).await.unwrap();
        (path, url)
    }

    #[tokio::test]
    async fn test_create_superuser_command_sets_flags() {
        let (path, url) = fresh_database("superuser").await;

        let args = AccountArgs {
            phone: "+998901112233".to_string(),
            password: Some("admin-pass".to_string()),
            full_name: Some("Root".to_string()),
            database_url: url.clone(),
        };
        create_account(args, AccountKind::Superuser { admin: true }).await.unwrap();

        let db = Database::connect(&url).await.unwrap();
        let stored = user::Entity::find()
            .filter(user::Column::Phone.eq("+998901112233"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_staff && stored.is_superuser && stored.is_admin);
        assert!(stored.check_password("admin-pass").unwrap());

        drop(db);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_create_user_command_rejects_bad_phone() {
        let (path, url) = fresh_database("badphone").await;

        let args = AccountArgs {
            phone: "998901234567".to_string(),
            password: None,
            full_name: None,
            database_url: url,
        };
        let result = create_account(args, AccountKind::Regular { student: true, teacher: false }).await;
        assert!(result.is_err());

        let _ = std::fs::remove_file(&path);
    }
}
