pub use sea_orm_migration::prelude::*;

mod m20240901_000001_create_users;
mod m20240901_000002_create_academic_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240901_000001_create_users::Migration),
            Box::new(m20240901_000002_create_academic_tables::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};

    async fn table_names(db: &sea_orm::DatabaseConnection) -> Vec<String> {
        let rows = db
            .query_all(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name".to_string(),
            ))
            .await
            .unwrap();
        rows.iter()
            .map(|row| row.try_get::<String>("", "name").unwrap())
            .collect()
    }

    #[async_std::test]
    async fn test_up_and_down_round_trip() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        let tables = table_names(&db).await;
        for expected in [
            "users",
            "courses",
            "branches",
            "teachers",
            "students",
            "study_groups",
            "teacher_branches",
            "teacher_courses",
            "student_courses",
            "student_study_groups",
            "study_group_teachers",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }

        Migrator::down(&db, None).await.unwrap();
        let tables = table_names(&db).await;
        assert!(!tables.iter().any(|t| t == "users"));
        assert!(!tables.iter().any(|t| t == "study_groups"));
    }
}
