use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(pk_auto(Courses::Id))
                    .col(string(Courses::Title).string_len(50))
                    .col(string_null(Courses::Descriptions).string_len(500))
                    .to_owned(),
            )
            .await?;

        // Create branches table
        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(pk_auto(Branches::Id))
                    .col(string(Branches::Title).string_len(50))
                    .col(boolean(Branches::IsActive).default(true))
                    .col(string_null(Branches::Descriptions).string_len(500))
                    .to_owned(),
            )
            .await?;

        // Create teachers table, one row per user at most
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(pk_auto(Teachers::Id))
                    .col(integer(Teachers::UserId).unique_key())
                    .col(string_null(Teachers::Descriptions).string_len(500))
                    .col(timestamp_with_time_zone(Teachers::Created))
                    .col(timestamp_with_time_zone(Teachers::Updated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teachers_user")
                            .from(Teachers::Table, Teachers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create students table, one row per user at most
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk_auto(Students::Id))
                    .col(integer(Students::UserId).unique_key())
                    .col(string_null(Students::Descriptions).string_len(500))
                    .col(timestamp_with_time_zone(Students::Created))
                    .col(timestamp_with_time_zone(Students::Updated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_user")
                            .from(Students::Table, Students::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create study_groups table; a referenced course cannot be deleted
        manager
            .create_table(
                Table::create()
                    .table(StudyGroups::Table)
                    .if_not_exists()
                    .col(pk_auto(StudyGroups::Id))
                    .col(string(StudyGroups::Title).string_len(50).unique_key())
                    .col(integer(StudyGroups::CourseId))
                    .col(date(StudyGroups::StartDate))
                    .col(date(StudyGroups::EndDate))
                    .col(string_null(StudyGroups::Price).string_len(15))
                    .col(string_null(StudyGroups::Descriptions).string_len(500))
                    .col(date(StudyGroups::Created))
                    .col(date(StudyGroups::Updated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_study_groups_course")
                            .from(StudyGroups::Table, StudyGroups::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Join tables
        manager
            .create_table(junction_table(
                "teacher_branches",
                ("teacher_id", Teachers::Table, Teachers::Id),
                ("branch_id", Branches::Table, Branches::Id),
            ))
            .await?;

        manager
            .create_table(junction_table(
                "teacher_courses",
                ("teacher_id", Teachers::Table, Teachers::Id),
                ("course_id", Courses::Table, Courses::Id),
            ))
            .await?;

        manager
            .create_table(junction_table(
                "student_courses",
                ("student_id", Students::Table, Students::Id),
                ("course_id", Courses::Table, Courses::Id),
            ))
            .await?;

        manager
            .create_table(junction_table(
                "student_study_groups",
                ("student_id", Students::Table, Students::Id),
                ("study_group_id", StudyGroups::Table, StudyGroups::Id),
            ))
            .await?;

        manager
            .create_table(junction_table(
                "study_group_teachers",
                ("study_group_id", StudyGroups::Table, StudyGroups::Id),
                ("teacher_id", Teachers::Table, Teachers::Id),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        for junction in [
            "study_group_teachers",
            "student_study_groups",
            "student_courses",
            "teacher_courses",
            "teacher_branches",
        ] {
            manager
                .drop_table(Table::drop().table(Alias::new(junction)).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(StudyGroups::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Branches::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        Ok(())
    }
}

/// Builds a two-column join table keyed on the pair. Removing either side
/// removes the row.
fn junction_table<L, R>(
    name: &str,
    (left_col, left_table, left_id): (&str, L, L),
    (right_col, right_table, right_id): (&str, R, R),
) -> TableCreateStatement
where
    L: Iden + 'static,
    R: Iden + 'static,
{
    let table = Alias::new(name);
    let left = Alias::new(left_col);
    let right = Alias::new(right_col);

    Table::create()
        .table(table.clone())
        .if_not_exists()
        .col(integer(left.clone()))
        .col(integer(right.clone()))
        .primary_key(
            Index::create()
                .name(format!("pk_{name}"))
                .col(left.clone())
                .col(right.clone()),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_{left_col}"))
                .from(table.clone(), left)
                .to(left_table, left_id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_{right_col}"))
                .from(table, right)
                .to(right_table, right_id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Title,
    Descriptions,
}

#[derive(DeriveIden)]
enum Branches {
    Table,
    Id,
    Title,
    IsActive,
    Descriptions,
}

#[derive(DeriveIden)]
enum Teachers {
    Table,
    Id,
    UserId,
    Descriptions,
    Created,
    Updated,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    UserId,
    Descriptions,
    Created,
    Updated,
}

#[derive(DeriveIden)]
enum StudyGroups {
    Table,
    Id,
    Title,
    CourseId,
    StartDate,
    EndDate,
    Price,
    Descriptions,
    Created,
    Updated,
}
