//! Migration: Create the registry tables.
//!
//! The unique indexes declared here are the authoritative invariants the
//! services rely on: student identifiers and phones are globally unique,
//! usernames are unique, and a (student, course) pair enrolls at most once.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Major::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Major::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Major::MajorCode)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Major::MajorName).string_len(100).not_null())
                    .col(ColumnDef::new(Major::Description).text().null())
                    .col(
                        ColumnDef::new(Major::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Major::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Student::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Student::StudentId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Student::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Student::Age).integer().not_null())
                    .col(
                        ColumnDef::new(Student::Phone)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Student::EnrollmentDate).date().not_null())
                    .col(ColumnDef::new(Student::SequenceNumber).integer().not_null())
                    .col(ColumnDef::new(Student::MajorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Student::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Student::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_major")
                            .from(Student::Table, Student::MajorId)
                            .to(Major::Table, Major::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Max-sequence queries filter by major and enrollment year
        manager
            .create_index(
                Index::create()
                    .name("idx_student_major_enrollment")
                    .table(Student::Table)
                    .col(Student::MajorId)
                    .col(Student::EnrollmentDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Course::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Course::CourseCode)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Course::CourseName).string_len(100).not_null())
                    .col(ColumnDef::new(Course::Description).text().null())
                    .col(
                        ColumnDef::new(Course::Credits)
                            .decimal_len(3, 1)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Course::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Course::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Account::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Account::Username)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Account::PasswordDigest)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Account::Role).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Account::FirstLogin)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Account::StudentId)
                            .uuid()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Account::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_student")
                            .from(Account::Table, Account::StudentId)
                            .to(Student::Table, Student::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enrollment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollment::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollment::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Enrollment::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(Enrollment::SelectedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_student")
                            .from(Enrollment::Table, Enrollment::StudentId)
                            .to(Student::Table, Student::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_course")
                            .from(Enrollment::Table, Enrollment::CourseId)
                            .to(Course::Table, Course::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one enrollment per (student, course) pair
        manager
            .create_index(
                Index::create()
                    .name("uk_enrollment_student_course")
                    .table(Enrollment::Table)
                    .col(Enrollment::StudentId)
                    .col(Enrollment::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enrollment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Student::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Major::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Major {
    Table,
    Id,
    MajorCode,
    MajorName,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Student {
    Table,
    Id,
    StudentId,
    Name,
    Age,
    Phone,
    EnrollmentDate,
    SequenceNumber,
    MajorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Course {
    Table,
    Id,
    CourseCode,
    CourseName,
    Description,
    Credits,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
    Username,
    PasswordDigest,
    Role,
    FirstLogin,
    StudentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Enrollment {
    Table,
    Id,
    StudentId,
    CourseId,
    SelectedAt,
}
