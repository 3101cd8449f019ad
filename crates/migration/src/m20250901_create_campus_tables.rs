use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create departments table
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Departments::Description).text())
                    .col(ColumnDef::new(Departments::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Departments::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Create users table. `class_id` carries no foreign key because classes
        // reference users (class teacher) and SQLite cannot add one afterwards.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::DepartmentId).uuid())
                    .col(ColumnDef::new(Users::ClassId).uuid())
                    .col(ColumnDef::new(Users::Semester).integer())
                    .col(ColumnDef::new(Users::RollNumber).string())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Users::IsClassTeacher)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::Cgpa).double())
                    .col(ColumnDef::new(Users::ResetToken).string())
                    .col(ColumnDef::new(Users::ResetTokenExpiresAt).timestamp())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-department_id")
                            .from(Users::Table, Users::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create classes table
        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Classes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Classes::Name).string().not_null())
                    .col(ColumnDef::new(Classes::Section).string().not_null())
                    .col(ColumnDef::new(Classes::DepartmentId).uuid().not_null())
                    .col(ColumnDef::new(Classes::Semester).integer().not_null())
                    .col(ColumnDef::new(Classes::AcademicYear).string().not_null())
                    .col(ColumnDef::new(Classes::ClassTeacherId).uuid())
                    .col(ColumnDef::new(Classes::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Classes::CurrentStrength)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Classes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Classes::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-classes-department_id")
                            .from(Classes::Table, Classes::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-classes-class_teacher_id")
                            .from(Classes::Table, Classes::ClassTeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create subjects table
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Subjects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Subjects::Name).string().not_null())
                    .col(ColumnDef::new(Subjects::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Subjects::Credits).integer().not_null())
                    .col(ColumnDef::new(Subjects::Semester).integer().not_null())
                    .col(ColumnDef::new(Subjects::DepartmentId).uuid().not_null())
                    .col(ColumnDef::new(Subjects::Description).text())
                    .col(ColumnDef::new(Subjects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Subjects::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subjects-department_id")
                            .from(Subjects::Table, Subjects::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create class_subjects junction table (subject + assigned faculty per class)
        manager
            .create_table(
                Table::create()
                    .table(ClassSubjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSubjects::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassSubjects::ClassId).uuid().not_null())
                    .col(ColumnDef::new(ClassSubjects::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(ClassSubjects::FacultyId).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-class_subjects-class_id")
                            .from(ClassSubjects::Table, ClassSubjects::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-class_subjects-subject_id")
                            .from(ClassSubjects::Table, ClassSubjects::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-class_subjects-faculty_id")
                            .from(ClassSubjects::Table, ClassSubjects::FacultyId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create subject_faculty junction table (many-to-many)
        manager
            .create_table(
                Table::create()
                    .table(SubjectFaculty::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubjectFaculty::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubjectFaculty::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(SubjectFaculty::FacultyId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subject_faculty-subject_id")
                            .from(SubjectFaculty::Table, SubjectFaculty::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subject_faculty-faculty_id")
                            .from(SubjectFaculty::Table, SubjectFaculty::FacultyId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create semester_records table
        manager
            .create_table(
                Table::create()
                    .table(SemesterRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SemesterRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SemesterRecords::UserId).uuid().not_null())
                    .col(ColumnDef::new(SemesterRecords::Semester).integer().not_null())
                    .col(ColumnDef::new(SemesterRecords::Sgpa).double().not_null())
                    .col(
                        ColumnDef::new(SemesterRecords::TotalCredits)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SemesterRecords::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SemesterRecords::IsReleased)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SemesterRecords::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-semester_records-user_id")
                            .from(SemesterRecords::Table, SemesterRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create timetables table (one per class)
        manager
            .create_table(
                Table::create()
                    .table(Timetables::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Timetables::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Timetables::ClassId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Timetables::AcademicYear).string().not_null())
                    .col(ColumnDef::new(Timetables::Semester).integer().not_null())
                    .col(ColumnDef::new(Timetables::GeneratedBy).uuid())
                    .col(ColumnDef::new(Timetables::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Timetables::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timetables-class_id")
                            .from(Timetables::Table, Timetables::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timetables-generated_by")
                            .from(Timetables::Table, Timetables::GeneratedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create timetable_periods table
        manager
            .create_table(
                Table::create()
                    .table(TimetablePeriods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimetablePeriods::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TimetablePeriods::TimetableId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimetablePeriods::Day).string().not_null())
                    .col(
                        ColumnDef::new(TimetablePeriods::PeriodNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimetablePeriods::SubjectId).uuid())
                    .col(ColumnDef::new(TimetablePeriods::FacultyId).uuid())
                    .col(
                        ColumnDef::new(TimetablePeriods::StartTime)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimetablePeriods::EndTime).string().not_null())
                    .col(ColumnDef::new(TimetablePeriods::Room).string())
                    .col(
                        ColumnDef::new(TimetablePeriods::PeriodType)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timetable_periods-timetable_id")
                            .from(TimetablePeriods::Table, TimetablePeriods::TimetableId)
                            .to(Timetables::Table, Timetables::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timetable_periods-subject_id")
                            .from(TimetablePeriods::Table, TimetablePeriods::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-timetable_periods-faculty_id")
                            .from(TimetablePeriods::Table, TimetablePeriods::FacultyId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order of creation
        manager
            .drop_table(Table::drop().table(TimetablePeriods::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Timetables::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SemesterRecords::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SubjectFaculty::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClassSubjects::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Departments {
    Table,
    Id,
    Name,
    Code,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    DepartmentId,
    ClassId,
    Semester,
    RollNumber,
    Phone,
    Status,
    IsClassTeacher,
    Cgpa,
    ResetToken,
    ResetTokenExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Classes {
    Table,
    Id,
    Name,
    Section,
    DepartmentId,
    Semester,
    AcademicYear,
    ClassTeacherId,
    Capacity,
    CurrentStrength,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Subjects {
    Table,
    Id,
    Name,
    Code,
    Credits,
    Semester,
    DepartmentId,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum ClassSubjects {
    Table,
    Id,
    ClassId,
    SubjectId,
    FacultyId,
}

#[derive(Iden)]
pub(crate) enum SubjectFaculty {
    Table,
    Id,
    SubjectId,
    FacultyId,
}

#[derive(Iden)]
pub(crate) enum SemesterRecords {
    Table,
    Id,
    UserId,
    Semester,
    Sgpa,
    TotalCredits,
    IsCompleted,
    IsReleased,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Timetables {
    Table,
    Id,
    ClassId,
    AcademicYear,
    Semester,
    GeneratedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum TimetablePeriods {
    Table,
    Id,
    TimetableId,
    Day,
    PeriodNumber,
    SubjectId,
    FacultyId,
    StartTime,
    EndTime,
    Room,
    PeriodType,
}
