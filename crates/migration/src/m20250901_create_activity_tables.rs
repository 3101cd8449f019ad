use sea_orm_migration::prelude::*;

use crate::m20250901_create_campus_tables::{Classes, Departments, Subjects, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create attendance table, one row per (class, subject, date, period)
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attendance::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attendance::ClassId).uuid().not_null())
                    .col(ColumnDef::new(Attendance::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(Attendance::Date).date().not_null())
                    .col(ColumnDef::new(Attendance::Period).integer().not_null())
                    .col(ColumnDef::new(Attendance::MarkedBy).uuid())
                    .col(ColumnDef::new(Attendance::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Attendance::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance-class_id")
                            .from(Attendance::Table, Attendance::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance-subject_id")
                            .from(Attendance::Table, Attendance::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance-marked_by")
                            .from(Attendance::Table, Attendance::MarkedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create attendance_records table
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::AttendanceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::StudentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance_records-attendance_id")
                            .from(AttendanceRecords::Table, AttendanceRecords::AttendanceId)
                            .to(Attendance::Table, Attendance::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance_records-student_id")
                            .from(AttendanceRecords::Table, AttendanceRecords::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create grades table
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Grades::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Grades::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Grades::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(Grades::ClassId).uuid())
                    .col(ColumnDef::new(Grades::Semester).integer().not_null())
                    .col(ColumnDef::new(Grades::AcademicYear).string().not_null())
                    .col(ColumnDef::new(Grades::Mid1).double())
                    .col(ColumnDef::new(Grades::Mid2).double())
                    .col(ColumnDef::new(Grades::External).double())
                    .col(ColumnDef::new(Grades::InternalMarks).double().not_null())
                    .col(ColumnDef::new(Grades::TotalMarks).double().not_null())
                    .col(ColumnDef::new(Grades::Grade).string().not_null())
                    .col(ColumnDef::new(Grades::GradePoints).double().not_null())
                    .col(ColumnDef::new(Grades::Credits).integer().not_null())
                    .col(
                        ColumnDef::new(Grades::IsReleased)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Grades::GradedBy).uuid())
                    .col(ColumnDef::new(Grades::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Grades::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grades-student_id")
                            .from(Grades::Table, Grades::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grades-subject_id")
                            .from(Grades::Table, Grades::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grades-class_id")
                            .from(Grades::Table, Grades::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grades-graded_by")
                            .from(Grades::Table, Grades::GradedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create notices table
        manager
            .create_table(
                Table::create()
                    .table(Notices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notices::Title).string().not_null())
                    .col(ColumnDef::new(Notices::Content).text().not_null())
                    .col(ColumnDef::new(Notices::Category).string().not_null())
                    .col(ColumnDef::new(Notices::Priority).string().not_null())
                    .col(ColumnDef::new(Notices::TargetRoles).json().not_null())
                    .col(ColumnDef::new(Notices::DepartmentId).uuid())
                    .col(ColumnDef::new(Notices::ClassId).uuid())
                    .col(ColumnDef::new(Notices::Attachments).json().not_null())
                    .col(ColumnDef::new(Notices::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Notices::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Notices::ExpiresAt).timestamp())
                    .col(ColumnDef::new(Notices::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Notices::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notices-author_id")
                            .from(Notices::Table, Notices::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notices-department_id")
                            .from(Notices::Table, Notices::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notices-class_id")
                            .from(Notices::Table, Notices::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create complaints table
        manager
            .create_table(
                Table::create()
                    .table(Complaints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaints::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Complaints::Title).string().not_null())
                    .col(ColumnDef::new(Complaints::Description).text().not_null())
                    .col(ColumnDef::new(Complaints::Category).string().not_null())
                    .col(ColumnDef::new(Complaints::Priority).string().not_null())
                    .col(ColumnDef::new(Complaints::Status).string().not_null())
                    .col(ColumnDef::new(Complaints::RaisedBy).uuid().not_null())
                    .col(ColumnDef::new(Complaints::DepartmentId).uuid())
                    .col(ColumnDef::new(Complaints::AssignedTo).uuid())
                    .col(ColumnDef::new(Complaints::Resolution).text())
                    .col(ColumnDef::new(Complaints::Attachments).json().not_null())
                    .col(ColumnDef::new(Complaints::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Complaints::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-complaints-raised_by")
                            .from(Complaints::Table, Complaints::RaisedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-complaints-department_id")
                            .from(Complaints::Table, Complaints::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-complaints-assigned_to")
                            .from(Complaints::Table, Complaints::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create complaint_history table
        manager
            .create_table(
                Table::create()
                    .table(ComplaintHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintHistory::ComplaintId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintHistory::Status).string().not_null())
                    .col(ColumnDef::new(ComplaintHistory::Comment).text())
                    .col(ColumnDef::new(ComplaintHistory::ChangedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(ComplaintHistory::ChangedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-complaint_history-complaint_id")
                            .from(ComplaintHistory::Table, ComplaintHistory::ComplaintId)
                            .to(Complaints::Table, Complaints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-complaint_history-changed_by")
                            .from(ComplaintHistory::Table, ComplaintHistory::ChangedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create chats table
        manager
            .create_table(
                Table::create()
                    .table(Chats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Chats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Chats::ChatType).string().not_null())
                    .col(ColumnDef::new(Chats::Name).string())
                    .col(ColumnDef::new(Chats::DepartmentId).uuid())
                    .col(ColumnDef::new(Chats::CreatedBy).uuid())
                    .col(ColumnDef::new(Chats::LastMessageAt).timestamp())
                    .col(ColumnDef::new(Chats::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Chats::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chats-department_id")
                            .from(Chats::Table, Chats::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chats-created_by")
                            .from(Chats::Table, Chats::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create chat_participants table
        manager
            .create_table(
                Table::create()
                    .table(ChatParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatParticipants::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatParticipants::ChatId).uuid().not_null())
                    .col(ColumnDef::new(ChatParticipants::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ChatParticipants::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChatParticipants::IsMuted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChatParticipants::HasBlocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ChatParticipants::LastReadAt).timestamp())
                    .col(
                        ColumnDef::new(ChatParticipants::JoinedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chat_participants-chat_id")
                            .from(ChatParticipants::Table, ChatParticipants::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chat_participants-user_id")
                            .from(ChatParticipants::Table, ChatParticipants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create chat_messages table
        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatMessages::ChatId).uuid().not_null())
                    .col(ColumnDef::new(ChatMessages::SenderId).uuid().not_null())
                    .col(ColumnDef::new(ChatMessages::Content).text().not_null())
                    .col(
                        ColumnDef::new(ChatMessages::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChatMessages::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chat_messages-chat_id")
                            .from(ChatMessages::Table, ChatMessages::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chat_messages-sender_id")
                            .from(ChatMessages::Table, ChatMessages::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            ChatMessages::Table.into_iden(),
            ChatParticipants::Table.into_iden(),
            Chats::Table.into_iden(),
            ComplaintHistory::Table.into_iden(),
            Complaints::Table.into_iden(),
            Notices::Table.into_iden(),
            Grades::Table.into_iden(),
            AttendanceRecords::Table.into_iden(),
            Attendance::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Attendance {
    Table,
    Id,
    ClassId,
    SubjectId,
    Date,
    Period,
    MarkedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum AttendanceRecords {
    Table,
    Id,
    AttendanceId,
    StudentId,
    Status,
}

#[derive(Iden)]
pub(crate) enum Grades {
    Table,
    Id,
    StudentId,
    SubjectId,
    ClassId,
    Semester,
    AcademicYear,
    Mid1,
    Mid2,
    External,
    InternalMarks,
    TotalMarks,
    Grade,
    GradePoints,
    Credits,
    IsReleased,
    GradedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Notices {
    Table,
    Id,
    Title,
    Content,
    Category,
    Priority,
    TargetRoles,
    DepartmentId,
    ClassId,
    Attachments,
    AuthorId,
    IsActive,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Complaints {
    Table,
    Id,
    Title,
    Description,
    Category,
    Priority,
    Status,
    RaisedBy,
    DepartmentId,
    AssignedTo,
    Resolution,
    Attachments,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum ComplaintHistory {
    Table,
    Id,
    ComplaintId,
    Status,
    Comment,
    ChangedBy,
    ChangedAt,
}

#[derive(Iden)]
pub(crate) enum Chats {
    Table,
    Id,
    ChatType,
    Name,
    DepartmentId,
    CreatedBy,
    LastMessageAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum ChatParticipants {
    Table,
    Id,
    ChatId,
    UserId,
    IsAdmin,
    IsMuted,
    HasBlocked,
    LastReadAt,
    JoinedAt,
}

#[derive(Iden)]
pub(crate) enum ChatMessages {
    Table,
    Id,
    ChatId,
    SenderId,
    Content,
    IsDeleted,
    CreatedAt,
}
