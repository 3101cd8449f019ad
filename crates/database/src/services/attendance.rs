use crate::{
    entities::{attendance, attendance_records, class_subjects, subjects, users},
    error::{ServiceError, ServiceResult},
    services::{class::ClassService, now},
};
use chrono::NaiveDate;
use log::info;
use models::attendance::{AttendanceStatus, AttendanceSummary};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct StudentMark {
    pub student_id: Uuid,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub class_id: Uuid,
    pub subject_id: Uuid,
    pub date: NaiveDate,
    pub period: i32,
    pub records: Vec<StudentMark>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub subject_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// One marked period with a row per student
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    pub attendance: attendance::Model,
    pub records: Vec<attendance_records::Model>,
}

#[derive(Debug, Clone)]
pub struct SubjectAttendance {
    pub subject: subjects::Model,
    pub summary: AttendanceSummary,
}

#[derive(Debug, Clone)]
pub struct StudentAttendance {
    pub subjects: Vec<SubjectAttendance>,
    pub overall: AttendanceSummary,
}

pub struct AttendanceService;

impl AttendanceService {
    /// Records a period; marking the same class, subject, date and period twice conflicts
    pub async fn mark(
        db: &DatabaseConnection,
        new: NewAttendance,
        marked_by: Option<Uuid>,
    ) -> ServiceResult<AttendanceSession> {
        if new.period < 1 {
            return Err(ServiceError::validation("Period must be positive"));
        }

        let txn = db.begin().await?;
        ClassService::get(&txn, new.class_id).await?;
        let taught = class_subjects::Entity::find()
            .filter(class_subjects::Column::ClassId.eq(new.class_id))
            .filter(class_subjects::Column::SubjectId.eq(new.subject_id))
            .count(&txn)
            .await?;
        if taught == 0 {
            return Err(ServiceError::validation(
                "Subject is not assigned to this class",
            ));
        }
        Self::check_roster(&txn, new.class_id, &new.records).await?;

        let duplicate = attendance::Entity::find()
            .filter(attendance::Column::ClassId.eq(new.class_id))
            .filter(attendance::Column::SubjectId.eq(new.subject_id))
            .filter(attendance::Column::Date.eq(new.date))
            .filter(attendance::Column::Period.eq(new.period))
            .count(&txn)
            .await?;
        if duplicate > 0 {
            return Err(ServiceError::conflict(
                "Attendance already marked for this period",
            ));
        }

        let timestamp = now();
        let session = attendance::ActiveModel {
            id: Set(Uuid::new_v4()),
            class_id: Set(new.class_id),
            subject_id: Set(new.subject_id),
            date: Set(new.date),
            period: Set(new.period),
            marked_by: Set(marked_by),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        let records = Self::insert_records(&txn, session.id, &new.records).await?;
        txn.commit().await?;

        info!(
            "Marked attendance {} for class {} ({} students)",
            session.id,
            session.class_id,
            records.len()
        );
        Ok(AttendanceSession {
            attendance: session,
            records,
        })
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<AttendanceSession> {
        let attendance = attendance::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Attendance"))?;
        let records = attendance_records::Entity::find()
            .filter(attendance_records::Column::AttendanceId.eq(id))
            .all(db)
            .await?;

        Ok(AttendanceSession {
            attendance,
            records,
        })
    }

    /// Replaces every record of a marked period
    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        records: Vec<StudentMark>,
    ) -> ServiceResult<AttendanceSession> {
        let txn = db.begin().await?;
        let session = Self::get(&txn, id).await?.attendance;
        Self::check_roster(&txn, session.class_id, &records).await?;

        attendance_records::Entity::delete_many()
            .filter(attendance_records::Column::AttendanceId.eq(id))
            .exec(&txn)
            .await?;
        let records = Self::insert_records(&txn, id, &records).await?;

        let mut active: attendance::ActiveModel = session.into();
        active.updated_at = Set(now());
        let session = active.update(&txn).await?;
        txn.commit().await?;

        info!("Updated attendance {id}");
        Ok(AttendanceSession {
            attendance: session,
            records,
        })
    }

    pub async fn for_class<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
        filter: AttendanceFilter,
    ) -> ServiceResult<Vec<AttendanceSession>> {
        let mut query = attendance::Entity::find().filter(attendance::Column::ClassId.eq(class_id));
        if let Some(subject_id) = filter.subject_id {
            query = query.filter(attendance::Column::SubjectId.eq(subject_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(attendance::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(attendance::Column::Date.lte(to));
        }

        let sessions = query
            .order_by_desc(attendance::Column::Date)
            .order_by_asc(attendance::Column::Period)
            .all(db)
            .await?;

        let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
        let mut records: BTreeMap<Uuid, Vec<attendance_records::Model>> = BTreeMap::new();
        for record in attendance_records::Entity::find()
            .filter(attendance_records::Column::AttendanceId.is_in(ids))
            .all(db)
            .await?
        {
            records.entry(record.attendance_id).or_default().push(record);
        }

        Ok(sessions
            .into_iter()
            .map(|attendance| AttendanceSession {
                records: records.remove(&attendance.id).unwrap_or_default(),
                attendance,
            })
            .collect())
    }

    /// Per-subject and overall attendance of one student
    pub async fn student_summary<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
    ) -> ServiceResult<StudentAttendance> {
        let rows = attendance_records::Entity::find()
            .filter(attendance_records::Column::StudentId.eq(student_id))
            .find_also_related(attendance::Entity)
            .all(db)
            .await?;

        let mut by_subject: BTreeMap<Uuid, Vec<AttendanceStatus>> = BTreeMap::new();
        for (record, session) in rows {
            if let Some(session) = session {
                by_subject
                    .entry(session.subject_id)
                    .or_default()
                    .push(record.status);
            }
        }

        let subjects = subjects::Entity::find()
            .filter(subjects::Column::Id.is_in(by_subject.keys().copied()))
            .order_by_asc(subjects::Column::Code)
            .all(db)
            .await?;

        let subjects: Vec<SubjectAttendance> = subjects
            .into_iter()
            .map(|subject| {
                let statuses = by_subject.remove(&subject.id).unwrap_or_default();
                SubjectAttendance {
                    subject,
                    summary: AttendanceSummary::from_statuses(statuses),
                }
            })
            .collect();
        let overall = subjects
            .iter()
            .fold(AttendanceSummary::default(), |acc, s| acc.merge(s.summary));

        Ok(StudentAttendance { subjects, overall })
    }

    async fn check_roster<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
        records: &[StudentMark],
    ) -> ServiceResult<()> {
        if records.is_empty() {
            return Err(ServiceError::validation("No attendance records given"));
        }

        let ids: BTreeSet<Uuid> = records.iter().map(|r| r.student_id).collect();
        if ids.len() != records.len() {
            return Err(ServiceError::validation("A student is listed more than once"));
        }

        let enrolled = users::Entity::find()
            .filter(users::Column::ClassId.eq(class_id))
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .count(db)
            .await?;
        if enrolled != ids.len() as u64 {
            return Err(ServiceError::validation(
                "Every student must belong to the class",
            ));
        }
        Ok(())
    }

    async fn insert_records<C: ConnectionTrait>(
        db: &C,
        attendance_id: Uuid,
        records: &[StudentMark],
    ) -> ServiceResult<Vec<attendance_records::Model>> {
        let mut saved = Vec::with_capacity(records.len());
        for mark in records {
            let record = attendance_records::ActiveModel {
                id: Set(Uuid::new_v4()),
                attendance_id: Set(attendance_id),
                student_id: Set(mark.student_id),
                status: Set(mark.status),
            }
            .insert(db)
            .await?;
            saved.push(record);
        }
        Ok(saved)
    }
}
