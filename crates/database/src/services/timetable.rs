use crate::{
    entities::{class_subjects, classes, timetable_periods, timetables},
    error::{ServiceError, ServiceResult},
    services::{class::ClassService, now, subject::SubjectService},
};
use log::info;
use models::timetable::{self, PeriodType, SlotTemplate, SubjectLoad, Weekday};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

/// Overrides for the weekly template, defaults fill whatever is missing
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub days: Option<Vec<Weekday>>,
    pub slots: Option<Vec<SlotTemplate>>,
    pub rooms: Option<Vec<String>>,
}

/// Changes to a single period. `None` keeps the stored value, `Some(None)`
/// clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct PeriodEdit {
    pub subject_id: Option<Option<Uuid>>,
    pub faculty_id: Option<Option<Uuid>>,
    pub room: Option<Option<String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub period_type: Option<PeriodType>,
}

#[derive(Debug, Clone)]
pub struct ClassTimetable {
    pub timetable: timetables::Model,
    /// Ordered by day, then period number
    pub periods: Vec<timetable_periods::Model>,
}

#[derive(Debug, Clone)]
pub struct FacultyPeriod {
    pub period: timetable_periods::Model,
    pub class: classes::Model,
}

pub struct TimetableService;

impl TimetableService {
    /// Builds a fresh week for the class and replaces any previous timetable
    pub async fn generate<R: Rng + ?Sized>(
        db: &DatabaseConnection,
        class_id: Uuid,
        options: GenerateOptions,
        generated_by: Option<Uuid>,
        rng: &mut R,
    ) -> ServiceResult<ClassTimetable> {
        let txn = db.begin().await?;
        let class = ClassService::get(&txn, class_id).await?;

        let loads: Vec<SubjectLoad<Uuid>> = ClassService::subjects(&txn, class_id)
            .await?
            .into_iter()
            .map(|s| SubjectLoad {
                subject: s.subject.id,
                faculty: s.assignment.faculty_id,
                periods_per_week: u32::try_from(s.subject.credits.max(1)).unwrap_or(1),
            })
            .collect();
        if loads.is_empty() {
            return Err(ServiceError::validation(
                "Assign subjects to the class before generating a timetable",
            ));
        }

        let days = options.days.unwrap_or_else(Weekday::working_week);
        let slots = options.slots.unwrap_or_else(timetable::default_slots);
        let rooms = options.rooms.unwrap_or_else(timetable::default_rooms);
        let generated = timetable::generate(&loads, &days, &slots, &rooms, rng)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        timetables::Entity::delete_many()
            .filter(timetables::Column::ClassId.eq(class_id))
            .exec(&txn)
            .await?;

        let timestamp = now();
        let timetable = timetables::ActiveModel {
            id: Set(Uuid::new_v4()),
            class_id: Set(class_id),
            academic_year: Set(class.academic_year.clone()),
            semester: Set(class.semester),
            generated_by: Set(generated_by),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        let rows: Vec<timetable_periods::ActiveModel> = generated
            .into_iter()
            .map(|p| timetable_periods::ActiveModel {
                id: Set(Uuid::new_v4()),
                timetable_id: Set(timetable.id),
                day: Set(p.day),
                period_number: Set(i32::try_from(p.period_number).unwrap_or(i32::MAX)),
                subject_id: Set(p.subject),
                faculty_id: Set(p.faculty),
                start_time: Set(p.start_time),
                end_time: Set(p.end_time),
                room: Set(p.room),
                period_type: Set(p.period_type),
            })
            .collect();
        let count = rows.len();
        timetable_periods::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;

        let periods = Self::periods(&txn, timetable.id).await?;
        txn.commit().await?;

        info!(
            "Generated timetable {} for class {class_id} with {count} periods",
            timetable.id
        );
        Ok(ClassTimetable { timetable, periods })
    }

    pub async fn for_class<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
    ) -> ServiceResult<ClassTimetable> {
        let timetable = timetables::Entity::find()
            .filter(timetables::Column::ClassId.eq(class_id))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Timetable"))?;
        let periods = Self::periods(db, timetable.id).await?;

        Ok(ClassTimetable { timetable, periods })
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<timetables::Model> {
        timetables::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Timetable"))
    }

    /// Every period the faculty teaches, across all class timetables
    pub async fn for_faculty<C: ConnectionTrait>(
        db: &C,
        faculty_id: Uuid,
    ) -> ServiceResult<Vec<FacultyPeriod>> {
        let periods = timetable_periods::Entity::find()
            .filter(timetable_periods::Column::FacultyId.eq(faculty_id))
            .find_also_related(timetables::Entity)
            .all(db)
            .await?;

        let class_ids: Vec<Uuid> = periods
            .iter()
            .filter_map(|(_, t)| t.as_ref().map(|t| t.class_id))
            .collect();
        let classes = classes::Entity::find()
            .filter(classes::Column::Id.is_in(class_ids))
            .all(db)
            .await?;

        let mut schedule: Vec<FacultyPeriod> = periods
            .into_iter()
            .filter_map(|(period, timetable)| {
                let class_id = timetable?.class_id;
                let class = classes.iter().find(|c| c.id == class_id)?.clone();
                Some(FacultyPeriod { period, class })
            })
            .collect();
        schedule.sort_by_key(|p| (p.period.day, p.period.period_number));
        Ok(schedule)
    }

    pub async fn update_period(
        db: &DatabaseConnection,
        timetable_id: Uuid,
        period_id: Uuid,
        edit: PeriodEdit,
    ) -> ServiceResult<timetable_periods::Model> {
        let txn = db.begin().await?;
        let period = timetable_periods::Entity::find_by_id(period_id)
            .filter(timetable_periods::Column::TimetableId.eq(timetable_id))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("Period"))?;
        let timetable = Self::get(&txn, timetable_id).await?;
        let class = ClassService::get(&txn, timetable.class_id).await?;

        let slot = SlotTemplate {
            start_time: edit.start_time.unwrap_or_else(|| period.start_time.clone()),
            end_time: edit.end_time.unwrap_or_else(|| period.end_time.clone()),
            period_type: edit.period_type.unwrap_or(period.period_type),
        };
        slot.validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        if let Some(Some(subject_id)) = edit.subject_id {
            let subject = SubjectService::get(&txn, subject_id).await?;
            if subject.department_id != class.department_id {
                return Err(ServiceError::validation(
                    "Subject belongs to another department",
                ));
            }
            let assigned = class_subjects::Entity::find()
                .filter(class_subjects::Column::ClassId.eq(class.id))
                .filter(class_subjects::Column::SubjectId.eq(subject_id))
                .one(&txn)
                .await?;
            if assigned.is_none() {
                return Err(ServiceError::validation(format!(
                    "{} is not assigned to {}",
                    subject.name, class.name
                )));
            }
        }
        if let Some(Some(faculty_id)) = edit.faculty_id {
            ClassService::faculty_of_department(&txn, faculty_id, class.department_id).await?;
        }

        let teaching = slot.period_type.is_teaching();
        let subject_id = edit.subject_id.unwrap_or(period.subject_id);
        let faculty_id = edit.faculty_id.unwrap_or(period.faculty_id);
        let room = edit
            .room
            .unwrap_or_else(|| period.room.clone())
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let mut active: timetable_periods::ActiveModel = period.into();
        active.start_time = Set(slot.start_time);
        active.end_time = Set(slot.end_time);
        active.period_type = Set(slot.period_type);
        active.subject_id = Set(subject_id.filter(|_| teaching));
        active.faculty_id = Set(faculty_id.filter(|_| teaching));
        active.room = Set(room.filter(|_| teaching));

        let period = active.update(&txn).await?;
        Self::touch(&txn, timetable_id).await?;
        txn.commit().await?;

        info!("Updated period {period_id} of timetable {timetable_id}");
        Ok(period)
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let result = timetables::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Timetable"));
        }

        info!("Deleted timetable {id}");
        Ok(())
    }

    async fn periods<C: ConnectionTrait>(
        db: &C,
        timetable_id: Uuid,
    ) -> ServiceResult<Vec<timetable_periods::Model>> {
        let mut periods = timetable_periods::Entity::find()
            .filter(timetable_periods::Column::TimetableId.eq(timetable_id))
            .all(db)
            .await?;
        periods.sort_by_key(|p| (p.day, p.period_number));
        Ok(periods)
    }

    async fn touch<C: ConnectionTrait>(db: &C, timetable_id: Uuid) -> ServiceResult<()> {
        let timetable = Self::get(db, timetable_id).await?;
        let mut active: timetables::ActiveModel = timetable.into();
        active.updated_at = Set(now());
        active.update(db).await?;
        Ok(())
    }
}
