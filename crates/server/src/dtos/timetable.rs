use super::class::ClassResponse;
use chrono::NaiveDateTime;
use database::{
    entities::timetable_periods,
    services::timetable::{ClassTimetable, FacultyPeriod, GenerateOptions, PeriodEdit},
};
use models::timetable::{PeriodType, SlotTemplate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateTimetableRequest {
    /// Defaults to Monday to Friday
    #[schema(value_type = Option<Vec<String>>, example = json!(["monday", "tuesday"]))]
    pub days: Option<Vec<Weekday>>,
    /// Daily template, defaults to seven periods with a break and lunch
    #[schema(value_type = Option<Vec<Object>>)]
    pub slots: Option<Vec<SlotTemplate>>,
    pub rooms: Option<Vec<String>>,
}

impl From<GenerateTimetableRequest> for GenerateOptions {
    fn from(r: GenerateTimetableRequest) -> Self {
        Self {
            days: r.days,
            slots: r.slots,
            rooms: r.rooms,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodResponse {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub day: Weekday,
    pub period_number: i32,
    pub subject_id: Option<Uuid>,
    pub faculty_id: Option<Uuid>,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
    #[schema(value_type = String)]
    pub period_type: PeriodType,
}

impl From<timetable_periods::Model> for PeriodResponse {
    fn from(p: timetable_periods::Model) -> Self {
        Self {
            id: p.id,
            day: p.day,
            period_number: p.period_number,
            subject_id: p.subject_id,
            faculty_id: p.faculty_id,
            start_time: p.start_time,
            end_time: p.end_time,
            room: p.room,
            period_type: p.period_type,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayScheduleResponse {
    #[schema(value_type = String)]
    pub day: Weekday,
    pub periods: Vec<PeriodResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    pub id: Uuid,
    pub class_id: Uuid,
    pub academic_year: String,
    pub semester: i32,
    pub generated_by: Option<Uuid>,
    pub updated_at: NaiveDateTime,
    pub week: Vec<DayScheduleResponse>,
}

impl From<ClassTimetable> for TimetableResponse {
    fn from(t: ClassTimetable) -> Self {
        // periods arrive sorted by day, then period number
        let mut week: Vec<DayScheduleResponse> = Vec::new();
        for period in t.periods {
            match week.last_mut() {
                Some(day) if day.day == period.day => day.periods.push(period.into()),
                _ => week.push(DayScheduleResponse {
                    day: period.day,
                    periods: vec![period.into()],
                }),
            }
        }

        Self {
            id: t.timetable.id,
            class_id: t.timetable.class_id,
            academic_year: t.timetable.academic_year,
            semester: t.timetable.semester,
            generated_by: t.timetable.generated_by,
            updated_at: t.timetable.updated_at,
            week,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacultyPeriodResponse {
    pub period: PeriodResponse,
    pub class: ClassResponse,
}

impl From<FacultyPeriod> for FacultyPeriodResponse {
    fn from(fp: FacultyPeriod) -> Self {
        Self {
            period: fp.period.into(),
            class: fp.class.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePeriodRequest {
    /// Omit to keep the current subject, `null` to clear it
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>)]
    pub subject_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>)]
    pub faculty_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>)]
    pub room: Option<Option<String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[schema(value_type = Option<String>)]
    pub period_type: Option<PeriodType>,
}

impl From<UpdatePeriodRequest> for PeriodEdit {
    fn from(r: UpdatePeriodRequest) -> Self {
        Self {
            subject_id: r.subject_id,
            faculty_id: r.faculty_id,
            room: r.room,
            start_time: r.start_time,
            end_time: r.end_time,
            period_type: r.period_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_period_fields_are_kept() {
        let request: UpdatePeriodRequest = serde_json::from_str(r#"{"room":"Lab 9"}"#).unwrap();
        let edit = PeriodEdit::from(request);
        assert_eq!(edit.room, Some(Some("Lab 9".to_string())));
        assert_eq!(edit.subject_id, None);
        assert_eq!(edit.faculty_id, None);
    }

    #[test]
    fn test_null_period_fields_are_cleared() {
        let request: UpdatePeriodRequest =
            serde_json::from_str(r#"{"subjectId":null,"facultyId":null}"#).unwrap();
        assert_eq!(request.subject_id, Some(None));
        assert_eq!(request.faculty_id, Some(None));
        assert_eq!(request.room, None);
    }
}
