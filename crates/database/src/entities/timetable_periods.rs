use models::timetable::{PeriodType, Weekday};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timetable_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub timetable_id: Uuid,
    pub day: Weekday,
    pub period_number: i32,
    pub subject_id: Option<Uuid>,
    pub faculty_id: Option<Uuid>,
    pub start_time: String, // e.g. "09:00"
    pub end_time: String,
    pub room: Option<String>,
    pub period_type: PeriodType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::timetables::Entity",
        from = "Column::TimetableId",
        to = "super::timetables::Column::Id"
    )]
    Timetable,
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
}

impl Related<super::timetables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timetable.def()
    }
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
