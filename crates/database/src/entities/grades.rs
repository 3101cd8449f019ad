use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Marks and the derived grade of a student in one subject
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub class_id: Option<Uuid>,
    pub semester: i32,
    pub academic_year: String, // e.g. "2024-2025"
    pub mid1: Option<f64>,
    pub mid2: Option<f64>,
    pub external: Option<f64>,
    pub internal_marks: f64,
    pub total_marks: f64,
    pub grade: String,
    pub grade_points: f64,
    pub credits: i32,
    pub is_released: bool,
    pub graded_by: Option<Uuid>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
