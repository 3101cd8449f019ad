use crate::{
    entities::{class_subjects, grades, semester_records, subjects, users},
    error::{ServiceError, ServiceResult},
    services::{class::ClassService, now},
};
use log::info;
use models::{
    gpa::{self, CreditPoints, SemesterResult},
    grading::MarkSheet,
    role::Role,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Marks for one student in one subject and term
#[derive(Debug, Clone)]
pub struct GradeInput {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    /// Defaults to the subject's semester
    pub semester: Option<i32>,
    pub academic_year: String,
    pub marks: MarkSheet,
}

#[derive(Debug, Clone)]
pub struct SubjectGrade {
    pub grade: grades::Model,
    pub subject: subjects::Model,
}

#[derive(Debug, Clone)]
pub struct StudentGrade {
    pub grade: grades::Model,
    pub student: users::Model,
}

#[derive(Debug, Clone)]
pub struct GradeSummary {
    pub semesters: Vec<semester_records::Model>,
    pub cgpa: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub students: usize,
    pub grades: u64,
}

pub struct GradeService;

impl GradeService {
    /// Inserts or updates marks, recomputing the derived grade fields
    pub async fn upsert(
        db: &DatabaseConnection,
        input: GradeInput,
        graded_by: Option<Uuid>,
    ) -> ServiceResult<grades::Model> {
        let txn = db.begin().await?;
        let grade = Self::upsert_in(&txn, input, graded_by).await?;
        txn.commit().await?;
        Ok(grade)
    }

    /// All-or-nothing version of [`GradeService::upsert`]
    pub async fn bulk_upsert(
        db: &DatabaseConnection,
        inputs: Vec<GradeInput>,
        graded_by: Option<Uuid>,
    ) -> ServiceResult<Vec<grades::Model>> {
        if inputs.is_empty() {
            return Err(ServiceError::validation("No grades given"));
        }

        let txn = db.begin().await?;
        let mut saved = Vec::with_capacity(inputs.len());
        for input in inputs {
            saved.push(Self::upsert_in(&txn, input, graded_by).await?);
        }
        txn.commit().await?;

        info!("Saved {} grades in bulk", saved.len());
        Ok(saved)
    }

    pub async fn for_student<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        semester: Option<i32>,
        released_only: bool,
    ) -> ServiceResult<Vec<SubjectGrade>> {
        let mut query = grades::Entity::find().filter(grades::Column::StudentId.eq(student_id));
        if let Some(semester) = semester {
            query = query.filter(grades::Column::Semester.eq(semester));
        }
        if released_only {
            query = query.filter(grades::Column::IsReleased.eq(true));
        }

        Ok(query
            .order_by_asc(grades::Column::Semester)
            .find_also_related(subjects::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(grade, subject)| Some(SubjectGrade {
                subject: subject?,
                grade,
            }))
            .collect())
    }

    pub async fn for_class_subject<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
        subject_id: Uuid,
    ) -> ServiceResult<Vec<StudentGrade>> {
        let mut rows: Vec<StudentGrade> = grades::Entity::find()
            .filter(grades::Column::ClassId.eq(class_id))
            .filter(grades::Column::SubjectId.eq(subject_id))
            .find_also_related(users::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(grade, student)| Some(StudentGrade {
                student: student?,
                grade,
            }))
            .collect();
        rows.sort_by(|a, b| a.student.roll_number.cmp(&b.student.roll_number));
        Ok(rows)
    }

    /// Releases a class's grades for a semester and recomputes every student's GPA
    pub async fn release(
        db: &DatabaseConnection,
        class_id: Uuid,
        semester: i32,
    ) -> ServiceResult<ReleaseOutcome> {
        let txn = db.begin().await?;
        ClassService::get(&txn, class_id).await?;
        let roster = ClassService::roster(&txn, class_id).await?;
        let student_ids: Vec<Uuid> = roster.iter().map(|s| s.id).collect();

        let released = grades::Entity::update_many()
            .col_expr(grades::Column::IsReleased, Expr::value(true))
            .col_expr(grades::Column::UpdatedAt, Expr::value(now()))
            .filter(grades::Column::StudentId.is_in(student_ids.clone()))
            .filter(grades::Column::Semester.eq(semester))
            .exec(&txn)
            .await?
            .rows_affected;

        for student_id in &student_ids {
            Self::recompute(&txn, *student_id, semester, Some(class_id)).await?;
        }
        txn.commit().await?;

        info!(
            "Released {released} grades of class {class_id} for semester {semester} ({} students)",
            student_ids.len()
        );
        Ok(ReleaseOutcome {
            students: student_ids.len(),
            grades: released,
        })
    }

    pub async fn summary<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        released_only: bool,
    ) -> ServiceResult<GradeSummary> {
        let student = users::Entity::find_by_id(student_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Student"))?;

        let mut query = semester_records::Entity::find()
            .filter(semester_records::Column::UserId.eq(student_id));
        if released_only {
            query = query.filter(semester_records::Column::IsReleased.eq(true));
        }
        let semesters = query
            .order_by_asc(semester_records::Column::Semester)
            .all(db)
            .await?;

        Ok(GradeSummary {
            semesters,
            cgpa: student.cgpa,
        })
    }

    async fn upsert_in<C: ConnectionTrait>(
        db: &C,
        input: GradeInput,
        graded_by: Option<Uuid>,
    ) -> ServiceResult<grades::Model> {
        input
            .marks
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        let academic_year = input.academic_year.trim().to_string();
        if academic_year.is_empty() {
            return Err(ServiceError::validation("Academic year is required"));
        }

        let student = users::Entity::find_by_id(input.student_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Student"))?;
        if student.role != Role::Student {
            return Err(ServiceError::validation(format!(
                "{} is not a student",
                student.name
            )));
        }
        let subject = subjects::Entity::find_by_id(input.subject_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Subject"))?;
        let semester = input.semester.unwrap_or(subject.semester);

        let evaluation = input.marks.evaluate();
        let existing = grades::Entity::find()
            .filter(grades::Column::StudentId.eq(student.id))
            .filter(grades::Column::SubjectId.eq(subject.id))
            .filter(grades::Column::Semester.eq(semester))
            .filter(grades::Column::AcademicYear.eq(academic_year.as_str()))
            .one(db)
            .await?;

        let timestamp = now();
        let mut active = match &existing {
            Some(existing) => grades::ActiveModel::from(existing.clone()),
            None => grades::ActiveModel {
                id: Set(Uuid::new_v4()),
                student_id: Set(student.id),
                subject_id: Set(subject.id),
                semester: Set(semester),
                academic_year: Set(academic_year),
                is_released: Set(false),
                created_at: Set(timestamp),
                ..Default::default()
            },
        };
        active.class_id = Set(student.class_id);
        active.mid1 = Set(input.marks.mid1);
        active.mid2 = Set(input.marks.mid2);
        active.external = Set(input.marks.external);
        active.internal_marks = Set(evaluation.internal);
        active.total_marks = Set(evaluation.total);
        active.grade = Set(evaluation.grade.to_string());
        active.grade_points = Set(evaluation.grade_points);
        active.credits = Set(subject.credits);
        active.graded_by = Set(graded_by);
        active.updated_at = Set(timestamp);

        let grade = match existing {
            Some(_) => active.update(db).await?,
            None => active.insert(db).await?,
        };

        // Regrading a released result moves the published GPA with it
        if grade.is_released {
            Self::recompute(db, grade.student_id, grade.semester, student.class_id).await?;
        }

        info!(
            "Graded student {} in subject {}: {} ({})",
            grade.student_id, grade.subject_id, grade.grade, grade.total_marks
        );
        Ok(grade)
    }

    /// Rebuilds the semester record from released grades, then the CGPA
    async fn recompute<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        semester: i32,
        class_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        let released = grades::Entity::find()
            .filter(grades::Column::StudentId.eq(student_id))
            .filter(grades::Column::Semester.eq(semester))
            .filter(grades::Column::IsReleased.eq(true))
            .all(db)
            .await?;

        let credit_points: Vec<CreditPoints> = released
            .iter()
            .map(|g| CreditPoints::new(u32::try_from(g.credits).unwrap_or(0), g.grade_points))
            .collect();
        let graded: BTreeSet<Uuid> = released.iter().map(|g| g.subject_id).collect();
        let is_completed = match class_id {
            Some(class_id) => {
                let required = Self::required_subjects(db, class_id, semester).await?;
                if required.is_empty() {
                    !graded.is_empty()
                } else {
                    required.is_subset(&graded)
                }
            }
            None => !graded.is_empty(),
        };

        let result = SemesterResult::from_subjects(
            u32::try_from(semester).unwrap_or(0),
            &credit_points,
            is_completed,
        );
        let total_credits = i32::try_from(result.total_credits).unwrap_or(i32::MAX);

        let existing = semester_records::Entity::find()
            .filter(semester_records::Column::UserId.eq(student_id))
            .filter(semester_records::Column::Semester.eq(semester))
            .one(db)
            .await?;
        match existing {
            Some(record) => {
                let mut active: semester_records::ActiveModel = record.into();
                active.sgpa = Set(result.sgpa);
                active.total_credits = Set(total_credits);
                active.is_completed = Set(is_completed);
                active.is_released = Set(true);
                active.updated_at = Set(now());
                active.update(db).await?;
            }
            None => {
                semester_records::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(student_id),
                    semester: Set(semester),
                    sgpa: Set(result.sgpa),
                    total_credits: Set(total_credits),
                    is_completed: Set(is_completed),
                    is_released: Set(true),
                    updated_at: Set(now()),
                }
                .insert(db)
                .await?;
            }
        }

        let results: Vec<SemesterResult> = semester_records::Entity::find()
            .filter(semester_records::Column::UserId.eq(student_id))
            .all(db)
            .await?
            .into_iter()
            .map(|r| SemesterResult {
                semester: u32::try_from(r.semester).unwrap_or(0),
                sgpa: r.sgpa,
                total_credits: u32::try_from(r.total_credits).unwrap_or(0),
                is_completed: r.is_completed,
            })
            .collect();

        if let Some(student) = users::Entity::find_by_id(student_id).one(db).await? {
            let mut active: users::ActiveModel = student.into();
            active.cgpa = Set(gpa::cgpa(&results));
            active.update(db).await?;
        }
        Ok(())
    }

    /// Subjects of the class that belong to the given semester
    async fn required_subjects<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
        semester: i32,
    ) -> ServiceResult<BTreeSet<Uuid>> {
        Ok(class_subjects::Entity::find()
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .find_also_related(subjects::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(_, subject)| subject)
            .filter(|s| s.semester == semester)
            .map(|s| s.id)
            .collect())
    }
}
