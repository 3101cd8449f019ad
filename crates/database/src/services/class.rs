use crate::{
    entities::{class_subjects, classes, departments, subjects, users},
    error::{ServiceError, ServiceResult},
    services::{non_empty, now, subject::SubjectService},
};
use log::info;
use models::role::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewClass {
    pub name: String,
    pub section: String,
    pub department_id: Uuid,
    pub semester: i32,
    pub academic_year: String,
    pub capacity: i32,
    pub class_teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassChanges {
    pub name: Option<String>,
    pub section: Option<String>,
    pub semester: Option<i32>,
    pub academic_year: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub department_id: Option<Uuid>,
    pub semester: Option<i32>,
}

/// A subject taught in a class, with the faculty member teaching it
#[derive(Debug, Clone)]
pub struct ClassSubject {
    pub assignment: class_subjects::Model,
    pub subject: subjects::Model,
    pub faculty: Option<users::Model>,
}

pub struct ClassService;

impl ClassService {
    pub async fn create(db: &DatabaseConnection, new: NewClass) -> ServiceResult<classes::Model> {
        let name = new.name.trim().to_string();
        let section = new.section.trim().to_uppercase();
        if name.is_empty() || section.is_empty() {
            return Err(ServiceError::validation("Name and section are required"));
        }
        if new.semester < 1 {
            return Err(ServiceError::validation("Semester must be positive"));
        }
        if new.capacity < 1 {
            return Err(ServiceError::validation("Capacity must be positive"));
        }

        let txn = db.begin().await?;
        departments::Entity::find_by_id(new.department_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("Department"))?;
        Self::ensure_section_free(&txn, new.department_id, new.semester, &section, None).await?;

        let timestamp = now();
        let class = classes::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            section: Set(section),
            department_id: Set(new.department_id),
            semester: Set(new.semester),
            academic_year: Set(new.academic_year.trim().to_string()),
            class_teacher_id: Set(None),
            capacity: Set(new.capacity),
            current_strength: Set(0),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        let class = match new.class_teacher_id {
            Some(faculty_id) => Self::assign_teacher(&txn, class, Some(faculty_id)).await?,
            None => class,
        };
        txn.commit().await?;

        info!("Created class {} ({})", class.name, class.id);
        Ok(class)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<classes::Model> {
        classes::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Class"))
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        filter: ClassFilter,
    ) -> ServiceResult<Vec<classes::Model>> {
        let mut query = classes::Entity::find();
        if let Some(department_id) = filter.department_id {
            query = query.filter(classes::Column::DepartmentId.eq(department_id));
        }
        if let Some(semester) = filter.semester {
            query = query.filter(classes::Column::Semester.eq(semester));
        }

        Ok(query
            .order_by_asc(classes::Column::Semester)
            .order_by_asc(classes::Column::Section)
            .all(db)
            .await?)
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        changes: ClassChanges,
    ) -> ServiceResult<classes::Model> {
        let class = Self::get(db, id).await?;

        let section = non_empty(changes.section)
            .map(|s| s.to_uppercase())
            .unwrap_or_else(|| class.section.clone());
        let semester = changes.semester.unwrap_or(class.semester);
        if semester < 1 {
            return Err(ServiceError::validation("Semester must be positive"));
        }
        if section != class.section || semester != class.semester {
            Self::ensure_section_free(db, class.department_id, semester, &section, Some(id))
                .await?;
        }

        let mut active: classes::ActiveModel = class.clone().into();
        if let Some(capacity) = changes.capacity {
            if capacity < class.current_strength.max(1) {
                return Err(ServiceError::validation(format!(
                    "Capacity cannot be below the current strength of {}",
                    class.current_strength
                )));
            }
            active.capacity = Set(capacity);
        }
        if let Some(name) = non_empty(changes.name) {
            active.name = Set(name);
        }
        if let Some(year) = non_empty(changes.academic_year) {
            active.academic_year = Set(year);
        }
        active.section = Set(section);
        active.semester = Set(semester);
        active.updated_at = Set(now());

        let class = active.update(db).await?;
        info!("Updated class {}", class.id);
        Ok(class)
    }

    /// Unassigns every student before deleting and clears the teacher flag
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;
        let class = Self::get(&txn, id).await?;

        users::Entity::update_many()
            .col_expr(users::Column::ClassId, Expr::value(Option::<Uuid>::None))
            .filter(users::Column::ClassId.eq(id))
            .exec(&txn)
            .await?;

        classes::Entity::delete_by_id(id).exec(&txn).await?;
        if let Some(teacher_id) = class.class_teacher_id {
            Self::refresh_teacher_flag(&txn, teacher_id).await?;
        }
        txn.commit().await?;

        info!("Deleted class {id}");
        Ok(())
    }

    pub async fn roster<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
    ) -> ServiceResult<Vec<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::ClassId.eq(class_id))
            .order_by_asc(users::Column::RollNumber)
            .order_by_asc(users::Column::Name)
            .all(db)
            .await?)
    }

    /// Enrols students, moving them out of any previous class
    pub async fn add_students(
        db: &DatabaseConnection,
        class_id: Uuid,
        student_ids: Vec<Uuid>,
    ) -> ServiceResult<classes::Model> {
        let txn = db.begin().await?;
        let class = Self::enroll(&txn, class_id, student_ids).await?;
        txn.commit().await?;
        Ok(class)
    }

    /// [`ClassService::add_students`] inside the caller's transaction
    pub async fn enroll<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
        student_ids: Vec<Uuid>,
    ) -> ServiceResult<classes::Model> {
        let ids: BTreeSet<Uuid> = student_ids.into_iter().collect();
        if ids.is_empty() {
            return Err(ServiceError::validation("No students given"));
        }

        let class = Self::get(db, class_id).await?;

        let students = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(db)
            .await?;
        if students.len() != ids.len() {
            return Err(ServiceError::NotFound("Student"));
        }

        for student in &students {
            if student.role != Role::Student {
                return Err(ServiceError::validation(format!(
                    "{} is not a student",
                    student.name
                )));
            }
            if student.department_id != Some(class.department_id) {
                return Err(ServiceError::validation(format!(
                    "{} belongs to another department",
                    student.name
                )));
            }
        }

        let newcomers: Vec<&users::Model> = students
            .iter()
            .filter(|s| s.class_id != Some(class_id))
            .collect();
        let incoming = i32::try_from(newcomers.len()).unwrap_or(i32::MAX);
        if class.current_strength.saturating_add(incoming) > class.capacity {
            return Err(ServiceError::validation(format!(
                "Class capacity of {} would be exceeded",
                class.capacity
            )));
        }

        let previous: BTreeSet<Uuid> = newcomers.iter().filter_map(|s| s.class_id).collect();
        let newcomer_ids: Vec<Uuid> = newcomers.iter().map(|s| s.id).collect();

        if !newcomer_ids.is_empty() {
            users::Entity::update_many()
                .col_expr(users::Column::ClassId, Expr::value(Some(class_id)))
                .col_expr(users::Column::Semester, Expr::value(Some(class.semester)))
                .col_expr(users::Column::UpdatedAt, Expr::value(now()))
                .filter(users::Column::Id.is_in(newcomer_ids.clone()))
                .exec(db)
                .await?;
        }

        for old_class in previous {
            Self::sync_strength(db, old_class).await?;
        }
        let class = Self::sync_strength(db, class_id).await?;

        info!(
            "Enrolled {} students in class {class_id}",
            newcomer_ids.len()
        );
        Ok(class)
    }

    pub async fn remove_student(
        db: &DatabaseConnection,
        class_id: Uuid,
        student_id: Uuid,
    ) -> ServiceResult<classes::Model> {
        let txn = db.begin().await?;
        Self::get(&txn, class_id).await?;

        let student = users::Entity::find_by_id(student_id)
            .filter(users::Column::ClassId.eq(class_id))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("Student in class"))?;

        let mut active: users::ActiveModel = student.into();
        active.class_id = Set(None);
        active.updated_at = Set(now());
        active.update(&txn).await?;

        let class = Self::sync_strength(&txn, class_id).await?;
        txn.commit().await?;

        info!("Removed student {student_id} from class {class_id}");
        Ok(class)
    }

    pub async fn set_class_teacher(
        db: &DatabaseConnection,
        class_id: Uuid,
        faculty_id: Option<Uuid>,
    ) -> ServiceResult<classes::Model> {
        let txn = db.begin().await?;
        let class = Self::get(&txn, class_id).await?;
        let class = Self::assign_teacher(&txn, class, faculty_id).await?;
        txn.commit().await?;

        info!("Class {class_id} teacher set to {faculty_id:?}");
        Ok(class)
    }

    /// Assigns a subject to a class, registering the faculty with the subject
    pub async fn assign_subject(
        db: &DatabaseConnection,
        class_id: Uuid,
        subject_id: Uuid,
        faculty_id: Option<Uuid>,
    ) -> ServiceResult<class_subjects::Model> {
        let txn = db.begin().await?;
        let class = Self::get(&txn, class_id).await?;
        let subject = SubjectService::get(&txn, subject_id).await?;
        if subject.department_id != class.department_id {
            return Err(ServiceError::validation(
                "Subject belongs to another department",
            ));
        }

        if let Some(faculty_id) = faculty_id {
            Self::faculty_of_department(&txn, faculty_id, class.department_id).await?;
            SubjectService::ensure_faculty(&txn, subject_id, faculty_id).await?;
        }

        let existing = class_subjects::Entity::find()
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .filter(class_subjects::Column::SubjectId.eq(subject_id))
            .one(&txn)
            .await?;

        let assignment = match existing {
            Some(existing) => {
                let mut active: class_subjects::ActiveModel = existing.into();
                active.faculty_id = Set(faculty_id);
                active.update(&txn).await?
            }
            None => {
                class_subjects::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    class_id: Set(class_id),
                    subject_id: Set(subject_id),
                    faculty_id: Set(faculty_id),
                }
                .insert(&txn)
                .await?
            }
        };
        txn.commit().await?;

        info!("Assigned subject {subject_id} to class {class_id}");
        Ok(assignment)
    }

    pub async fn unassign_subject(
        db: &DatabaseConnection,
        class_id: Uuid,
        subject_id: Uuid,
    ) -> ServiceResult<()> {
        let result = class_subjects::Entity::delete_many()
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .filter(class_subjects::Column::SubjectId.eq(subject_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Subject assignment"));
        }

        info!("Removed subject {subject_id} from class {class_id}");
        Ok(())
    }

    pub async fn subjects<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
    ) -> ServiceResult<Vec<ClassSubject>> {
        let rows = class_subjects::Entity::find()
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .find_also_related(subjects::Entity)
            .all(db)
            .await?;

        let faculty_ids: Vec<Uuid> = rows.iter().filter_map(|(a, _)| a.faculty_id).collect();
        let faculty = if faculty_ids.is_empty() {
            vec![]
        } else {
            users::Entity::find()
                .filter(users::Column::Id.is_in(faculty_ids))
                .all(db)
                .await?
        };

        let mut subjects: Vec<ClassSubject> = rows
            .into_iter()
            .filter_map(|(assignment, subject)| {
                let subject = subject?;
                let faculty = assignment
                    .faculty_id
                    .and_then(|id| faculty.iter().find(|f| f.id == id).cloned());
                Some(ClassSubject {
                    assignment,
                    subject,
                    faculty,
                })
            })
            .collect();
        subjects.sort_by(|a, b| a.subject.code.cmp(&b.subject.code));
        Ok(subjects)
    }

    /// Whether the faculty teaches the subject in the class
    pub async fn teaches<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
        subject_id: Uuid,
        faculty_id: Uuid,
    ) -> ServiceResult<bool> {
        let count = class_subjects::Entity::find()
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .filter(class_subjects::Column::SubjectId.eq(subject_id))
            .filter(class_subjects::Column::FacultyId.eq(faculty_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Classes a faculty member leads or teaches in
    pub async fn for_faculty<C: ConnectionTrait>(
        db: &C,
        faculty_id: Uuid,
    ) -> ServiceResult<Vec<classes::Model>> {
        let taught: Vec<Uuid> = class_subjects::Entity::find()
            .filter(class_subjects::Column::FacultyId.eq(faculty_id))
            .all(db)
            .await?
            .into_iter()
            .map(|a| a.class_id)
            .collect();

        Ok(classes::Entity::find()
            .filter(
                Condition::any()
                    .add(classes::Column::ClassTeacherId.eq(faculty_id))
                    .add(classes::Column::Id.is_in(taught)),
            )
            .order_by_asc(classes::Column::Name)
            .all(db)
            .await?)
    }

    /// Recounts the roster so the stored strength matches it exactly
    pub(crate) async fn sync_strength<C: ConnectionTrait>(
        db: &C,
        class_id: Uuid,
    ) -> ServiceResult<classes::Model> {
        let class = Self::get(db, class_id).await?;
        let strength = users::Entity::find()
            .filter(users::Column::ClassId.eq(class_id))
            .count(db)
            .await?;

        let mut active: classes::ActiveModel = class.into();
        active.current_strength = Set(i32::try_from(strength).unwrap_or(i32::MAX));
        active.updated_at = Set(now());
        Ok(active.update(db).await?)
    }

    /// Sets `is_class_teacher` from whether any class still points at the user
    pub(crate) async fn refresh_teacher_flag<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> ServiceResult<()> {
        let Some(user) = users::Entity::find_by_id(user_id).one(db).await? else {
            return Ok(());
        };
        let leads = classes::Entity::find()
            .filter(classes::Column::ClassTeacherId.eq(user_id))
            .count(db)
            .await?
            > 0;

        if user.is_class_teacher != leads {
            let mut active: users::ActiveModel = user.into();
            active.is_class_teacher = Set(leads);
            active.update(db).await?;
        }
        Ok(())
    }

    async fn assign_teacher<C: ConnectionTrait>(
        db: &C,
        class: classes::Model,
        faculty_id: Option<Uuid>,
    ) -> ServiceResult<classes::Model> {
        if let Some(faculty_id) = faculty_id {
            Self::faculty_of_department(db, faculty_id, class.department_id).await?;
        }

        let previous = class.class_teacher_id;
        let mut active: classes::ActiveModel = class.into();
        active.class_teacher_id = Set(faculty_id);
        active.updated_at = Set(now());
        let class = active.update(db).await?;

        for user_id in previous.into_iter().chain(faculty_id) {
            Self::refresh_teacher_flag(db, user_id).await?;
        }
        Ok(class)
    }

    pub(crate) async fn faculty_of_department<C: ConnectionTrait>(
        db: &C,
        faculty_id: Uuid,
        department_id: Uuid,
    ) -> ServiceResult<users::Model> {
        let faculty = users::Entity::find_by_id(faculty_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Faculty"))?;
        if faculty.role != Role::Faculty {
            return Err(ServiceError::validation(format!(
                "{} is not a faculty member",
                faculty.name
            )));
        }
        if faculty.department_id != Some(department_id) {
            return Err(ServiceError::validation(format!(
                "{} belongs to another department",
                faculty.name
            )));
        }
        Ok(faculty)
    }

    async fn ensure_section_free<C: ConnectionTrait>(
        db: &C,
        department_id: Uuid,
        semester: i32,
        section: &str,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut query = classes::Entity::find()
            .filter(classes::Column::DepartmentId.eq(department_id))
            .filter(classes::Column::Semester.eq(semester))
            .filter(classes::Column::Section.eq(section));
        if let Some(id) = except {
            query = query.filter(classes::Column::Id.ne(id));
        }
        if query.count(db).await? > 0 {
            return Err(ServiceError::conflict(format!(
                "Section {section} already exists for semester {semester}"
            )));
        }
        Ok(())
    }
}
