use crate::{
    entities::{class_subjects, classes, departments, subject_faculty, subjects, users},
    error::{ServiceError, ServiceResult},
    services::{non_empty, now},
};
use log::info;
use models::role::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub semester: i32,
    pub department_id: Uuid,
    pub description: Option<String>,
    pub faculty_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub credits: Option<i32>,
    pub semester: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectFilter {
    pub department_id: Option<Uuid>,
    pub semester: Option<i32>,
}

/// A subject with the faculty allowed to teach it and the classes it runs in
#[derive(Debug, Clone)]
pub struct SubjectDetail {
    pub subject: subjects::Model,
    pub faculty: Vec<users::Model>,
    pub classes: Vec<classes::Model>,
}

pub struct SubjectService;

impl SubjectService {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewSubject,
    ) -> ServiceResult<subjects::Model> {
        let name = new.name.trim().to_string();
        let code = new.code.trim().to_uppercase();
        if name.is_empty() || code.is_empty() {
            return Err(ServiceError::validation("Name and code are required"));
        }
        Self::validate_numbers(new.credits, new.semester)?;

        let txn = db.begin().await?;
        departments::Entity::find_by_id(new.department_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("Department"))?;
        Self::ensure_code_free(&txn, &code, None).await?;

        let timestamp = now();
        let subject = subjects::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            code: Set(code),
            credits: Set(new.credits),
            semester: Set(new.semester),
            department_id: Set(new.department_id),
            description: Set(non_empty(new.description)),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        for faculty_id in new.faculty_ids {
            Self::check_faculty(&txn, &subject, faculty_id).await?;
            Self::ensure_faculty(&txn, subject.id, faculty_id).await?;
        }
        txn.commit().await?;

        info!("Created subject {} ({})", subject.code, subject.id);
        Ok(subject)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<subjects::Model> {
        subjects::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Subject"))
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        filter: SubjectFilter,
    ) -> ServiceResult<Vec<subjects::Model>> {
        let mut query = subjects::Entity::find();
        if let Some(department_id) = filter.department_id {
            query = query.filter(subjects::Column::DepartmentId.eq(department_id));
        }
        if let Some(semester) = filter.semester {
            query = query.filter(subjects::Column::Semester.eq(semester));
        }

        Ok(query
            .order_by_asc(subjects::Column::Semester)
            .order_by_asc(subjects::Column::Code)
            .all(db)
            .await?)
    }

    pub async fn detail<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<SubjectDetail> {
        let subject = Self::get(db, id).await?;

        let faculty = subject_faculty::Entity::find()
            .filter(subject_faculty::Column::SubjectId.eq(id))
            .find_also_related(users::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(_, user)| user)
            .collect();

        let classes = class_subjects::Entity::find()
            .filter(class_subjects::Column::SubjectId.eq(id))
            .find_also_related(classes::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(_, class)| class)
            .collect();

        Ok(SubjectDetail {
            subject,
            faculty,
            classes,
        })
    }

    /// Subjects a faculty member is registered to teach
    pub async fn for_faculty<C: ConnectionTrait>(
        db: &C,
        faculty_id: Uuid,
    ) -> ServiceResult<Vec<subjects::Model>> {
        Ok(subject_faculty::Entity::find()
            .filter(subject_faculty::Column::FacultyId.eq(faculty_id))
            .find_also_related(subjects::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(_, subject)| subject)
            .collect())
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        changes: SubjectChanges,
    ) -> ServiceResult<subjects::Model> {
        let subject = Self::get(db, id).await?;
        let credits = changes.credits.unwrap_or(subject.credits);
        let semester = changes.semester.unwrap_or(subject.semester);
        Self::validate_numbers(credits, semester)?;

        let mut active: subjects::ActiveModel = subject.clone().into();
        if let Some(code) = non_empty(changes.code).map(|c| c.to_uppercase())
            && code != subject.code
        {
            Self::ensure_code_free(db, &code, Some(id)).await?;
            active.code = Set(code);
        }
        if let Some(name) = non_empty(changes.name) {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(non_empty(Some(description)));
        }
        active.credits = Set(credits);
        active.semester = Set(semester);
        active.updated_at = Set(now());

        let subject = active.update(db).await?;
        info!("Updated subject {}", subject.id);
        Ok(subject)
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let result = subjects::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Subject"));
        }

        info!("Deleted subject {id}");
        Ok(())
    }

    pub async fn add_faculty(
        db: &DatabaseConnection,
        subject_id: Uuid,
        faculty_id: Uuid,
    ) -> ServiceResult<SubjectDetail> {
        let subject = Self::get(db, subject_id).await?;
        Self::check_faculty(db, &subject, faculty_id).await?;
        Self::ensure_faculty(db, subject_id, faculty_id).await?;

        info!("Faculty {faculty_id} can now teach subject {subject_id}");
        Self::detail(db, subject_id).await
    }

    /// Drops the faculty from the subject and from the classes where they taught it
    pub async fn remove_faculty(
        db: &DatabaseConnection,
        subject_id: Uuid,
        faculty_id: Uuid,
    ) -> ServiceResult<()> {
        let txn = db.begin().await?;
        let result = subject_faculty::Entity::delete_many()
            .filter(subject_faculty::Column::SubjectId.eq(subject_id))
            .filter(subject_faculty::Column::FacultyId.eq(faculty_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Subject faculty"));
        }

        class_subjects::Entity::update_many()
            .col_expr(class_subjects::Column::FacultyId, Expr::value(Option::<Uuid>::None))
            .filter(class_subjects::Column::SubjectId.eq(subject_id))
            .filter(class_subjects::Column::FacultyId.eq(faculty_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!("Faculty {faculty_id} removed from subject {subject_id}");
        Ok(())
    }

    /// Inserts the subject/faculty pair unless it is already present
    pub(crate) async fn ensure_faculty<C: ConnectionTrait>(
        db: &C,
        subject_id: Uuid,
        faculty_id: Uuid,
    ) -> ServiceResult<()> {
        let exists = subject_faculty::Entity::find()
            .filter(subject_faculty::Column::SubjectId.eq(subject_id))
            .filter(subject_faculty::Column::FacultyId.eq(faculty_id))
            .count(db)
            .await?
            > 0;

        if !exists {
            subject_faculty::ActiveModel {
                id: Set(Uuid::new_v4()),
                subject_id: Set(subject_id),
                faculty_id: Set(faculty_id),
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    async fn check_faculty<C: ConnectionTrait>(
        db: &C,
        subject: &subjects::Model,
        faculty_id: Uuid,
    ) -> ServiceResult<()> {
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
        if faculty.department_id != Some(subject.department_id) {
            return Err(ServiceError::validation(format!(
                "{} belongs to another department",
                faculty.name
            )));
        }
        Ok(())
    }

    fn validate_numbers(credits: i32, semester: i32) -> ServiceResult<()> {
        if !(1..=10).contains(&credits) {
            return Err(ServiceError::validation("Credits must be between 1 and 10"));
        }
        if semester < 1 {
            return Err(ServiceError::validation("Semester must be positive"));
        }
        Ok(())
    }

    async fn ensure_code_free<C: ConnectionTrait>(
        db: &C,
        code: &str,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut query = subjects::Entity::find().filter(subjects::Column::Code.eq(code));
        if let Some(id) = except {
            query = query.filter(subjects::Column::Id.ne(id));
        }
        if query.count(db).await? > 0 {
            return Err(ServiceError::conflict(format!(
                "Subject with code {code} already exists"
            )));
        }
        Ok(())
    }
}
