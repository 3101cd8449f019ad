use crate::{
    entities::{classes, departments, subjects, users},
    error::{ServiceError, ServiceResult},
    services::{non_empty, now},
};
use log::info;
use models::role::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
}

/// Head counts derived from the foreign keys pointing at a department
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCounts {
    pub admins: u64,
    pub faculty: u64,
    pub students: u64,
    pub classes: u64,
    pub subjects: u64,
}

pub struct DepartmentService;

impl DepartmentService {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewDepartment,
    ) -> ServiceResult<departments::Model> {
        let name = new.name.trim().to_string();
        let code = new.code.trim().to_uppercase();
        if name.is_empty() || code.is_empty() {
            return Err(ServiceError::validation("Name and code are required"));
        }
        Self::ensure_unique(db, &name, &code, None).await?;

        let timestamp = now();
        let department = departments::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            code: Set(code),
            description: Set(non_empty(new.description)),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db)
        .await?;

        info!("Created department {} ({})", department.code, department.id);
        Ok(department)
    }

    pub async fn list<C: ConnectionTrait>(db: &C) -> ServiceResult<Vec<departments::Model>> {
        Ok(departments::Entity::find()
            .order_by_asc(departments::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<departments::Model> {
        departments::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Department"))
    }

    pub async fn counts<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<DepartmentCounts> {
        let members = |role: Role| {
            users::Entity::find()
                .filter(users::Column::DepartmentId.eq(id))
                .filter(users::Column::Role.eq(role))
        };

        Ok(DepartmentCounts {
            admins: members(Role::DepartmentAdmin).count(db).await?,
            faculty: members(Role::Faculty).count(db).await?,
            students: members(Role::Student).count(db).await?,
            classes: classes::Entity::find()
                .filter(classes::Column::DepartmentId.eq(id))
                .count(db)
                .await?,
            subjects: subjects::Entity::find()
                .filter(subjects::Column::DepartmentId.eq(id))
                .count(db)
                .await?,
        })
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        changes: DepartmentChanges,
    ) -> ServiceResult<departments::Model> {
        let department = Self::get(db, id).await?;

        let name = non_empty(changes.name).unwrap_or_else(|| department.name.clone());
        let code = non_empty(changes.code)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| department.code.clone());
        Self::ensure_unique(db, &name, &code, Some(id)).await?;

        let mut active: departments::ActiveModel = department.into();
        active.name = Set(name);
        active.code = Set(code);
        if let Some(description) = changes.description {
            active.description = Set(non_empty(Some(description)));
        }
        active.updated_at = Set(now());

        let department = active.update(db).await?;
        info!("Updated department {}", department.id);
        Ok(department)
    }

    /// Refuses while classes or department admins still reference the department
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        Self::get(db, id).await?;
        let counts = Self::counts(db, id).await?;
        if counts.classes > 0 {
            return Err(ServiceError::validation(
                "Cannot delete a department that still has classes",
            ));
        }
        if counts.admins > 0 {
            return Err(ServiceError::validation(
                "Cannot delete a department that still has department admins",
            ));
        }

        departments::Entity::delete_by_id(id).exec(db).await?;
        info!("Deleted department {id}");
        Ok(())
    }

    async fn ensure_unique(
        db: &DatabaseConnection,
        name: &str,
        code: &str,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let existing = departments::Entity::find()
            .filter(
                sea_orm::Condition::any()
                    .add(departments::Column::Name.eq(name))
                    .add(departments::Column::Code.eq(code)),
            )
            .all(db)
            .await?;

        if existing.iter().any(|d| Some(d.id) != except) {
            return Err(ServiceError::conflict(
                "Department with this name or code already exists",
            ));
        }
        Ok(())
    }
}
