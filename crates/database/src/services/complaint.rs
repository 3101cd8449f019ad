use crate::{
    entities::{
        attachment::{Attachment, Attachments},
        complaint_history, complaints, users,
    },
    error::{ServiceError, ServiceResult},
    services::{non_empty, now},
};
use log::info;
use models::{complaint::ComplaintStatus, priority::Priority, role::Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Priority,
    pub attachments: Vec<Attachment>,
}

/// Which complaints a caller may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintScope {
    All,
    Department(Uuid),
    /// Raised by or assigned to the user
    Involving(Uuid),
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ComplaintStatus,
    pub comment: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ComplaintDetail {
    pub complaint: complaints::Model,
    /// Oldest entry first
    pub history: Vec<complaint_history::Model>,
}

pub struct ComplaintService;

impl ComplaintService {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewComplaint,
        raised_by: &users::Model,
    ) -> ServiceResult<ComplaintDetail> {
        let title = new.title.trim().to_string();
        let description = new.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(ServiceError::validation(
                "Title and description are required",
            ));
        }

        let txn = db.begin().await?;
        let timestamp = now();
        let complaint = complaints::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            description: Set(description),
            category: Set(non_empty(new.category).unwrap_or_else(|| "other".into())),
            priority: Set(new.priority),
            status: Set(ComplaintStatus::Pending),
            raised_by: Set(raised_by.id),
            department_id: Set(raised_by.department_id),
            assigned_to: Set(None),
            resolution: Set(None),
            attachments: Set(Attachments(new.attachments)),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        Self::record(
            &txn,
            complaint.id,
            ComplaintStatus::Pending,
            Some("Complaint submitted".into()),
            raised_by.id,
        )
        .await?;
        txn.commit().await?;

        info!("Complaint {} raised by {}", complaint.id, raised_by.id);
        Self::get(db, complaint.id).await
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        scope: ComplaintScope,
        status: Option<ComplaintStatus>,
    ) -> ServiceResult<Vec<complaints::Model>> {
        let mut query = complaints::Entity::find();
        query = match scope {
            ComplaintScope::All => query,
            ComplaintScope::Department(id) => {
                query.filter(complaints::Column::DepartmentId.eq(id))
            }
            ComplaintScope::Involving(id) => query.filter(
                sea_orm::Condition::any()
                    .add(complaints::Column::RaisedBy.eq(id))
                    .add(complaints::Column::AssignedTo.eq(id)),
            ),
        };
        if let Some(status) = status {
            query = query.filter(complaints::Column::Status.eq(status));
        }

        Ok(query
            .order_by_desc(complaints::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<ComplaintDetail> {
        let complaint = complaints::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Complaint"))?;
        let history = complaint_history::Entity::find()
            .filter(complaint_history::Column::ComplaintId.eq(id))
            .order_by_asc(complaint_history::Column::ChangedAt)
            .all(db)
            .await?;

        Ok(ComplaintDetail { complaint, history })
    }

    /// Moves the ticket along its lifecycle, rejecting invalid transitions
    pub async fn update_status(
        db: &DatabaseConnection,
        id: Uuid,
        change: StatusChange,
        changed_by: Uuid,
    ) -> ServiceResult<ComplaintDetail> {
        let txn = db.begin().await?;
        let complaint = Self::get(&txn, id).await?.complaint;
        if !complaint.status.can_transition_to(change.status) {
            return Err(ServiceError::validation(format!(
                "Cannot move a {} complaint to {}",
                complaint.status.as_ref(),
                change.status.as_ref()
            )));
        }

        let mut active: complaints::ActiveModel = complaint.into();
        active.status = Set(change.status);
        if let Some(resolution) = non_empty(change.resolution) {
            active.resolution = Set(Some(resolution));
        } else if change.status == ComplaintStatus::Pending {
            active.resolution = Set(None);
        }
        active.updated_at = Set(now());
        active.update(&txn).await?;

        Self::record(&txn, id, change.status, non_empty(change.comment), changed_by).await?;
        txn.commit().await?;

        info!("Complaint {id} is now {}", change.status.as_ref());
        Self::get(db, id).await
    }

    pub async fn assign(
        db: &DatabaseConnection,
        id: Uuid,
        assignee_id: Uuid,
        changed_by: Uuid,
    ) -> ServiceResult<ComplaintDetail> {
        let txn = db.begin().await?;
        let complaint = Self::get(&txn, id).await?.complaint;
        if complaint.status.is_closed() {
            return Err(ServiceError::validation(
                "Reopen the complaint before assigning it",
            ));
        }

        let assignee = users::Entity::find_by_id(assignee_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("Assignee"))?;
        if assignee.role == Role::Student {
            return Err(ServiceError::validation(
                "Complaints cannot be assigned to students",
            ));
        }

        let status = complaint.status;
        let mut active: complaints::ActiveModel = complaint.into();
        active.assigned_to = Set(Some(assignee.id));
        active.updated_at = Set(now());
        active.update(&txn).await?;

        Self::record(
            &txn,
            id,
            status,
            Some(format!("Assigned to {}", assignee.name)),
            changed_by,
        )
        .await?;
        txn.commit().await?;

        info!("Complaint {id} assigned to {assignee_id}");
        Self::get(db, id).await
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<complaints::Model> {
        let complaint = Self::get(db, id).await?.complaint;
        complaints::Entity::delete_by_id(id).exec(db).await?;

        info!("Deleted complaint {id}");
        Ok(complaint)
    }

    async fn record<C: ConnectionTrait>(
        db: &C,
        complaint_id: Uuid,
        status: ComplaintStatus,
        comment: Option<String>,
        changed_by: Uuid,
    ) -> ServiceResult<()> {
        complaint_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            complaint_id: Set(complaint_id),
            status: Set(status),
            comment: Set(comment),
            changed_by: Set(changed_by),
            changed_at: Set(now()),
        }
        .insert(db)
        .await?;
        Ok(())
    }
}
