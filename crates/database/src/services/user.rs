use crate::{
    entities::{class_subjects, classes, departments, users},
    error::{ServiceError, ServiceResult},
    services::{class::ClassService, non_empty, now, page_bounds},
};
use chrono::NaiveDateTime;
use log::info;
use models::role::{Role, UserStatus};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

/// Fields needed to create an account, the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub semester: Option<i32>,
    pub roll_number: Option<String>,
    pub phone: Option<String>,
}

/// Partial profile update, `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub semester: Option<i32>,
    pub roll_number: Option<String>,
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

pub struct UserService;

impl UserService {
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser) -> ServiceResult<users::Model> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }

        let email = Self::normalize_email(&new.email);
        if !email.contains('@') {
            return Err(ServiceError::validation("A valid email is required"));
        }
        if Self::find_by_email(db, &email).await?.is_some() {
            return Err(ServiceError::conflict("User with this email already exists"));
        }

        if new.role.requires_department() && new.department_id.is_none() {
            return Err(ServiceError::validation(format!(
                "A department is required for role {}",
                new.role.as_str()
            )));
        }
        if let Some(department_id) = new.department_id {
            departments::Entity::find_by_id(department_id)
                .one(db)
                .await?
                .ok_or(ServiceError::NotFound("Department"))?;
        }

        let roll_number = non_empty(new.roll_number);
        if let Some(roll) = &roll_number {
            Self::ensure_roll_number_free(db, roll, None).await?;
        }

        let timestamp = now();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(new.password_hash),
            role: Set(new.role),
            department_id: Set(new.department_id),
            class_id: Set(None),
            semester: Set(new.semester),
            roll_number: Set(roll_number),
            phone: Set(non_empty(new.phone)),
            status: Set(UserStatus::Active),
            is_class_teacher: Set(false),
            cgpa: Set(None),
            reset_token: Set(None),
            reset_token_expires_at: Set(None),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db)
        .await?;

        info!("Created {} user {}", user.role.as_str(), user.id);
        Ok(user)
    }

    /// Creates a student and enrols them in one transaction
    pub async fn create_in_class(
        db: &DatabaseConnection,
        new: NewUser,
        class_id: Uuid,
    ) -> ServiceResult<users::Model> {
        let txn = db.begin().await?;
        let user = Self::create(&txn, new).await?;
        ClassService::enroll(&txn, class_id, vec![user.id]).await?;
        let user = Self::get(&txn, user.id).await?;
        txn.commit().await?;
        Ok(user)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> ServiceResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id).one(db).await?)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<users::Model> {
        Self::find_by_id(db, id)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> ServiceResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(Self::normalize_email(email)))
            .one(db)
            .await?)
    }

    pub async fn find_many<C: ConnectionTrait>(
        db: &C,
        ids: Vec<Uuid>,
    ) -> ServiceResult<Vec<users::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(db)
            .await?)
    }

    /// Query users with pagination and filtering
    pub async fn list(
        db: &DatabaseConnection,
        filter: UserFilter,
        page: u64,
        per_page: u64,
    ) -> ServiceResult<(Vec<users::Model>, u64)> {
        let (page, per_page) = page_bounds(page, per_page);
        let mut condition = Condition::all();

        if let Some(role) = filter.role {
            condition = condition.add(users::Column::Role.eq(role));
        }
        if let Some(department_id) = filter.department_id {
            condition = condition.add(users::Column::DepartmentId.eq(department_id));
        }
        if let Some(class_id) = filter.class_id {
            condition = condition.add(users::Column::ClassId.eq(class_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(users::Column::Status.eq(status));
        }
        if let Some(search) = non_empty(filter.search) {
            condition = condition.add(
                Condition::any()
                    .add(users::Column::Name.like(format!("%{search}%")))
                    .add(users::Column::Email.like(format!("%{}%", search.to_lowercase())))
                    .add(users::Column::RollNumber.like(format!("%{search}%"))),
            );
        }

        let query = users::Entity::find()
            .filter(condition)
            .order_by_asc(users::Column::Name);

        let total_items = query.clone().count(db).await?;
        let users = query.paginate(db, per_page).fetch_page(page - 1).await?;

        Ok((users, total_items))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        changes: UserChanges,
    ) -> ServiceResult<users::Model> {
        let user = Self::get(db, id).await?;
        let mut active: users::ActiveModel = user.clone().into();

        if let Some(name) = non_empty(changes.name) {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            let email = Self::normalize_email(&email);
            if !email.contains('@') {
                return Err(ServiceError::validation("A valid email is required"));
            }
            if email != user.email {
                if Self::find_by_email(db, &email).await?.is_some() {
                    return Err(ServiceError::conflict("User with this email already exists"));
                }
                active.email = Set(email);
            }
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(non_empty(Some(phone)));
        }
        if let Some(semester) = changes.semester {
            if semester < 1 {
                return Err(ServiceError::validation("Semester must be positive"));
            }
            active.semester = Set(Some(semester));
        }
        if let Some(roll) = changes.roll_number {
            let roll = non_empty(Some(roll));
            if let Some(roll) = &roll {
                Self::ensure_roll_number_free(db, roll, Some(id)).await?;
            }
            active.roll_number = Set(roll);
        }
        if let Some(role) = changes.role {
            if role != user.role && user.is_class_teacher {
                return Err(ServiceError::validation(
                    "Unassign the user as class teacher before changing the role",
                ));
            }
            active.role = Set(role);
        }
        if let Some(department_id) = changes.department_id {
            departments::Entity::find_by_id(department_id)
                .one(db)
                .await?
                .ok_or(ServiceError::NotFound("Department"))?;
            if user.class_id.is_some() && user.department_id != Some(department_id) {
                return Err(ServiceError::validation(
                    "Remove the student from their class before moving departments",
                ));
            }
            active.department_id = Set(Some(department_id));
        }

        active.updated_at = Set(now());
        let user = active.update(db).await?;
        info!("Updated user {}", user.id);
        Ok(user)
    }

    pub async fn set_status<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        status: UserStatus,
    ) -> ServiceResult<users::Model> {
        let user = Self::get(db, id).await?;
        let mut active: users::ActiveModel = user.into();
        active.status = Set(status);
        active.updated_at = Set(now());

        let user = active.update(db).await?;
        info!("User {} is now {}", user.id, user.status.as_ref());
        Ok(user)
    }

    pub async fn set_password<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        password_hash: String,
    ) -> ServiceResult<()> {
        let user = Self::get(db, id).await?;
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.reset_token = Set(None);
        active.reset_token_expires_at = Set(None);
        active.updated_at = Set(now());
        active.update(db).await?;

        info!("Password changed for user {id}");
        Ok(())
    }

    pub async fn set_reset_token<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        token: String,
        expires_at: NaiveDateTime,
    ) -> ServiceResult<()> {
        let user = Self::get(db, id).await?;
        let mut active: users::ActiveModel = user.into();
        active.reset_token = Set(Some(token));
        active.reset_token_expires_at = Set(Some(expires_at));
        active.update(db).await?;
        Ok(())
    }

    /// Finds the user holding an unexpired reset token
    pub async fn find_by_reset_token<C: ConnectionTrait>(
        db: &C,
        token: &str,
    ) -> ServiceResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::ResetToken.eq(token))
            .filter(users::Column::ResetTokenExpiresAt.gt(now()))
            .one(db)
            .await?)
    }

    /// Deletes a user, releasing their class seat and class-teacher assignments
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;
        let user = Self::get(&txn, id).await?;

        if let Some(class_id) = user.class_id {
            let mut active: users::ActiveModel = user.clone().into();
            active.class_id = Set(None);
            active.update(&txn).await?;
            ClassService::sync_strength(&txn, class_id).await?;
        }

        if user.role == Role::Faculty {
            classes::Entity::update_many()
                .col_expr(classes::Column::ClassTeacherId, Expr::value(Option::<Uuid>::None))
                .filter(classes::Column::ClassTeacherId.eq(id))
                .exec(&txn)
                .await?;
            class_subjects::Entity::update_many()
                .col_expr(class_subjects::Column::FacultyId, Expr::value(Option::<Uuid>::None))
                .filter(class_subjects::Column::FacultyId.eq(id))
                .exec(&txn)
                .await?;
        }

        users::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted user {id}");
        Ok(())
    }

    pub async fn count<C: ConnectionTrait>(
        db: &C,
        role: Option<Role>,
        department_id: Option<Uuid>,
    ) -> ServiceResult<u64> {
        let mut query = users::Entity::find();
        if let Some(role) = role {
            query = query.filter(users::Column::Role.eq(role));
        }
        if let Some(department_id) = department_id {
            query = query.filter(users::Column::DepartmentId.eq(department_id));
        }
        Ok(query.count(db).await?)
    }

    /// Creates the bootstrap admin unless an admin already exists
    pub async fn ensure_admin<C: ConnectionTrait>(
        db: &C,
        name: &str,
        email: &str,
        password_hash: String,
    ) -> ServiceResult<Option<users::Model>> {
        let existing = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Admin))
            .count(db)
            .await?;
        if existing > 0 {
            return Ok(None);
        }

        let admin = Self::create(
            db,
            NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::Admin,
                department_id: None,
                semester: None,
                roll_number: None,
                phone: None,
            },
        )
        .await?;

        info!("Seeded admin account {}", admin.email);
        Ok(Some(admin))
    }

    async fn ensure_roll_number_free<C: ConnectionTrait>(
        db: &C,
        roll_number: &str,
        except: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut query = users::Entity::find().filter(users::Column::RollNumber.eq(roll_number));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(ServiceError::conflict("Roll number is already in use"));
        }
        Ok(())
    }
}
