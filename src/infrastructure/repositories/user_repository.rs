//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::timestamp;
use crate::domain::validation;
use crate::domain::{DomainError, NewUser, User, UserRepository, UserUpdate, ValidationErrors};
use crate::infrastructure::auth::{hash_password, verify_password};
use crate::models::user::{ActiveModel, Column, Entity as UserEntity, Model};

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> Result<Model, DomainError> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)
    }
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn hash(password: &str) -> Result<String, DomainError> {
    hash_password(password).map_err(DomainError::Internal)
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let users = UserEntity::find()
            .order_by_asc(Column::Username)
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        let user = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(user.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let user = UserEntity::find()
            .filter(Column::Username.eq(username.trim()))
            .one(&self.db)
            .await?;
        Ok(user.map(User::from))
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        // stored usernames are trimmed on creation
        let username = username.trim();
        let Some(user) = UserEntity::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await?
        else {
            tracing::warn!("User not found: {}", username);
            return Err(DomainError::Unauthorized);
        };

        if !user.is_active {
            tracing::warn!("Login attempt for inactive user: {}", username);
            return Err(DomainError::Unauthorized);
        }

        match verify_password(password, &user.password_hash) {
            Ok(true) => {
                tracing::debug!("Password verified for user: {}", username);
                Ok(user.into())
            }
            Ok(false) => {
                tracing::warn!("Password verification failed for user: {}", username);
                Err(DomainError::Unauthorized)
            }
            Err(e) => {
                tracing::error!("Stored password hash for {} is unreadable: {}", username, e);
                Err(DomainError::Unauthorized)
            }
        }
    }

    async fn create(&self, input: NewUser) -> Result<User, DomainError> {
        let mut errors = ValidationErrors::new();
        let username = validation::username(&input.username)
            .map_err(|e| errors.add("username", e))
            .unwrap_or_default();
        errors.check("password", validation::password(&input.password));
        let role = validation::role(input.role.as_deref().unwrap_or("user"))
            .map_err(|e| errors.add("role", e))
            .unwrap_or_default();

        if errors.get("username").is_none() && self.find_by_username(&username).await?.is_some() {
            errors.add("username", "A user with that username already exists.");
        }
        errors.into_result()?;

        let now = timestamp();
        let user = ActiveModel {
            username: Set(username),
            password_hash: Set(hash(&input.password)?),
            role: Set(role),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!("Created {} user {}", user.role, user.username);
        Ok(user.into())
    }

    async fn update(&self, id: i32, input: UserUpdate) -> Result<User, DomainError> {
        let mut errors = ValidationErrors::new();
        let role = match input.role.as_deref() {
            Some(role) => validation::role(role)
                .map_err(|e| errors.add("role", e))
                .ok(),
            None => None,
        };
        if let Some(password) = &input.password {
            errors.check("password", validation::password(password));
        }
        errors.into_result()?;

        let existing = self.find_model(id).await?;
        let mut active: ActiveModel = existing.into();
        if let Some(role) = role {
            active.role = Set(role);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(password) = &input.password {
            active.password_hash = Set(hash(password)?);
        }
        active.updated_at = Set(timestamp());

        let user = active.update(&self.db).await?;
        tracing::info!("Updated user {}", user.username);
        Ok(user.into())
    }

    async fn change_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let existing = self.find_model(id).await?;

        let mut errors = ValidationErrors::new();
        if !verify_password(current_password, &existing.password_hash).unwrap_or(false) {
            errors.add("current_password", "Your current password was entered incorrectly.");
        }
        errors.check("new_password", validation::password(new_password));
        errors.into_result()?;

        let username = existing.username.clone();
        let mut active: ActiveModel = existing.into();
        active.password_hash = Set(hash(new_password)?);
        active.updated_at = Set(timestamp());
        active.update(&self.db).await?;

        tracing::info!("Password changed for user {}", username);
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}
