//! SeaORM implementation of DivisionRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::{fetch_page, normalize_code, timestamp};
use crate::domain::{
    Division, DivisionInput, DivisionRef, DivisionRepository, DomainError, Paginated, Pagination,
    ValidationErrors, WriteMode,
};
use crate::models::book;
use crate::models::division::{ActiveModel, Column, Entity as DivisionEntity, Model};

/// SeaORM-based implementation of DivisionRepository
pub struct SeaOrmDivisionRepository {
    db: DatabaseConnection,
}

impl SeaOrmDivisionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<Model> for Division {
    fn from(model: Model) -> Self {
        Self {
            code: model.code,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Model> for DivisionRef {
    fn from(model: Model) -> Self {
        Self {
            code: model.code,
            name: model.name,
        }
    }
}

#[async_trait]
impl DivisionRepository for SeaOrmDivisionRepository {
    async fn find_all(&self, pagination: Pagination) -> Result<Paginated<Division>, DomainError> {
        let query = DivisionEntity::find().order_by_asc(Column::Code);
        let (models, total) = fetch_page(&self.db, query, pagination).await?;

        Ok(Paginated {
            items: models.into_iter().map(Division::from).collect(),
            total,
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Division>, DomainError> {
        let model = DivisionEntity::find_by_id(normalize_code(code))
            .one(&self.db)
            .await?;
        Ok(model.map(Division::from))
    }

    async fn create(&self, input: DivisionInput) -> Result<Division, DomainError> {
        let input = input.clean(WriteMode::Create)?;
        let txn = self.db.begin().await?;

        if DivisionEntity::find_by_id(input.code.clone())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(DomainError::Validation(ValidationErrors::single(
                "code",
                "Division with this code already exists.",
            )));
        }

        let now = timestamp();
        let model = ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!("Created division {}", model.code);
        Ok(model.into())
    }

    async fn update(&self, code: &str, input: DivisionInput) -> Result<Division, DomainError> {
        let input = input.clean(WriteMode::Update)?;
        let txn = self.db.begin().await?;

        let existing = DivisionEntity::find_by_id(normalize_code(code))
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.updated_at = Set(timestamp());
        let model = active.update(&txn).await?;

        txn.commit().await?;
        tracing::info!("Updated division {}", model.code);
        Ok(model.into())
    }

    async fn delete(&self, code: &str) -> Result<(), DomainError> {
        let code = normalize_code(code);
        let txn = self.db.begin().await?;

        if DivisionEntity::find_by_id(code.clone())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(DomainError::NotFound);
        }

        let books = book::Entity::find()
            .filter(book::Column::DivisionCode.eq(code.clone()))
            .count(&txn)
            .await?;
        if books > 0 {
            tracing::warn!(
                "Refusing to delete division {}: {} books refer to it",
                code,
                books
            );
            return Err(DomainError::Conflict(format!(
                "Cannot delete division {}: {} book(s) still refer to it.",
                code, books
            )));
        }

        DivisionEntity::delete_by_id(code.clone()).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("Deleted division {}", code);
        Ok(())
    }
}
