//! SeaORM implementation of ClassificationRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::{fetch_page, normalize_code, timestamp};
use crate::domain::{
    Classification, ClassificationInput, ClassificationRepository, DomainError, Paginated,
    Pagination, ValidationErrors, WriteMode,
};
use crate::models::classification::{ActiveModel, Column, Entity as ClassificationEntity, Model};
use crate::models::classification_detail;

/// SeaORM-based implementation of ClassificationRepository
pub struct SeaOrmClassificationRepository {
    db: DatabaseConnection,
}

impl SeaOrmClassificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<Model> for Classification {
    fn from(model: Model) -> Self {
        Self {
            code: model.code,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[async_trait]
impl ClassificationRepository for SeaOrmClassificationRepository {
    async fn find_all(
        &self,
        pagination: Pagination,
    ) -> Result<Paginated<Classification>, DomainError> {
        let query = ClassificationEntity::find().order_by_asc(Column::Code);
        let (models, total) = fetch_page(&self.db, query, pagination).await?;

        Ok(Paginated {
            items: models.into_iter().map(Classification::from).collect(),
            total,
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Classification>, DomainError> {
        let model = ClassificationEntity::find_by_id(normalize_code(code))
            .one(&self.db)
            .await?;
        Ok(model.map(Classification::from))
    }

    async fn create(&self, input: ClassificationInput) -> Result<Classification, DomainError> {
        let input = input.clean(WriteMode::Create)?;
        let txn = self.db.begin().await?;

        if ClassificationEntity::find_by_id(input.code.clone())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(DomainError::Validation(ValidationErrors::single(
                "code",
                "Classification with this code already exists.",
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
        tracing::info!("Created classification {}", model.code);
        Ok(model.into())
    }

    async fn update(
        &self,
        code: &str,
        input: ClassificationInput,
    ) -> Result<Classification, DomainError> {
        let input = input.clean(WriteMode::Update)?;
        let txn = self.db.begin().await?;

        let existing = ClassificationEntity::find_by_id(normalize_code(code))
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.updated_at = Set(timestamp());
        let model = active.update(&txn).await?;

        txn.commit().await?;
        tracing::info!("Updated classification {}", model.code);
        Ok(model.into())
    }

    async fn delete(&self, code: &str) -> Result<(), DomainError> {
        let code = normalize_code(code);
        let txn = self.db.begin().await?;

        if ClassificationEntity::find_by_id(code.clone())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(DomainError::NotFound);
        }

        let dependents = classification_detail::Entity::find()
            .filter(classification_detail::Column::ClassificationCode.eq(code.clone()))
            .count(&txn)
            .await?;
        if dependents > 0 {
            tracing::warn!(
                "Refusing to delete classification {}: {} details refer to it",
                code,
                dependents
            );
            return Err(DomainError::Conflict(format!(
                "Cannot delete classification {}: {} classification detail(s) still refer to it.",
                code, dependents
            )));
        }

        ClassificationEntity::delete_by_id(code.clone())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!("Deleted classification {}", code);
        Ok(())
    }
}
