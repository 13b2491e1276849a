//! SeaORM implementation of ClassificationDetailRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::{does_not_exist, fetch_page, normalize_code, timestamp};
use crate::domain::{
    ClassificationDetail, ClassificationDetailFilter, ClassificationDetailInput,
    ClassificationDetailRepository, ClassificationRef, DomainError, Paginated, ValidationErrors,
    WriteMode,
};
use crate::models::classification_detail::{
    ActiveModel, Column, Entity as ClassificationDetailEntity, Model,
};
use crate::models::{book, classification};

/// SeaORM-based implementation of ClassificationDetailRepository
pub struct SeaOrmClassificationDetailRepository {
    db: DatabaseConnection,
}

impl SeaOrmClassificationDetailRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<classification::Model> for ClassificationRef {
    fn from(model: classification::Model) -> Self {
        Self {
            code: model.code,
            name: model.name,
        }
    }
}

/// Loads the parent classifications of `codes`, keyed by code.
pub(crate) async fn load_classifications<C: ConnectionTrait>(
    db: &C,
    codes: impl IntoIterator<Item = String>,
) -> Result<HashMap<String, ClassificationRef>, DomainError> {
    let mut codes: Vec<String> = codes.into_iter().collect();
    codes.sort();
    codes.dedup();
    if codes.is_empty() {
        return Ok(HashMap::new());
    }

    let models = classification::Entity::find()
        .filter(classification::Column::Code.is_in(codes))
        .all(db)
        .await?;

    Ok(models
        .into_iter()
        .map(|m| (m.code.clone(), ClassificationRef::from(m)))
        .collect())
}

fn to_detail(
    model: Model,
    parents: &HashMap<String, ClassificationRef>,
) -> Result<ClassificationDetail, DomainError> {
    let classification = parents
        .get(&model.classification_code)
        .cloned()
        .ok_or_else(|| {
            DomainError::Internal(format!(
                "classification {} of detail {} is missing",
                model.classification_code, model.code
            ))
        })?;

    Ok(ClassificationDetail {
        code: model.code,
        name: model.name,
        classification,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

async fn hydrate<C: ConnectionTrait>(
    db: &C,
    models: Vec<Model>,
) -> Result<Vec<ClassificationDetail>, DomainError> {
    let parents =
        load_classifications(db, models.iter().map(|m| m.classification_code.clone())).await?;
    models.into_iter().map(|m| to_detail(m, &parents)).collect()
}

async fn require_classification<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<(), DomainError> {
    let exists = classification::Entity::find_by_id(code.to_string())
        .one(db)
        .await?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(DomainError::Validation(ValidationErrors::single(
            "classification",
            does_not_exist(code),
        )))
    }
}

#[async_trait]
impl ClassificationDetailRepository for SeaOrmClassificationDetailRepository {
    async fn find_all(
        &self,
        filter: ClassificationDetailFilter,
    ) -> Result<Paginated<ClassificationDetail>, DomainError> {
        let mut query = ClassificationDetailEntity::find();

        if let Some(classification) = &filter.classification
            && !classification.trim().is_empty()
        {
            query = query.filter(Column::ClassificationCode.eq(normalize_code(classification)));
        }

        let query = query.order_by_asc(Column::Code);
        let (models, total) = fetch_page(&self.db, query, filter.pagination).await?;
        tracing::debug!("Listed {} of {} classification details", models.len(), total);

        Ok(Paginated {
            items: hydrate(&self.db, models).await?,
            total,
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ClassificationDetail>, DomainError> {
        let model = ClassificationDetailEntity::find_by_id(normalize_code(code))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(hydrate(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create(
        &self,
        input: ClassificationDetailInput,
    ) -> Result<ClassificationDetail, DomainError> {
        let input = input.clean(WriteMode::Create)?;
        let txn = self.db.begin().await?;

        if ClassificationDetailEntity::find_by_id(input.code.clone())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(DomainError::Validation(ValidationErrors::single(
                "code",
                "Classification detail with this code already exists.",
            )));
        }
        require_classification(&txn, &input.classification).await?;

        let now = timestamp();
        let model = ActiveModel {
            code: Set(input.code),
            classification_code: Set(input.classification),
            name: Set(input.name),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let detail = hydrate(&txn, vec![model])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("inserted detail vanished".to_string()))?;
        txn.commit().await?;

        tracing::info!(
            "Created classification detail {} under {}",
            detail.code,
            detail.classification.code
        );
        Ok(detail)
    }

    async fn update(
        &self,
        code: &str,
        input: ClassificationDetailInput,
    ) -> Result<ClassificationDetail, DomainError> {
        let input = input.clean(WriteMode::Update)?;
        let txn = self.db.begin().await?;

        let existing = ClassificationDetailEntity::find_by_id(normalize_code(code))
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;
        require_classification(&txn, &input.classification).await?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.classification_code = Set(input.classification);
        active.updated_at = Set(timestamp());
        let model = active.update(&txn).await?;

        let detail = hydrate(&txn, vec![model])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("updated detail vanished".to_string()))?;
        txn.commit().await?;

        tracing::info!("Updated classification detail {}", detail.code);
        Ok(detail)
    }

    async fn delete(&self, code: &str) -> Result<(), DomainError> {
        let code = normalize_code(code);
        let txn = self.db.begin().await?;

        if ClassificationDetailEntity::find_by_id(code.clone())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(DomainError::NotFound);
        }

        let books = book::Entity::find()
            .filter(book::Column::ClassificationDetailCode.eq(code.clone()))
            .count(&txn)
            .await?;
        if books > 0 {
            tracing::warn!(
                "Refusing to delete classification detail {}: {} books refer to it",
                code,
                books
            );
            return Err(DomainError::Conflict(format!(
                "Cannot delete classification detail {}: {} book(s) still refer to it.",
                code, books
            )));
        }

        ClassificationDetailEntity::delete_by_id(code.clone())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!("Deleted classification detail {}", code);
        Ok(())
    }
}
