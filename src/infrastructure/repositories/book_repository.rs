//! SeaORM implementation of BookRepository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::classification_detail_repository::load_classifications;
use super::{does_not_exist, fetch_page, normalize_code, timestamp};
use crate::domain::{
    Book, BookFilter, BookId, BookIdGenerator, BookInput, BookRepository, ClassificationDetailRef,
    DivisionRef, DomainError, Paginated, ValidationErrors,
};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity, Model};
use crate::models::{classification_detail, division};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
    ids: Arc<BookIdGenerator>,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection, ids: Arc<BookIdGenerator>) -> Self {
        Self { db, ids }
    }
}

/// Resolves the classification detail (with its parent) and division of each
/// book row into the nested read shape.
async fn hydrate<C: ConnectionTrait>(db: &C, models: Vec<Model>) -> Result<Vec<Book>, DomainError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let mut detail_codes: Vec<String> = models
        .iter()
        .map(|m| m.classification_detail_code.clone())
        .collect();
    detail_codes.sort();
    detail_codes.dedup();
    let details: HashMap<String, classification_detail::Model> =
        classification_detail::Entity::find()
            .filter(classification_detail::Column::Code.is_in(detail_codes))
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.code.clone(), d))
            .collect();

    let classifications =
        load_classifications(db, details.values().map(|d| d.classification_code.clone())).await?;

    let mut division_codes: Vec<String> = models.iter().map(|m| m.division_code.clone()).collect();
    division_codes.sort();
    division_codes.dedup();
    let divisions: HashMap<String, DivisionRef> = division::Entity::find()
        .filter(division::Column::Code.is_in(division_codes))
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.code.clone(), DivisionRef::from(d)))
        .collect();

    models
        .into_iter()
        .map(|model| -> Result<Book, DomainError> {
            let missing = |what: &str, code: &str| {
                DomainError::Internal(format!("{} {} of book {} is missing", what, code, model.id))
            };

            let detail = details
                .get(&model.classification_detail_code)
                .ok_or_else(|| missing("classification detail", &model.classification_detail_code))?;
            let classification = classifications
                .get(&detail.classification_code)
                .cloned()
                .ok_or_else(|| missing("classification", &detail.classification_code))?;
            let division = divisions
                .get(&model.division_code)
                .cloned()
                .ok_or_else(|| missing("division", &model.division_code))?;

            Ok(Book {
                classification_detail: ClassificationDetailRef {
                    code: detail.code.clone(),
                    name: detail.name.clone(),
                    classification,
                },
                division,
                id: model.id,
                title: model.title,
                author: model.author,
                publisher: model.publisher,
                published_on: model.published_on,
                isbn: model.isbn,
                is_disposed: model.is_disposed,
                disposed_on: model.disposed_on,
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
        })
        .collect()
}

/// Checks that the codes a book refers to exist, reporting each missing one
/// against its field.
async fn check_references<C: ConnectionTrait>(db: &C, input: &BookInput) -> Result<(), DomainError> {
    let mut errors = ValidationErrors::new();

    if classification_detail::Entity::find_by_id(input.classification_detail.clone())
        .one(db)
        .await?
        .is_none()
    {
        errors.add(
            "classification_detail",
            does_not_exist(&input.classification_detail),
        );
    }

    if division::Entity::find_by_id(input.division.clone())
        .one(db)
        .await?
        .is_none()
    {
        errors.add("division", does_not_exist(&input.division));
    }

    errors.into_result()
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<Paginated<Book>, DomainError> {
        let mut query = BookEntity::find();

        // Apply filters
        if let Some(classification) = &filter.classification
            && !classification.trim().is_empty()
        {
            query = query
                .inner_join(classification_detail::Entity)
                .filter(
                    classification_detail::Column::ClassificationCode
                        .eq(normalize_code(classification)),
                );
        }

        if let Some(division) = &filter.division
            && !division.trim().is_empty()
        {
            query = query.filter(Column::DivisionCode.eq(normalize_code(division)));
        }

        if let Some(disposed) = filter.disposed {
            query = query.filter(Column::IsDisposed.eq(disposed));
        }

        // ULIDs sort by creation time
        let query = query.order_by_asc(Column::Id);
        let (models, total) = fetch_page(&self.db, query, filter.pagination).await?;
        tracing::debug!(
            "List books - classification={:?}, division={:?}: {} of {}",
            filter.classification,
            filter.division,
            models.len(),
            total
        );

        Ok(Paginated {
            items: hydrate(&self.db, models).await?,
            total,
        })
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, DomainError> {
        let model = BookEntity::find_by_id(id.to_string()).one(&self.db).await?;

        match model {
            Some(model) => Ok(hydrate(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create(&self, input: BookInput) -> Result<Book, DomainError> {
        let input = input.clean()?;
        let txn = self.db.begin().await?;
        check_references(&txn, &input).await?;

        let id = self.ids.next_id();
        let now = timestamp();
        let model = ActiveModel {
            id: Set(id.to_string()),
            title: Set(input.title),
            author: Set(input.author),
            publisher: Set(input.publisher),
            published_on: Set(input.published_on),
            isbn: Set(input.isbn),
            classification_detail_code: Set(input.classification_detail),
            division_code: Set(input.division),
            is_disposed: Set(input.is_disposed),
            disposed_on: Set(input.disposed_on),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let book = hydrate(&txn, vec![model])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("inserted book vanished".to_string()))?;
        txn.commit().await?;

        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(book)
    }

    async fn update(&self, id: &BookId, input: BookInput) -> Result<Book, DomainError> {
        let input = input.clean()?;
        let txn = self.db.begin().await?;

        let existing = BookEntity::find_by_id(id.to_string())
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;
        check_references(&txn, &input).await?;

        let mut active: ActiveModel = existing.into();
        active.title = Set(input.title);
        active.author = Set(input.author);
        active.publisher = Set(input.publisher);
        active.published_on = Set(input.published_on);
        active.isbn = Set(input.isbn);
        active.classification_detail_code = Set(input.classification_detail);
        active.division_code = Set(input.division);
        active.is_disposed = Set(input.is_disposed);
        active.disposed_on = Set(input.disposed_on);
        active.updated_at = Set(timestamp());
        let model = active.update(&txn).await?;

        let book = hydrate(&txn, vec![model])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("updated book vanished".to_string()))?;
        txn.commit().await?;

        tracing::info!("Updated book {}", book.id);
        Ok(book)
    }

    async fn delete(&self, id: &BookId) -> Result<(), DomainError> {
        let result = BookEntity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
