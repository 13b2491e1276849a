//! Repository implementations using SeaORM

pub mod book_repository;
pub mod classification_detail_repository;
pub mod classification_repository;
pub mod division_repository;
pub mod user_repository;

pub use book_repository::SeaOrmBookRepository;
pub use classification_detail_repository::SeaOrmClassificationDetailRepository;
pub use classification_repository::SeaOrmClassificationRepository;
pub use division_repository::SeaOrmDivisionRepository;
pub use user_repository::SeaOrmUserRepository;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, Select};

use crate::domain::Pagination;

/// Codes are stored upper-case; lookups by path accept any case.
pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub(crate) fn does_not_exist(code: &str) -> String {
    format!("Invalid code \"{}\" - object does not exist.", code)
}

/// Largest page size a caller may ask for.
pub const MAX_PAGE_LIMIT: u64 = 1000;

/// Runs `query`, honoring `pagination` when a limit is given, and returns the
/// rows together with the total number of matches.
///
/// The limit is clamped to `1..=MAX_PAGE_LIMIT`. A page whose offset cannot be
/// represented lies past the end and comes back empty.
pub(crate) async fn fetch_page<E, C>(
    db: &C,
    query: Select<E>,
    pagination: Pagination,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    match pagination.limit {
        Some(limit) => {
            let limit = limit.clamp(1, MAX_PAGE_LIMIT);
            let page = pagination.page.unwrap_or(0);
            let paginator = query.paginate(db, limit);
            let total = paginator.num_items().await?;
            let in_range = page
                .checked_mul(limit)
                .is_some_and(|offset| offset < total && offset <= i64::MAX as u64);
            if !in_range {
                return Ok((Vec::new(), total));
            }
            let items = paginator.fetch_page(page).await?;
            Ok((items, total))
        }
        None => {
            let items = query.all(db).await?;
            let total = items.len() as u64;
            Ok((items, total))
        }
    }
}
