//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    BookIdGenerator, BookRepository, ClassificationDetailRepository, ClassificationRepository,
    DivisionRepository, UserRepository,
};
use crate::infrastructure::{
    SeaOrmBookRepository, SeaOrmClassificationDetailRepository, SeaOrmClassificationRepository,
    SeaOrmDivisionRepository, SeaOrmUserRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection (health checks, bootstrap)
    db: DatabaseConnection,
    /// Classification repository
    pub classification_repo: Arc<dyn ClassificationRepository>,
    /// Classification detail repository
    pub classification_detail_repo: Arc<dyn ClassificationDetailRepository>,
    /// Division repository
    pub division_repo: Arc<dyn DivisionRepository>,
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// User repository
    pub user_repo: Arc<dyn UserRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let ids = Arc::new(BookIdGenerator::new());

        Self {
            classification_repo: Arc::new(SeaOrmClassificationRepository::new(db.clone())),
            classification_detail_repo: Arc::new(SeaOrmClassificationDetailRepository::new(
                db.clone(),
            )),
            division_repo: Arc::new(SeaOrmDivisionRepository::new(db.clone())),
            book_repo: Arc::new(SeaOrmBookRepository::new(db.clone(), ids)),
            user_repo: Arc::new(SeaOrmUserRepository::new(db.clone())),
            db,
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
