use std::sync::Arc;

use sqlx::SqlitePool;

use crate::crawler::LectureSource;
use crate::services::TimetableLocks;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub source: Arc<dyn LectureSource>,
    pub locks: Arc<TimetableLocks>,
}

impl AppState {
    pub fn new(db: SqlitePool, source: Arc<dyn LectureSource>) -> Self {
        Self {
            db,
            source,
            locks: Arc::new(TimetableLocks::default()),
        }
    }
}
