use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::crawler::LectureSource;
use crate::error::AppError;
use crate::services::crawl_service::{CrawlService, CrawlStats};

/// Re-crawls one term on a fixed interval.
pub struct CrawlScheduler {
    db: SqlitePool,
    source: Arc<dyn LectureSource>,
    year: i32,
    semester: String,
    interval: Duration,
}

impl CrawlScheduler {
    pub fn new(
        db: SqlitePool,
        source: Arc<dyn LectureSource>,
        year: i32,
        semester: String,
        interval_secs: u64,
    ) -> Self {
        Self {
            db,
            source,
            year,
            semester,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs forever; a failed crawl is logged and the next one still happens.
    pub async fn start(self) {
        info!(
            "Starting crawl scheduler for {}-{} (interval: {:?})",
            self.year, self.semester, self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.run_crawl().await {
                Ok(stats) => {
                    info!(
                        "Scheduled crawl completed - {} lectures, {} schedules from {} rows",
                        stats.lectures, stats.schedules, stats.raw_rows
                    );
                }
                Err(e) => {
                    warn!("Scheduled crawl failed: {:?}", e);
                }
            }
        }
    }

    pub async fn run_crawl(&self) -> Result<CrawlStats, AppError> {
        let service = CrawlService::new(self.db.clone(), self.source.clone());
        service.crawl(self.year, &self.semester).await
    }
}
