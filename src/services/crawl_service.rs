use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::crawler::{CanonicalRowPolicy, CrawlContext, LectureSource, ReconcileError, reconcile_crawl_rows};
use crate::db::repository;
use crate::error::AppError;

const SEMESTERS: [&str; 4] = ["1", "2", "3", "4"];

pub struct CrawlService {
    db: SqlitePool,
    source: Arc<dyn LectureSource>,
    policy: CanonicalRowPolicy,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CrawlStats {
    pub year: i32,
    pub semester: String,
    pub raw_rows: usize,
    pub skipped_rows: usize,
    pub lectures: usize,
    pub schedules: usize,
}

impl CrawlService {
    pub fn new(db: SqlitePool, source: Arc<dyn LectureSource>) -> Self {
        Self {
            db,
            source,
            policy: CanonicalRowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CanonicalRowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetches both language sheets for a term, reconciles them and stores the
    /// result. A reconcile failure aborts before anything is written.
    pub async fn crawl(&self, year: i32, semester: &str) -> Result<CrawlStats, AppError> {
        if !SEMESTERS.contains(&semester) {
            return Err(AppError::BadRequest(format!("Unknown semester: {}", semester)));
        }

        info!("Step 1: Fetching lecture sheets for {}-{}", year, semester);
        let sheets = self.source.fetch_sheets(year, semester).await?;

        info!(
            "Step 2: Reconciling {} korean and {} english rows",
            sheets.korean.len(),
            sheets.english.len()
        );
        let context = CrawlContext {
            year,
            semester: semester.to_string(),
        };
        let batch = match reconcile_crawl_rows(&context, &sheets.header, sheets.rows(), self.policy) {
            Ok(batch) => batch,
            Err(e) => {
                if let ReconcileError::MissingField { row, .. } = &e {
                    if let Some((language, sheet_row)) = sheets.locate(*row) {
                        warn!("Crawl aborted at {} sheet data row {}: {}", language, sheet_row, e);
                    }
                }
                return Err(e.into());
            }
        };

        info!("Step 3: Saving {} lectures", batch.lecture_count());
        let schedules = repository::save_reconciled_batch(&self.db, &batch).await?;

        let stats = CrawlStats {
            year,
            semester: semester.to_string(),
            raw_rows: batch.raw_rows,
            skipped_rows: batch.skipped_rows,
            lectures: batch.lecture_count(),
            schedules,
        };
        info!("Crawl completed successfully: {:?}", stats);
        Ok(stats)
    }
}

/// Parses a `YYYY-S` term such as `2025-1`.
pub fn parse_semester_param(text: &str) -> Result<(i32, String), AppError> {
    let invalid = || AppError::BadRequest(format!("Invalid semester '{}', expected YYYY-S", text));

    let (year, semester) = text.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || !SEMESTERS.contains(&semester) {
        return Err(invalid());
    }
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    Ok((year, semester.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_year_and_term() {
        assert_eq!(parse_semester_param("2025-1").unwrap(), (2025, "1".to_string()));
        assert_eq!(parse_semester_param(" 2024-4 ").unwrap(), (2024, "4".to_string()));
    }

    #[test]
    fn rejects_malformed_terms() {
        for text in ["2025", "2025-5", "25-1", "abcd-1", "2025-", ""] {
            assert!(
                matches!(parse_semester_param(text), Err(AppError::BadRequest(_))),
                "{} should be rejected",
                text
            );
        }
    }
}
