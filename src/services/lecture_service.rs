use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{LectureResponse, LectureSearchQuery, LectureSearchResponse};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct LectureService {
    db: SqlitePool,
}

impl LectureService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn search(&self, query: &LectureSearchQuery) -> Result<LectureSearchResponse, AppError> {
        let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(AppError::BadRequest(format!(
                "size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        let keyword = query.keyword.trim();

        let total_count = repository::count_lectures(&self.db, query.year, &query.semester, keyword).await?;
        let lectures = repository::search_lectures(
            &self.db,
            query.year,
            &query.semester,
            keyword,
            i64::from(size),
            i64::from(query.page) * i64::from(size),
        )
        .await?;

        let mut responses = Vec::with_capacity(lectures.len());
        for lecture in lectures {
            let schedules = repository::fetch_lecture_schedules(&self.db, &lecture.id).await?;
            responses.push(LectureResponse::new(lecture, &schedules));
        }

        let total_pages = (total_count.max(0) as u64).div_ceil(u64::from(size)) as u32;
        Ok(LectureSearchResponse {
            lectures: responses,
            total_count,
            total_pages,
            current_page: query.page,
            has_next: query.page.saturating_add(1) < total_pages,
        })
    }
}
