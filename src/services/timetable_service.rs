use std::sync::Arc;

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{info, warn};

use super::TimetableLocks;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{LectureResponse, NewTimetableRequest, Timetable, TimetableDetail};
use crate::schedule::{TimeSlot, find_conflict};

pub struct TimetableService {
    db: SqlitePool,
    locks: Arc<TimetableLocks>,
}

impl TimetableService {
    pub fn new(db: SqlitePool, locks: Arc<TimetableLocks>) -> Self {
        Self { db, locks }
    }

    pub async fn create(&self, user_id: &str, req: NewTimetableRequest) -> Result<Timetable, AppError> {
        let name = validate_name(&req.name)?.to_string();
        if !matches!(req.semester.as_str(), "1" | "2" | "3" | "4") {
            return Err(AppError::BadRequest(format!("Unknown semester: {}", req.semester)));
        }

        let timetable = repository::insert_timetable(
            &self.db,
            user_id,
            NewTimetableRequest { name, ..req },
        )
        .await?;
        info!("Created timetable {} for user {}", timetable.id, user_id);
        Ok(timetable)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Timetable>, AppError> {
        Ok(repository::fetch_timetables_by_user(&self.db, user_id).await?)
    }

    pub async fn detail(&self, user_id: &str, timetable_id: &str) -> Result<TimetableDetail, AppError> {
        let timetable = owned_timetable(&self.db, user_id, timetable_id).await?;
        let lectures = repository::fetch_timetable_lectures(&self.db, timetable_id).await?;

        let mut responses = Vec::with_capacity(lectures.len());
        for lecture in lectures {
            let schedules = repository::fetch_lecture_schedules(&self.db, &lecture.id).await?;
            responses.push(LectureResponse::new(lecture, &schedules));
        }

        Ok(TimetableDetail {
            id: timetable.id,
            year: timetable.year,
            semester: timetable.semester,
            name: timetable.name,
            total_credit: responses.iter().map(|l| l.credit).sum(),
            lectures: responses,
        })
    }

    pub async fn rename(&self, user_id: &str, timetable_id: &str, name: &str) -> Result<Timetable, AppError> {
        let name = validate_name(name)?;
        owned_timetable(&self.db, user_id, timetable_id).await?;

        repository::rename_timetable(&self.db, timetable_id, name).await?;
        repository::find_timetable_by_id(&self.db, timetable_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Timetable".to_string()))
    }

    pub async fn delete(&self, user_id: &str, timetable_id: &str) -> Result<(), AppError> {
        owned_timetable(&self.db, user_id, timetable_id).await?;
        repository::delete_timetable(&self.db, timetable_id).await?;
        info!("Deleted timetable {}", timetable_id);
        Ok(())
    }

    /// Links a lecture to a timetable unless one of its meetings overlaps a
    /// lecture already there. Runs under the timetable's lock so the overlap
    /// check and the insert see the same set of lectures.
    pub async fn add_lecture(
        &self,
        user_id: &str,
        timetable_id: &str,
        lecture_id: &str,
    ) -> Result<TimetableDetail, AppError> {
        {
            let _guard = self.locks.acquire(timetable_id).await;
            let mut tx = self.db.begin().await?;

            owned_timetable(&mut *tx, user_id, timetable_id).await?;
            let lecture = repository::find_lecture_by_id(&mut *tx, lecture_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Lecture".to_string()))?;

            if repository::find_timetable_lecture(&mut *tx, timetable_id, lecture_id)
                .await?
                .is_some()
            {
                return Err(AppError::AlreadyAdded);
            }

            let existing: Vec<TimeSlot> = repository::fetch_timetable_schedules(&mut *tx, timetable_id)
                .await?
                .iter()
                .map(|s| s.slot)
                .collect();
            let candidate: Vec<TimeSlot> = repository::fetch_lecture_schedules(&mut *tx, lecture_id)
                .await?
                .iter()
                .map(|s| s.slot)
                .collect();

            if let Some((held, requested)) = find_conflict(&existing, &candidate) {
                warn!(
                    "Rejected {} for timetable {}: {} overlaps {}",
                    lecture.course_title, timetable_id, requested, held
                );
                return Err(AppError::LectureOverlap(format!("{} overlaps {}", requested, held)));
            }

            repository::insert_timetable_lecture(&mut *tx, timetable_id, lecture_id).await?;
            tx.commit().await?;
            info!("Added {} to timetable {}", lecture.course_title, timetable_id);
        }

        self.detail(user_id, timetable_id).await
    }

    pub async fn remove_lecture(
        &self,
        user_id: &str,
        timetable_id: &str,
        lecture_id: &str,
    ) -> Result<TimetableDetail, AppError> {
        owned_timetable(&self.db, user_id, timetable_id).await?;

        if !repository::delete_timetable_lecture(&self.db, timetable_id, lecture_id).await? {
            return Err(AppError::NotFound("Lecture in timetable".to_string()));
        }

        self.detail(user_id, timetable_id).await
    }
}

async fn owned_timetable<'e, E>(db: E, user_id: &str, timetable_id: &str) -> Result<Timetable, AppError>
where
    E: SqliteExecutor<'e>,
{
    let timetable = repository::find_timetable_by_id(db, timetable_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Timetable".to_string()))?;

    if timetable.user_id != user_id {
        return Err(AppError::Forbidden("Timetable belongs to another user".to_string()));
    }
    Ok(timetable)
}

fn validate_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Timetable name must not be blank".to_string()));
    }
    Ok(name)
}
