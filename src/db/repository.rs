use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::crawler::ReconciledBatch;
use crate::models::{
    Lecture, LectureSchedule, LectureScheduleRow, NewLecture, NewLectureSchedule, NewTimetableRequest,
    Timetable, TimetableLecture,
};

const LECTURE_COLUMNS: &str = "l.id, l.year, l.semester, l.course_number, l.lecture_number, \
    l.course_title, l.course_subtitle, l.credit, l.instructor, l.category, l.college, \
    l.department, l.academic_course, l.academic_year, l.created_at, l.updated_at";

const SCHEDULE_COLUMNS: &str = "s.id, s.lecture_id, s.day_of_week, s.start_time, s.end_time, s.place";

fn into_schedules(rows: Vec<LectureScheduleRow>) -> Result<Vec<LectureSchedule>, sqlx::Error> {
    rows.into_iter().map(LectureSchedule::try_from).collect()
}

// ---------------------------------------------------------------------------
// Lectures
// ---------------------------------------------------------------------------

pub async fn find_lecture_by_id<'e, E>(db: E, id: &str) -> Result<Option<Lecture>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Lecture>(&format!("SELECT {} FROM lectures l WHERE l.id = ?", LECTURE_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn fetch_lecture_schedules<'e, E>(
    db: E,
    lecture_id: &str,
) -> Result<Vec<LectureSchedule>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, LectureScheduleRow>(&format!(
        "SELECT {} FROM lecture_schedules s WHERE s.lecture_id = ? ORDER BY s.day_of_week, s.start_time",
        SCHEDULE_COLUMNS
    ))
    .bind(lecture_id)
    .fetch_all(db)
    .await?;
    into_schedules(rows)
}

/// Lectures of a term whose title or instructor contains `keyword`.
pub async fn search_lectures<'e, E>(
    db: E,
    year: i32,
    semester: &str,
    keyword: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Lecture>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Lecture>(&format!(
        r#"
        SELECT {}
        FROM lectures l
        WHERE l.year = ?1 AND l.semester = ?2
          AND (l.course_title LIKE '%' || ?3 || '%' OR l.instructor LIKE '%' || ?3 || '%')
        ORDER BY l.course_number, l.lecture_number
        LIMIT ?4 OFFSET ?5
        "#,
        LECTURE_COLUMNS
    ))
    .bind(year)
    .bind(semester)
    .bind(keyword)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count_lectures<'e, E>(
    db: E,
    year: i32,
    semester: &str,
    keyword: &str,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM lectures
        WHERE year = ?1 AND semester = ?2
          AND (course_title LIKE '%' || ?3 || '%' OR instructor LIKE '%' || ?3 || '%')
        "#,
    )
    .bind(year)
    .bind(semester)
    .bind(keyword)
    .fetch_one(db)
    .await
}

/// Inserts a lecture or refreshes the one with the same natural key. The id of
/// an existing lecture is kept so timetable links survive a re-crawl.
pub async fn upsert_lecture<'e, E>(db: E, lecture: &NewLecture, now: &str) -> Result<String, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO lectures
            (id, year, semester, course_number, lecture_number, course_title, course_subtitle,
            credit, instructor, category, college, department, academic_course, academic_year,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)
        ON CONFLICT (year, semester, course_number, lecture_number) DO UPDATE SET
            course_title = excluded.course_title,
            course_subtitle = excluded.course_subtitle,
            credit = excluded.credit,
            instructor = excluded.instructor,
            category = excluded.category,
            college = excluded.college,
            department = excluded.department,
            academic_course = excluded.academic_course,
            academic_year = excluded.academic_year,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(lecture.year)
    .bind(&lecture.semester)
    .bind(&lecture.course_number)
    .bind(&lecture.lecture_number)
    .bind(&lecture.course_title)
    .bind(&lecture.course_subtitle)
    .bind(lecture.credit)
    .bind(&lecture.instructor)
    .bind(&lecture.category)
    .bind(&lecture.college)
    .bind(&lecture.department)
    .bind(&lecture.academic_course)
    .bind(&lecture.academic_year)
    .bind(now)
    .fetch_one(db)
    .await
}

pub async fn delete_lecture_schedules<'e, E>(db: E, lecture_id: &str) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM lecture_schedules WHERE lecture_id = ?")
        .bind(lecture_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_lecture_schedule<'e, E>(
    db: E,
    lecture_id: &str,
    schedule: &NewLectureSchedule,
) -> Result<LectureSchedule, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO lecture_schedules (id, lecture_id, day_of_week, start_time, end_time, place)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(lecture_id)
    .bind(i64::from(schedule.slot.day.ordinal()))
    .bind(schedule.slot.start)
    .bind(schedule.slot.end)
    .bind(&schedule.place)
    .execute(db)
    .await?;

    Ok(LectureSchedule {
        id,
        lecture_id: lecture_id.to_string(),
        slot: schedule.slot,
        place: schedule.place.clone(),
    })
}

/// Persists a whole crawl in one transaction: either every lecture and
/// schedule lands or none does. Returns the number of schedules written.
pub async fn save_reconciled_batch(db: &SqlitePool, batch: &ReconciledBatch) -> Result<usize, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;
    let mut schedule_count = 0;

    for reconciled in &batch.lectures {
        let lecture_id = upsert_lecture(&mut *tx, &reconciled.lecture, &now).await?;
        delete_lecture_schedules(&mut *tx, &lecture_id).await?;
        for schedule in &reconciled.schedules {
            insert_lecture_schedule(&mut *tx, &lecture_id, schedule).await?;
            schedule_count += 1;
        }
    }

    tx.commit().await?;
    Ok(schedule_count)
}

// ---------------------------------------------------------------------------
// Timetables
// ---------------------------------------------------------------------------

pub async fn insert_timetable<'e, E>(
    db: E,
    user_id: &str,
    req: NewTimetableRequest,
) -> Result<Timetable, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO timetables (id, user_id, year, semester, name, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(req.year)
    .bind(&req.semester)
    .bind(&req.name)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Timetable {
        id,
        user_id: user_id.to_string(),
        year: req.year,
        semester: req.semester,
        name: req.name,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn find_timetable_by_id<'e, E>(db: E, id: &str) -> Result<Option<Timetable>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Timetable>(
        "SELECT id, user_id, year, semester, name, created_at, updated_at FROM timetables WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_timetables_by_user<'e, E>(db: E, user_id: &str) -> Result<Vec<Timetable>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Timetable>(
        r#"
        SELECT id, user_id, year, semester, name, created_at, updated_at
        FROM timetables
        WHERE user_id = ?
        ORDER BY year DESC, semester ASC, name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn rename_timetable<'e, E>(db: E, id: &str, name: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE timetables SET name = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(name)
        .bind(now)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn delete_timetable<'e, E>(db: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM timetables WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Lectures linked to a timetable, in the order they were added.
pub async fn fetch_timetable_lectures<'e, E>(db: E, timetable_id: &str) -> Result<Vec<Lecture>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Lecture>(&format!(
        r#"
        SELECT {}
        FROM timetable_lectures tl
        JOIN lectures l ON l.id = tl.lecture_id
        WHERE tl.timetable_id = ?
        ORDER BY tl.created_at, tl.id
        "#,
        LECTURE_COLUMNS
    ))
    .bind(timetable_id)
    .fetch_all(db)
    .await
}

/// Every schedule entry of every lecture linked to a timetable.
pub async fn fetch_timetable_schedules<'e, E>(
    db: E,
    timetable_id: &str,
) -> Result<Vec<LectureSchedule>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, LectureScheduleRow>(&format!(
        r#"
        SELECT {}
        FROM timetable_lectures tl
        JOIN lecture_schedules s ON s.lecture_id = tl.lecture_id
        WHERE tl.timetable_id = ?
        ORDER BY s.day_of_week, s.start_time
        "#,
        SCHEDULE_COLUMNS
    ))
    .bind(timetable_id)
    .fetch_all(db)
    .await?;
    into_schedules(rows)
}

pub async fn find_timetable_lecture<'e, E>(
    db: E,
    timetable_id: &str,
    lecture_id: &str,
) -> Result<Option<TimetableLecture>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TimetableLecture>(
        r#"
        SELECT id, timetable_id, lecture_id, created_at
        FROM timetable_lectures
        WHERE timetable_id = ?1 AND lecture_id = ?2
        "#,
    )
    .bind(timetable_id)
    .bind(lecture_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_timetable_lecture<'e, E>(
    db: E,
    timetable_id: &str,
    lecture_id: &str,
) -> Result<TimetableLecture, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO timetable_lectures (id, timetable_id, lecture_id, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&id)
    .bind(timetable_id)
    .bind(lecture_id)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(TimetableLecture {
        id,
        timetable_id: timetable_id.to_string(),
        lecture_id: lecture_id.to_string(),
        created_at: now,
    })
}

pub async fn delete_timetable_lecture<'e, E>(
    db: E,
    timetable_id: &str,
    lecture_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM timetable_lectures WHERE timetable_id = ?1 AND lecture_id = ?2")
        .bind(timetable_id)
        .bind(lecture_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
