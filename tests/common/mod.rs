#![allow(dead_code)]

use std::sync::Arc;

use sqlx::SqlitePool;
use timetable_backend::crawler::columns;
use timetable_backend::crawler::{ColumnIndex, CrawlSheets, LectureSource, RawRow, StaticLectureSource};
use timetable_backend::db::{self, repository};

pub const HEADER: [&str; 13] = [
    columns::CATEGORY,
    columns::COLLEGE,
    columns::DEPARTMENT,
    columns::ACADEMIC_COURSE,
    columns::ACADEMIC_YEAR,
    columns::COURSE_NUMBER,
    columns::LECTURE_NUMBER,
    columns::COURSE_TITLE,
    columns::COURSE_SUBTITLE,
    columns::CREDIT,
    columns::CLASS_TIME,
    columns::PLACE,
    columns::INSTRUCTOR,
];

pub const WRITING: &str = "대학글쓰기";
pub const CALCULUS: &str = "미적분학";
pub const DATA_STRUCTURES: &str = "자료구조";
pub const PHILOSOPHY: &str = "철학개론";

pub async fn setup_test_db() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test database")
}

pub fn lecture_row(course_number: &str, lecture_number: &str, title: &str, class_time: &str) -> RawRow {
    RawRow::new([
        "교양",
        "인문대학",
        "",
        "학사",
        "1학년",
        course_number,
        lecture_number,
        title,
        "",
        "3",
        class_time,
        "14-203",
        "박교수",
    ])
}

pub fn sheets(korean: Vec<RawRow>, english: Vec<RawRow>) -> CrawlSheets {
    CrawlSheets {
        header: ColumnIndex::from_header(&RawRow::new(HEADER)),
        korean,
        english,
    }
}

/// Four offerings on both language sheets:
/// writing Mon/Wed 09:30-10:45, calculus Mon 10:00-11:15 (overlaps writing),
/// data structures Mon 10:45-12:00 (touches writing), philosophy Tue.
pub fn term_sheets() -> CrawlSheets {
    sheets(
        vec![
            lecture_row("L0440.000400", "001", WRITING, "월(09:30~10:45)/수(09:30~10:45)"),
            lecture_row("034.001", "001", CALCULUS, "월(10:00~11:15)"),
            lecture_row("M1522.000600", "001", DATA_STRUCTURES, "월(10:45~12:00)"),
            lecture_row("F11.101", "001", PHILOSOPHY, "화(14:00~15:15)"),
        ],
        vec![
            lecture_row("L0440.000400", "001", "College Writing", "월(09:30~10:45)/수(09:30~10:45)"),
            lecture_row("034.001", "001", "Calculus", "월(10:00~11:15)"),
            lecture_row("M1522.000600", "001", "Data Structures", "월(10:45~12:00)"),
            lecture_row("F11.101", "001", "Introduction to Philosophy", "화(14:00~15:15)"),
        ],
    )
}

pub fn term_source() -> Arc<dyn LectureSource> {
    Arc::new(StaticLectureSource::new(term_sheets()))
}

pub async fn lecture_id(pool: &SqlitePool, title: &str) -> String {
    repository::search_lectures(pool, 2025, "1", title, 1, 0)
        .await
        .expect("Failed to search lectures")
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("lecture {} not found", title))
        .id
}
