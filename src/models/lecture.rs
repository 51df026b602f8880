use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::schedule::{DayOfWeek, TimeSlot};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lecture {
    pub id: String,
    pub year: i32,
    pub semester: String,
    pub course_number: String,
    pub lecture_number: String,
    pub course_title: String,
    pub course_subtitle: Option<String>,
    pub credit: i32,
    pub instructor: String,
    pub category: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub academic_course: Option<String>,
    pub academic_year: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Row shape of `lecture_schedules`; converted into [`LectureSchedule`] once
/// the day ordinal has been checked.
#[derive(Debug, Clone, FromRow)]
pub struct LectureScheduleRow {
    pub id: String,
    pub lecture_id: String,
    pub day_of_week: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub place: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureSchedule {
    pub id: String,
    pub lecture_id: String,
    pub slot: TimeSlot,
    pub place: Option<String>,
}

impl TryFrom<LectureScheduleRow> for LectureSchedule {
    type Error = sqlx::Error;

    fn try_from(row: LectureScheduleRow) -> Result<Self, Self::Error> {
        let day = DayOfWeek::from_ordinal(row.day_of_week).ok_or_else(|| {
            sqlx::Error::Decode(format!("invalid day_of_week {}", row.day_of_week).into())
        })?;
        Ok(Self {
            id: row.id,
            lecture_id: row.lecture_id,
            slot: TimeSlot::new(day, row.start_time, row.end_time),
            place: row.place,
        })
    }
}

/// Lecture produced by a crawl, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLecture {
    pub year: i32,
    pub semester: String,
    pub course_number: String,
    pub lecture_number: String,
    pub course_title: String,
    pub course_subtitle: Option<String>,
    pub credit: i32,
    pub instructor: String,
    pub category: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub academic_course: Option<String>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewLectureSchedule {
    pub slot: TimeSlot,
    pub place: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LectureScheduleResponse {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub place: Option<String>,
}

impl From<&LectureSchedule> for LectureScheduleResponse {
    fn from(schedule: &LectureSchedule) -> Self {
        Self {
            day_of_week: schedule.slot.day,
            start_time: schedule.slot.start.format("%H:%M").to_string(),
            end_time: schedule.slot.end.format("%H:%M").to_string(),
            place: schedule.place.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LectureResponse {
    pub id: String,
    pub year: i32,
    pub semester: String,
    pub course_number: String,
    pub lecture_number: String,
    pub course_title: String,
    pub course_subtitle: Option<String>,
    pub credit: i32,
    pub instructor: String,
    pub category: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub academic_course: Option<String>,
    pub academic_year: Option<String>,
    pub schedules: Vec<LectureScheduleResponse>,
}

impl LectureResponse {
    pub fn new(lecture: Lecture, schedules: &[LectureSchedule]) -> Self {
        Self {
            id: lecture.id,
            year: lecture.year,
            semester: lecture.semester,
            course_number: lecture.course_number,
            lecture_number: lecture.lecture_number,
            course_title: lecture.course_title,
            course_subtitle: lecture.course_subtitle,
            credit: lecture.credit,
            instructor: lecture.instructor,
            category: lecture.category,
            college: lecture.college,
            department: lecture.department,
            academic_course: lecture.academic_course,
            academic_year: lecture.academic_year,
            schedules: schedules.iter().map(LectureScheduleResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LectureSearchQuery {
    pub year: i32,
    pub semester: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub page: u32,
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LectureSearchResponse {
    pub lectures: Vec<LectureResponse>,
    pub total_count: i64,
    pub total_pages: u32,
    pub current_page: u32,
    pub has_next: bool,
}
