use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::LectureResponse;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Timetable {
    pub id: String,
    pub user_id: String,
    pub year: i32,
    pub semester: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimetableLecture {
    pub id: String,
    pub timetable_id: String,
    pub lecture_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimetableRequest {
    pub year: i32,
    pub semester: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameTimetableRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLectureRequest {
    pub lecture_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimetableDetail {
    pub id: String,
    pub year: i32,
    pub semester: String,
    pub name: String,
    pub lectures: Vec<LectureResponse>,
    pub total_credit: i32,
}
