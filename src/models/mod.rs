pub mod lecture;
pub mod timetable;

pub use lecture::{
    Lecture, LectureResponse, LectureSchedule, LectureScheduleResponse,
    LectureScheduleRow, LectureSearchQuery, LectureSearchResponse, NewLecture, NewLectureSchedule,
};
pub use timetable::{
    AddLectureRequest, NewTimetableRequest, RenameTimetableRequest, Timetable, TimetableDetail,
    TimetableLecture,
};
