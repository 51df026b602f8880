//! Header names of the registration site's lecture sheet.
//!
//! Both language sheets are looked up through the Korean header row; the
//! English sheet is aligned with it by column position.

pub const CATEGORY: &str = "교과구분";
pub const COLLEGE: &str = "개설대학";
pub const DEPARTMENT: &str = "개설학과";
pub const ACADEMIC_COURSE: &str = "이수과정";
pub const ACADEMIC_YEAR: &str = "학년";
pub const COURSE_NUMBER: &str = "교과목번호";
pub const LECTURE_NUMBER: &str = "강좌번호";
pub const COURSE_TITLE: &str = "교과목명";
pub const COURSE_SUBTITLE: &str = "부제명";
pub const CREDIT: &str = "학점";
pub const CLASS_TIME: &str = "수업교시";
pub const PLACE: &str = "강의실(동-호)(#연건, *평창)";
pub const INSTRUCTOR: &str = "주담당교수";

/// Identity and title columns; a crawl cannot proceed without them.
pub const REQUIRED: [&str; 3] = [COURSE_NUMBER, LECTURE_NUMBER, COURSE_TITLE];

/// Academic course value for undergraduate lectures.
pub const BACHELOR: &str = "학사";

/// Placeholder the site writes into an empty department cell.
pub const NULL_PLACEHOLDER: &str = "null";
