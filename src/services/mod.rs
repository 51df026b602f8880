pub mod crawl_service;
pub mod lecture_service;
pub mod locks;
pub mod scheduler;
pub mod timetable_service;

pub use crawl_service::{CrawlService, CrawlStats, parse_semester_param};
pub use lecture_service::LectureService;
pub use locks::TimetableLocks;
pub use scheduler::CrawlScheduler;
pub use timetable_service::TimetableService;
