//! Weekly schedule primitives: day encoding, schedule text parsing and
//! overlap detection.

pub mod conflict;
pub mod day;
pub mod parser;

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub use conflict::{find_conflict, would_conflict};
pub use day::DayOfWeek;
pub use parser::{parse_schedule_field, parse_schedule_group, split_day_groups};

/// One contiguous weekly meeting block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(day: DayOfWeek, start: NaiveTime, end: NaiveTime) -> Self {
        Self { day, start, end }
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}~{})",
            self.day,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}
