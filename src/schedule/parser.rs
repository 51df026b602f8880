use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use super::{DayOfWeek, TimeSlot};

static DAY_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<day>[^\s()]+)(?P<blocks>(?:\([^()]*\))+)$").expect("day group pattern")
});

static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((?P<inner>[^()]*)\)").expect("block pattern"));

static TIME_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<start>\d{2}:\d{2})~(?P<end>\d{2}:\d{2})$").expect("time block pattern")
});

// A group is a whole token up to its first `(`, followed by its blocks.
static GROUP_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\s/(),]+(?:\([^()]*\))+").expect("group split pattern")
});

/// Parses one day-group such as `월(09:00~10:15)(10:30~11:45)`.
///
/// Text that does not have the day + time-block shape, or whose day token is
/// not exactly one of the seven Korean day characters, yields an empty list.
/// Each parenthesized block must be exactly `HH:MM~HH:MM` with valid times of
/// day; a block that is not is dropped without affecting its siblings.
pub fn parse_schedule_group(text: &str) -> Vec<TimeSlot> {
    let Some(caps) = DAY_GROUP_RE.captures(text.trim()) else {
        return Vec::new();
    };

    let Some(day) = day_token(&caps["day"]) else {
        return Vec::new();
    };

    BLOCK_RE
        .captures_iter(&caps["blocks"])
        .filter_map(|block| {
            let times = TIME_BLOCK_RE.captures(block["inner"].trim())?;
            let start = parse_time(&times["start"])?;
            let end = parse_time(&times["end"])?;
            Some(TimeSlot::new(day, start, end))
        })
        .collect()
}

fn day_token(token: &str) -> Option<DayOfWeek> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => DayOfWeek::from_korean(c),
        _ => None,
    }
}

/// Splits a full schedule field (`월(09:30~10:45)/수(09:30~10:45)`) into its
/// day-groups, in order of appearance. A multi-character token such as
/// `화목(..)` stays one group, so it is rejected whole by the group parser.
pub fn split_day_groups(field: &str) -> Vec<&str> {
    GROUP_SPLIT_RE
        .find_iter(field)
        .map(|m| m.as_str())
        .collect()
}

/// Splits and parses a full schedule field.
pub fn parse_schedule_field(field: &str) -> Vec<TimeSlot> {
    split_day_groups(field)
        .into_iter()
        .flat_map(parse_schedule_group)
        .collect()
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M").ok()
}
