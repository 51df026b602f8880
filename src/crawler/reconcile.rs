//! Turns raw sheet rows into canonical lectures.
//!
//! Every course offering arrives at least twice (once per language sheet, and
//! once more per extra meeting-time sub-row). Rows are grouped by the composite
//! key `course_number + lecture_number`, one row per group supplies the
//! descriptive fields, and the schedules of every row in the group are unioned.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::columns;
use super::{ColumnIndex, RawRow};
use crate::models::{NewLecture, NewLectureSchedule};
use crate::schedule::{parse_schedule_group, split_day_groups};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("required column '{column}' is missing from the sheet header")]
    MissingColumn { column: &'static str },

    /// `row` is the 0-based position in the row sequence given to
    /// [`reconcile_crawl_rows`], counted across every sheet fed in (for a crawl,
    /// Korean rows then English rows; see `CrawlSheets::locate`).
    #[error("row {row} has no value for required column '{column}'")]
    MissingField { row: usize, column: &'static str },
}

/// Which row of a duplicate group supplies a lecture's descriptive fields.
///
/// Both language sheets describe the same offering, so the choice only
/// matters for language-specific labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CanonicalRowPolicy {
    #[default]
    FirstSeen,
    LastSeen,
}

impl CanonicalRowPolicy {
    fn select<'a>(self, rows: &[(usize, &'a RawRow)]) -> Option<(usize, &'a RawRow)> {
        match self {
            CanonicalRowPolicy::FirstSeen => rows.first().copied(),
            CanonicalRowPolicy::LastSeen => rows.last().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlContext {
    pub year: i32,
    pub semester: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledLecture {
    pub lecture: NewLecture,
    pub schedules: Vec<NewLectureSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledBatch {
    pub lectures: Vec<ReconciledLecture>,
    /// Rows consumed, blank padding rows included.
    pub raw_rows: usize,
    /// Rows with no content at all.
    pub skipped_rows: usize,
}

impl ReconciledBatch {
    pub fn lecture_count(&self) -> usize {
        self.lectures.len()
    }

    pub fn schedule_count(&self) -> usize {
        self.lectures.iter().map(|l| l.schedules.len()).sum()
    }
}

struct Group<'a> {
    rows: Vec<(usize, &'a RawRow)>,
}

/// Reconciles all rows of one crawl.
///
/// Fails as a whole if the header lacks a required column or any non-blank
/// row lacks a required value; nothing from such a batch may be persisted.
pub fn reconcile_crawl_rows<'a, I>(
    context: &CrawlContext,
    header: &ColumnIndex,
    rows: I,
    policy: CanonicalRowPolicy,
) -> Result<ReconciledBatch, ReconcileError>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    for column in columns::REQUIRED {
        if header.get(column).is_none() {
            return Err(ReconcileError::MissingColumn { column });
        }
    }

    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut raw_rows = 0;
    let mut skipped_rows = 0;

    for (row_number, row) in rows.into_iter().enumerate() {
        raw_rows += 1;
        if row.is_blank() {
            skipped_rows += 1;
            continue;
        }

        let fields = RowFields { header, row, row_number };
        let course_number = fields.required(columns::COURSE_NUMBER)?;
        let lecture_number = fields.required(columns::LECTURE_NUMBER)?;
        fields.required(columns::COURSE_TITLE)?;

        // Plain concatenation: `A1`+`23` and `A12`+`3` share a group. Lecture
        // numbers on the site are fixed-width.
        let key = format!("{}{}", course_number, lecture_number);
        let group_index = *index_by_key.entry(key).or_insert_with(|| {
            groups.push(Group { rows: Vec::new() });
            groups.len() - 1
        });
        groups[group_index].rows.push((row_number, row));
    }

    let mut lectures = Vec::with_capacity(groups.len());
    for group in &groups {
        let Some((row_number, canonical)) = policy.select(&group.rows) else {
            continue;
        };
        let fields = RowFields { header, row: canonical, row_number };
        let lecture = build_lecture(context, &fields)?;

        let mut schedules: Vec<NewLectureSchedule> = Vec::new();
        for &(row_number, row) in &group.rows {
            let fields = RowFields { header, row, row_number };
            for schedule in row_schedules(&fields) {
                if !schedules.contains(&schedule) {
                    schedules.push(schedule);
                }
            }
        }

        lectures.push(ReconciledLecture { lecture, schedules });
    }

    debug!(
        "reconciled {} rows ({} blank) into {} lectures",
        raw_rows,
        skipped_rows,
        lectures.len()
    );

    Ok(ReconciledBatch {
        lectures,
        raw_rows,
        skipped_rows,
    })
}

struct RowFields<'a> {
    header: &'a ColumnIndex,
    row: &'a RawRow,
    row_number: usize,
}

impl<'a> RowFields<'a> {
    fn text(&self, column: &str) -> Option<&'a str> {
        self.header
            .get(column)
            .and_then(|i| self.row.cell(i))
            .map(str::trim)
    }

    fn optional(&self, column: &str) -> Option<String> {
        self.text(column)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn required(&self, column: &'static str) -> Result<&'a str, ReconcileError> {
        self.text(column)
            .filter(|s| !s.is_empty())
            .ok_or(ReconcileError::MissingField {
                row: self.row_number,
                column,
            })
    }
}

fn build_lecture(context: &CrawlContext, fields: &RowFields<'_>) -> Result<NewLecture, ReconcileError> {
    let college = fields.optional(columns::COLLEGE);
    let department = fields
        .optional(columns::DEPARTMENT)
        .filter(|d| d != columns::NULL_PLACEHOLDER)
        .or_else(|| college.clone());

    let academic_course = fields.optional(columns::ACADEMIC_COURSE);
    // Non-bachelor courses carry their course label in the year column.
    let academic_year = if academic_course.as_deref() == Some(columns::BACHELOR) {
        fields.optional(columns::ACADEMIC_YEAR)
    } else {
        academic_course.clone()
    };

    Ok(NewLecture {
        year: context.year,
        semester: context.semester.clone(),
        course_number: fields.required(columns::COURSE_NUMBER)?.to_string(),
        lecture_number: fields.required(columns::LECTURE_NUMBER)?.to_string(),
        course_title: fields.required(columns::COURSE_TITLE)?.to_string(),
        course_subtitle: fields.optional(columns::COURSE_SUBTITLE),
        credit: parse_credit(fields.text(columns::CREDIT).unwrap_or_default()),
        instructor: fields.optional(columns::INSTRUCTOR).unwrap_or_default(),
        category: fields.optional(columns::CATEGORY),
        college,
        department,
        academic_course,
        academic_year,
    })
}

fn row_schedules(fields: &RowFields<'_>) -> Vec<NewLectureSchedule> {
    let class_time = fields.text(columns::CLASS_TIME).unwrap_or_default();
    let groups = split_day_groups(class_time);
    if groups.is_empty() {
        return Vec::new();
    }

    let place_text = fields.text(columns::PLACE).unwrap_or_default();
    let places: Vec<&str> = place_text.split('/').map(str::trim).collect();
    let place_for = |group_index: usize| -> Option<String> {
        let place = if places.len() == groups.len() {
            places[group_index]
        } else {
            place_text
        };
        Some(place.to_string()).filter(|p| !p.is_empty())
    };

    let mut schedules = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        let slots = parse_schedule_group(group);
        if slots.is_empty() {
            debug!("row {}: no meeting parsed from '{}'", fields.row_number, group);
        }
        schedules.extend(slots.into_iter().map(|slot| NewLectureSchedule {
            slot,
            place: place_for(i),
        }));
    }
    schedules
}

fn parse_credit(text: &str) -> i32 {
    let text = text.trim();
    text.parse::<i32>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(|f| f as i32))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::schedule::{DayOfWeek, TimeSlot};

    const HEADER: [&str; 13] = [
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

    fn header() -> ColumnIndex {
        ColumnIndex::from_header(&RawRow::new(HEADER))
    }

    fn context() -> CrawlContext {
        CrawlContext {
            year: 2025,
            semester: "1".to_string(),
        }
    }

    struct Row {
        course_number: &'static str,
        lecture_number: &'static str,
        title: &'static str,
        class_time: &'static str,
        place: &'static str,
        department: &'static str,
        academic_course: &'static str,
        academic_year: &'static str,
    }

    impl Default for Row {
        fn default() -> Self {
            Self {
                course_number: "M1522.000600",
                lecture_number: "001",
                title: "컴퓨터구조",
                class_time: "월(09:30~10:45)/수(09:30~10:45)",
                place: "301-101/301-101",
                department: "컴퓨터공학부",
                academic_course: "학사",
                academic_year: "3학년",
            }
        }
    }

    impl Row {
        fn build(&self) -> RawRow {
            RawRow::new([
                "전선",
                "공과대학",
                self.department,
                self.academic_course,
                self.academic_year,
                self.course_number,
                self.lecture_number,
                self.title,
                "",
                "3",
                self.class_time,
                self.place,
                "김교수",
            ])
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn reconcile(rows: &[RawRow]) -> Result<ReconciledBatch, ReconcileError> {
        reconcile_crawl_rows(&context(), &header(), rows, CanonicalRowPolicy::default())
    }

    #[test]
    fn language_pair_collapses_into_one_lecture() {
        let korean = Row::default().build();
        let english = Row {
            title: "Computer Architecture",
            class_time: "Mon(09:30~10:45)/Wed(09:30~10:45)",
            ..Row::default()
        }
        .build();

        let batch = reconcile(&[korean, english]).unwrap();
        assert_eq!(batch.lecture_count(), 1);
        let lecture = &batch.lectures[0];
        assert_eq!(lecture.lecture.course_title, "컴퓨터구조");
        assert_eq!(lecture.lecture.credit, 3);
        assert_eq!(lecture.schedules.len(), 2);
        assert_eq!(lecture.schedules[0].slot, TimeSlot::new(DayOfWeek::Monday, t(9, 30), t(10, 45)));
        assert_eq!(lecture.schedules[0].place.as_deref(), Some("301-101"));
    }

    #[test]
    fn schedules_are_unioned_across_group_rows() {
        let first = Row {
            class_time: "화(11:00~12:15)",
            place: "302-208",
            ..Row::default()
        }
        .build();
        let second = Row {
            class_time: "목(11:00~12:15)",
            place: "302-208",
            ..Row::default()
        }
        .build();
        let duplicate = Row {
            class_time: "화(11:00~12:15)",
            place: "302-208",
            ..Row::default()
        }
        .build();

        let batch = reconcile(&[first, second, duplicate]).unwrap();
        assert_eq!(batch.lecture_count(), 1);
        let days: Vec<DayOfWeek> = batch.lectures[0].schedules.iter().map(|s| s.slot.day).collect();
        assert_eq!(days, vec![DayOfWeek::Tuesday, DayOfWeek::Thursday]);
    }

    #[test]
    fn twenty_five_pairs_yield_twenty_five_lectures() {
        let lecture_number_column = header().get(columns::LECTURE_NUMBER).unwrap();
        let mut rows = Vec::new();
        for i in 1..=25 {
            let mut korean = Row::default().build();
            let mut english = Row { title: "Computer Architecture", ..Row::default() }.build();
            korean.cells[lecture_number_column] = format!("{:03}", i);
            english.cells[lecture_number_column] = format!("{:03}", i);
            rows.push(korean);
            rows.push(english);
        }

        let batch = reconcile(&rows).unwrap();
        assert_eq!(batch.raw_rows, 50);
        assert_eq!(batch.lecture_count(), 25);
        assert_eq!(batch.schedule_count(), 50);
    }

    #[test]
    fn key_is_trimmed_before_grouping() {
        let a = Row::default().build();
        let b = Row {
            course_number: "  M1522.000600 ",
            lecture_number: "001  ",
            ..Row::default()
        }
        .build();

        let batch = reconcile(&[a, b]).unwrap();
        assert_eq!(batch.lecture_count(), 1);
        assert_eq!(batch.lectures[0].lecture.course_number, "M1522.000600");
    }

    #[test]
    fn missing_course_number_aborts_whole_batch() {
        let good = Row::default().build();
        let bad = Row { course_number: "", ..Row::default() }.build();

        let err = reconcile(&[good, bad]).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::MissingField {
                row: 1,
                column: columns::COURSE_NUMBER
            }
        );
    }

    #[test]
    fn short_row_counts_as_missing_field() {
        let short = RawRow::new(["전선", "공과대학"]);
        let err = reconcile(&[short]).unwrap_err();
        assert!(matches!(err, ReconcileError::MissingField { row: 0, .. }));
    }

    #[test]
    fn missing_header_column_aborts() {
        let header = ColumnIndex::from_header(&RawRow::new([columns::COURSE_NUMBER, columns::COURSE_TITLE]));
        let err = reconcile_crawl_rows(&context(), &header, &[] as &[RawRow], CanonicalRowPolicy::FirstSeen)
            .unwrap_err();
        assert_eq!(err, ReconcileError::MissingColumn { column: columns::LECTURE_NUMBER });
    }

    #[test]
    fn blank_rows_are_skipped() {
        let rows = [Row::default().build(), RawRow::new(["", "  ", ""])];
        let batch = reconcile(&rows).unwrap();
        assert_eq!(batch.skipped_rows, 1);
        assert_eq!(batch.lecture_count(), 1);
    }

    #[test]
    fn department_falls_back_to_college() {
        for department in ["", "null", "  "] {
            let batch = reconcile(&[Row { department, ..Row::default() }.build()]).unwrap();
            assert_eq!(batch.lectures[0].lecture.department.as_deref(), Some("공과대학"));
        }
    }

    #[test]
    fn non_bachelor_course_replaces_academic_year() {
        let master = Row {
            academic_course: "석사",
            academic_year: "1학년",
            ..Row::default()
        }
        .build();
        let bachelor = Row {
            lecture_number: "002",
            ..Row::default()
        }
        .build();

        let batch = reconcile(&[master, bachelor]).unwrap();
        assert_eq!(batch.lectures[0].lecture.academic_year.as_deref(), Some("석사"));
        assert_eq!(batch.lectures[1].lecture.academic_year.as_deref(), Some("3학년"));
    }

    #[test]
    fn last_seen_policy_picks_later_row() {
        let korean = Row::default().build();
        let english = Row { title: "Computer Architecture", ..Row::default() }.build();
        let batch = reconcile_crawl_rows(&context(), &header(), &[korean, english], CanonicalRowPolicy::LastSeen)
            .unwrap();
        assert_eq!(batch.lectures[0].lecture.course_title, "Computer Architecture");
    }

    #[test]
    fn grouping_key_is_plain_concatenation() {
        let a = Row { course_number: "A1", lecture_number: "23", ..Row::default() }.build();
        let b = Row {
            course_number: "A12",
            lecture_number: "3",
            title: "다른 강좌",
            ..Row::default()
        }
        .build();

        let batch = reconcile(&[a, b]).unwrap();
        assert_eq!(batch.lecture_count(), 1);
        assert_eq!(batch.lectures[0].lecture.course_number, "A1");
    }

    #[test]
    fn missing_field_row_counts_across_all_rows() {
        let rows = [
            Row::default().build(),
            Row { lecture_number: "002", ..Row::default() }.build(),
            Row { title: "", ..Row::default() }.build(),
        ];
        let err = reconcile(&rows).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::MissingField {
                row: 2,
                column: columns::COURSE_TITLE
            }
        );
    }

    #[test]
    fn multi_day_token_adds_no_meeting() {
        let row = Row {
            class_time: "화목(10:00~11:00)/금(13:00~14:15)",
            place: "",
            ..Row::default()
        }
        .build();
        let batch = reconcile(&[row]).unwrap();
        let days: Vec<DayOfWeek> = batch.lectures[0].schedules.iter().map(|s| s.slot.day).collect();
        assert_eq!(days, vec![DayOfWeek::Friday]);
    }

    #[test]
    fn malformed_blocks_do_not_abort() {
        let row = Row {
            class_time: "월(9:30~10:45)/X(09:30~10:45)/금(13:00~14:15)",
            place: "",
            ..Row::default()
        }
        .build();
        let batch = reconcile(&[row]).unwrap();
        let schedules = &batch.lectures[0].schedules;
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].slot.day, DayOfWeek::Friday);
        assert_eq!(schedules[0].place, None);
    }

    #[test]
    fn unpaired_place_text_applies_to_every_group() {
        let row = Row {
            class_time: "월(09:30~10:45)/수(09:30~10:45)",
            place: "#220-101",
            ..Row::default()
        }
        .build();
        let batch = reconcile(&[row]).unwrap();
        assert!(batch.lectures[0]
            .schedules
            .iter()
            .all(|s| s.place.as_deref() == Some("#220-101")));
    }

    #[test]
    fn credit_parsing() {
        assert_eq!(parse_credit("3"), 3);
        assert_eq!(parse_credit(" 2.0 "), 2);
        assert_eq!(parse_credit(""), 0);
        assert_eq!(parse_credit("n/a"), 0);
    }

    #[test]
    fn batch_counts_lectures_and_schedules() {
        let rows = [
            Row::default().build(),
            Row { lecture_number: "002", class_time: "금(15:30~16:45)", place: "", ..Row::default() }.build(),
        ];
        let batch = reconcile(&rows).unwrap();
        assert_eq!(batch.lecture_count(), 2);
        assert_eq!(batch.lectures[0].schedules.len(), 2);
        assert_eq!(batch.schedule_count(), 3);
    }
}
