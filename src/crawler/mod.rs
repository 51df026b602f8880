pub mod columns;
pub mod reconcile;
pub mod sugang;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::AppError;

pub use reconcile::{
    CanonicalRowPolicy, CrawlContext, ReconcileError, ReconciledBatch, ReconciledLecture,
    reconcile_crawl_rows,
};
pub use sugang::{SugangClient, SugangConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Korean,
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One physical sheet row, cells as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// Column name → column index, built from a header row with trimmed names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex(HashMap<String, usize>);

impl ColumnIndex {
    pub fn from_header(header: &RawRow) -> Self {
        Self(
            header
                .cells
                .iter()
                .enumerate()
                .map(|(i, name)| (name.trim().to_string(), i))
                .filter(|(name, _)| !name.is_empty())
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.0.get(column).copied()
    }
}

/// Everything one crawl fetched for a (year, semester).
#[derive(Debug, Clone, Default)]
pub struct CrawlSheets {
    pub header: ColumnIndex,
    pub korean: Vec<RawRow>,
    pub english: Vec<RawRow>,
}

impl CrawlSheets {
    /// Korean rows first so the Korean sheet supplies canonical rows under
    /// the first-seen policy.
    pub fn rows(&self) -> Vec<&RawRow> {
        self.korean.iter().chain(self.english.iter()).collect()
    }

    /// Maps a position in [`rows`](Self::rows) back to its sheet and its
    /// 0-based data row within that sheet.
    pub fn locate(&self, row: usize) -> Option<(Language, usize)> {
        if row < self.korean.len() {
            Some((Language::Korean, row))
        } else if row < self.korean.len() + self.english.len() {
            Some((Language::English, row - self.korean.len()))
        } else {
            None
        }
    }
}

#[async_trait]
pub trait LectureSource: Send + Sync {
    async fn fetch_sheets(&self, year: i32, semester: &str) -> Result<CrawlSheets, AppError>;
}

/// Serves fixed sheets; used by tests and for replaying a saved crawl.
#[derive(Debug, Clone, Default)]
pub struct StaticLectureSource {
    sheets: CrawlSheets,
}

impl StaticLectureSource {
    pub fn new(sheets: CrawlSheets) -> Self {
        Self { sheets }
    }
}

#[async_trait]
impl LectureSource for StaticLectureSource {
    async fn fetch_sheets(&self, _year: i32, _semester: &str) -> Result<CrawlSheets, AppError> {
        Ok(self.sheets.clone())
    }
}
