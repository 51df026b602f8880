use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use calamine::{Reader, open_workbook_auto_from_rs};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER, SET_COOKIE};
use tracing::info;

use super::{ColumnIndex, CrawlSheets, Language, LectureSource, RawRow};
use crate::error::AppError;

const SEARCH_PAGE_PATH: &str = "/sugang/cc/cc100InterfaceSrch.action";
const EXCEL_DOWNLOAD_PATH: &str = "/sugang/cc/cc100InterfaceExcel.action";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Absolute row of the header in the downloaded sheet; data follows it.
const HEADER_ROW: usize = 2;

const SEARCH_PARAMS: &[(&str, &str)] = &[
    ("seeMore", "더보기"),
    ("srchBdNo", ""),
    ("srchCamp", ""),
    ("srchOpenSbjtFldCd", ""),
    ("srchCptnCorsFg", ""),
    ("srchCurrPage", "1"),
    ("srchExcept", ""),
    ("srchGenrlRemoteLtYn", ""),
    ("srchIsEngSbjt", ""),
    ("srchIsPendingCourse", ""),
    ("srchLsnProgType", ""),
    ("srchMrksApprMthdChgPosbYn", ""),
    ("srchMrksGvMthd", ""),
    ("srchOpenUpDeptCd", ""),
    ("srchOpenMjCd", ""),
    ("srchOpenPntMax", ""),
    ("srchOpenPntMin", ""),
    ("srchOpenSbjtDayNm", ""),
    ("srchOpenSbjtNm", ""),
    ("srchOpenSbjtTm", ""),
    ("srchOpenSbjtTmNm", ""),
    ("srchOpenShyr", ""),
    ("srchOpenSubmattCorsFg", ""),
    ("srchOpenSubmattFgCd1", ""),
    ("srchOpenSubmattFgCd2", ""),
    ("srchOpenSubmattFgCd3", ""),
    ("srchOpenSubmattFgCd4", ""),
    ("srchOpenSubmattFgCd5", ""),
    ("srchOpenSubmattFgCd6", ""),
    ("srchOpenSubmattFgCd7", ""),
    ("srchOpenSubmattFgCd8", ""),
    ("srchOpenSubmattFgCd9", ""),
    ("srchOpenDeptCd", ""),
    ("srchOpenUpSbjtFldCd", ""),
    ("srchPageSize", "9999"),
    ("srchProfNm", ""),
    ("srchSbjtCd", ""),
    ("srchSbjtNm", ""),
    ("srchTlsnAplyCapaCntMax", ""),
    ("srchTlsnAplyCapaCntMin", ""),
    ("srchTlsnRcntMax", ""),
    ("srchTlsnRcntMin", ""),
    ("workType", "EX"),
];

#[derive(Clone, Debug)]
pub struct SugangConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Client for the course registration site's lecture sheet download.
pub struct SugangClient {
    client: Client,
    config: SugangConfig,
}

impl SugangClient {
    pub fn new(config: SugangConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Opens a search session and returns the `name=value` cookie pairs the
    /// download endpoint expects back.
    pub async fn establish_session(&self) -> Result<Vec<String>, AppError> {
        let response = self
            .client
            .get(self.url(SEARCH_PAGE_PATH))
            .send()
            .await?
            .error_for_status()?;

        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .map(|pair| pair.trim().to_string())
            .filter(|pair| !pair.is_empty())
            .collect();
        Ok(cookies)
    }

    pub async fn download_sheet(
        &self,
        year: i32,
        semester: &str,
        language: Language,
        cookies: &[String],
    ) -> Result<Vec<u8>, AppError> {
        let term = semester_search_code(semester).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown semester: {}", semester))
        })?;

        let year = year.to_string();
        let mut form: Vec<(&str, &str)> = SEARCH_PARAMS.to_vec();
        form.push(("srchLanguage", language.code()));
        form.push(("srchOpenSchyy", year.as_str()));
        form.push(("srchOpenShtm", term));

        info!("Downloading {} lecture sheet for {}-{}", language, year, semester);
        let response = self
            .client
            .post(self.url(EXCEL_DOWNLOAD_PATH))
            .header(REFERER, self.url(SEARCH_PAGE_PATH))
            .header(ORIGIN, self.config.base_url.trim_end_matches('/'))
            .header(ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7")
            .header(COOKIE, cookies.join("; "))
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl LectureSource for SugangClient {
    async fn fetch_sheets(&self, year: i32, semester: &str) -> Result<CrawlSheets, AppError> {
        let cookies = self.establish_session().await?;

        let (korean, english) = tokio::try_join!(
            self.download_sheet(year, semester, Language::Korean, &cookies),
            self.download_sheet(year, semester, Language::English, &cookies),
        )?;

        let (header, korean) = decode_sheet(korean)?;
        let (_, english) = decode_sheet(english)?;
        info!(
            "Fetched {} korean rows and {} english rows",
            korean.len(),
            english.len()
        );

        Ok(CrawlSheets {
            header: ColumnIndex::from_header(&header),
            korean,
            english,
        })
    }
}

/// Search code the site uses for each term: 1 spring, 2 summer, 3 fall, 4 winter.
pub fn semester_search_code(semester: &str) -> Option<&'static str> {
    match semester {
        "1" => Some("U000200001U000300001"),
        "2" => Some("U000200001U000300002"),
        "3" => Some("U000200002U000300001"),
        "4" => Some("U000200002U000300002"),
        _ => None,
    }
}

/// Reads the first worksheet of a downloaded workbook into its header row and
/// data rows. Cells are padded so column positions stay absolute.
pub fn decode_sheet(bytes: Vec<u8>) -> Result<(RawRow, Vec<RawRow>), AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Workbook("workbook has no worksheet".to_string()))?
        .map_err(|e| AppError::Workbook(e.to_string()))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let start_row = start_row as usize;
    if start_row > HEADER_ROW {
        return Err(AppError::Workbook("header row is missing".to_string()));
    }

    let mut header = RawRow::default();
    let mut rows = Vec::new();
    for (i, cells) in range.rows().enumerate() {
        let row = RawRow::new(
            std::iter::repeat_n(String::new(), start_col as usize)
                .chain(cells.iter().map(|cell| cell.to_string())),
        );
        match start_row + i {
            HEADER_ROW => header = row,
            n if n > HEADER_ROW => rows.push(row),
            _ => {}
        }
    }

    Ok((header, rows))
}
