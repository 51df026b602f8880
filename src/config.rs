use std::net::SocketAddr;
use std::time::Duration;

use crate::crawler::SugangConfig;
use crate::error::AppError;
use crate::services::parse_semester_param;

const DEFAULT_DATABASE_URL: &str = "sqlite://timetable.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_SUGANG_BASE_URL: &str = "https://sugang.snu.ac.kr";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub sugang: SugangConfig,
    pub crawl: Option<CrawlSchedule>,
}

/// Term re-crawled by the background scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSchedule {
    pub interval_secs: u64,
    pub year: i32,
    pub semester: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR: {}", e)))?;

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(v) => parse_secs("HTTP_TIMEOUT_SECS", &v)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let sugang = SugangConfig {
            base_url: get("SUGANG_BASE_URL").unwrap_or_else(|| DEFAULT_SUGANG_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let crawl = match (get("CRAWL_INTERVAL_SECS"), get("CRAWL_TARGET")) {
            (None, None) => None,
            (Some(interval), Some(target)) => {
                let interval_secs = parse_secs("CRAWL_INTERVAL_SECS", &interval)?;
                let (year, semester) = parse_semester_param(&target)
                    .map_err(|_| AppError::Config(format!("CRAWL_TARGET: expected YYYY-S, got '{}'", target)))?;
                Some(CrawlSchedule {
                    interval_secs,
                    year,
                    semester,
                })
            }
            _ => {
                return Err(AppError::Config(
                    "CRAWL_INTERVAL_SECS and CRAWL_TARGET must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            database_url,
            bind_addr,
            sugang,
            crawl,
        })
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, AppError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::Config(format!("{}: expected a positive number of seconds, got '{}'", key, value))),
    }
}
