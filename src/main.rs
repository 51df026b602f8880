use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable_backend::api::router;
use timetable_backend::config::AppConfig;
use timetable_backend::crawler::{LectureSource, SugangClient};
use timetable_backend::db;
use timetable_backend::services::CrawlScheduler;
use timetable_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timetable_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url, 5).await?;

    let source: Arc<dyn LectureSource> = Arc::new(SugangClient::new(config.sugang.clone())?);
    let state = AppState::new(pool.clone(), source.clone());

    if let Some(crawl) = config.crawl {
        let scheduler = CrawlScheduler::new(pool, source, crawl.year, crawl.semester, crawl.interval_secs);
        tokio::spawn(scheduler.start());
    }

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
