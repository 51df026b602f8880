mod common;

use std::sync::Arc;

use sqlx::SqlitePool;
use timetable_backend::error::AppError;
use timetable_backend::models::{NewTimetableRequest, Timetable};
use timetable_backend::services::{CrawlService, TimetableLocks, TimetableService};

use common::*;

async fn setup() -> (SqlitePool, TimetableService) {
    let pool = setup_test_db().await;
    CrawlService::new(pool.clone(), term_source())
        .crawl(2025, "1")
        .await
        .expect("Failed to seed lectures");
    let service = TimetableService::new(pool.clone(), Arc::new(TimetableLocks::default()));
    (pool, service)
}

async fn create(service: &TimetableService, user_id: &str, name: &str) -> Timetable {
    service
        .create(
            user_id,
            NewTimetableRequest {
                year: 2025,
                semester: "1".to_string(),
                name: name.to_string(),
            },
        )
        .await
        .expect("Failed to create timetable")
}

#[tokio::test]
async fn test_overlapping_lecture_is_rejected() {
    let (pool, service) = setup().await;
    let timetable = create(&service, "user-1", "1학기").await;

    service
        .add_lecture("user-1", &timetable.id, &lecture_id(&pool, WRITING).await)
        .await
        .unwrap();
    let err = service
        .add_lecture("user-1", &timetable.id, &lecture_id(&pool, CALCULUS).await)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LectureOverlap(_)));
    let detail = service.detail("user-1", &timetable.id).await.unwrap();
    assert_eq!(detail.lectures.len(), 1);
    assert_eq!(detail.lectures[0].course_title, WRITING);
}

#[tokio::test]
async fn test_touching_lectures_coexist() {
    let (pool, service) = setup().await;
    let timetable = create(&service, "user-1", "1학기").await;

    for title in [WRITING, DATA_STRUCTURES, PHILOSOPHY] {
        service
            .add_lecture("user-1", &timetable.id, &lecture_id(&pool, title).await)
            .await
            .unwrap_or_else(|e| panic!("{} rejected: {}", title, e));
    }

    let detail = service.detail("user-1", &timetable.id).await.unwrap();
    assert_eq!(detail.lectures.len(), 3);
    assert_eq!(detail.total_credit, 9);
}

#[tokio::test]
async fn test_adding_twice_is_already_added() {
    let (pool, service) = setup().await;
    let timetable = create(&service, "user-1", "1학기").await;
    let writing = lecture_id(&pool, WRITING).await;

    service.add_lecture("user-1", &timetable.id, &writing).await.unwrap();
    let err = service.add_lecture("user-1", &timetable.id, &writing).await.unwrap_err();

    assert!(matches!(err, AppError::AlreadyAdded));
}

#[tokio::test]
async fn test_preconditions_are_checked_before_overlap() {
    let (pool, service) = setup().await;
    let timetable = create(&service, "user-1", "1학기").await;
    let writing = lecture_id(&pool, WRITING).await;

    let err = service.add_lecture("user-2", &timetable.id, &writing).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = service.add_lecture("user-1", "missing", &writing).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service.add_lecture("user-1", &timetable.id, "missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_conflicting_adds_admit_one() {
    let (pool, service) = setup().await;
    let timetable = create(&service, "user-1", "1학기").await;
    let locks = Arc::new(TimetableLocks::default());

    let mut handles = Vec::new();
    for title in [WRITING, CALCULUS] {
        let service = TimetableService::new(pool.clone(), locks.clone());
        let timetable_id = timetable.id.clone();
        let lecture = lecture_id(&pool, title).await;
        handles.push(tokio::spawn(async move {
            service.add_lecture("user-1", &timetable_id, &lecture).await
        }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => admitted += 1,
            Err(AppError::LectureOverlap(_)) => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!((admitted, rejected), (1, 1));
    let detail = service.detail("user-1", &timetable.id).await.unwrap();
    assert_eq!(detail.lectures.len(), 1);
}

#[tokio::test]
async fn test_removed_lecture_frees_its_slot() {
    let (pool, service) = setup().await;
    let timetable = create(&service, "user-1", "1학기").await;
    let writing = lecture_id(&pool, WRITING).await;
    let calculus = lecture_id(&pool, CALCULUS).await;

    service.add_lecture("user-1", &timetable.id, &writing).await.unwrap();
    let detail = service.remove_lecture("user-1", &timetable.id, &writing).await.unwrap();
    assert!(detail.lectures.is_empty());

    service.add_lecture("user-1", &timetable.id, &calculus).await.unwrap();

    let err = service.remove_lecture("user-1", &timetable.id, &writing).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_timetable_management() {
    let (_pool, service) = setup().await;
    let spring = create(&service, "user-1", "봄").await;
    create(&service, "user-1", "가을").await;
    create(&service, "user-2", "남의 것").await;

    let names: Vec<String> = service
        .list("user-1")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["가을".to_string(), "봄".to_string()]);

    let renamed = service.rename("user-1", &spring.id, "  최종  ").await.unwrap();
    assert_eq!(renamed.name, "최종");

    let err = service.rename("user-1", &spring.id, "   ").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = service.delete("user-2", &spring.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    service.delete("user-1", &spring.id).await.unwrap();
    let err = service.detail("user-1", &spring.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_create_validates_input() {
    let (_pool, service) = setup().await;

    let err = service
        .create(
            "user-1",
            NewTimetableRequest {
                year: 2025,
                semester: "1".to_string(),
                name: " ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = service
        .create(
            "user-1",
            NewTimetableRequest {
                year: 2025,
                semester: "9".to_string(),
                name: "학기".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
