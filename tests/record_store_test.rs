use std::sync::Arc;

use chrono::Utc;

use ecoreport::application::services::RecordService;
use ecoreport::domain::PollutionRecord;
use ecoreport::infrastructure::persistence::{SqliteRecordRepository, repository_for_url};

fn sample_record(pollution_type: &str, severity: &str) -> PollutionRecord {
    PollutionRecord {
        transcription: format!("report about {}", pollution_type),
        recognition_service: "Google Speech Recognition".to_string(),
        latitude: Some(40.7128),
        longitude: Some(-74.0060),
        address: Some("New York, NY, USA".to_string()),
        pollution_type: pollution_type.to_string(),
        recommendation: "Contact authorities.".to_string(),
        responsible_agency: "Environmental Protection Agency (EPA)".to_string(),
        severity_level: severity.to_string(),
        immediate_actions: "Secure the area.".to_string(),
        long_term_solution: "Monitoring.".to_string(),
        raw_response: serde_json::json!({"text": "model output"}),
        created_at: Utc::now(),
    }
}

struct TestStore {
    // Holds the database file alive for the duration of the test.
    _dir: tempfile::TempDir,
    service: RecordService,
}

async fn test_store() -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("records.db").display());
    let repository = repository_for_url(&url).unwrap();
    repository.init_schema().await.unwrap();

    TestStore {
        _dir: dir,
        service: RecordService::new(repository),
    }
}

#[tokio::test]
async fn given_inserted_record_when_asking_for_recent_then_row_is_returned() {
    let store = test_store().await;
    let id = store.service.add(&sample_record("water pollution", "high")).await.unwrap();
    assert!(id > 0);

    let outcome = store.service.query("show me recent reports").await;

    assert!(outcome.sql_query.contains("ORDER BY created_at DESC LIMIT 10"));
    assert_eq!(outcome.result.len(), 1);
    assert_eq!(
        outcome.result[0]["transcription"],
        serde_json::json!("report about water pollution")
    );
    assert_eq!(outcome.result[0]["severity_level"], serde_json::json!("high"));
}

#[tokio::test]
async fn given_count_question_when_querying_then_aggregate_columns_present() {
    let store = test_store().await;
    store.service.add(&sample_record("air pollution", "low")).await.unwrap();
    store.service.add(&sample_record("oil spill", "critical")).await.unwrap();

    let outcome = store.service.query("what is the total number of reports?").await;

    assert_eq!(outcome.result.len(), 1);
    let row = &outcome.result[0];
    assert_eq!(row["total_records"], serde_json::json!(2));
    assert_eq!(row["unique_pollution_types"], serde_json::json!(2));
    assert_eq!(row["records_with_location"], serde_json::json!(2));
}

#[tokio::test]
async fn given_type_question_when_querying_then_severity_average_is_numeric() {
    let store = test_store().await;
    store.service.add(&sample_record("water pollution", "low")).await.unwrap();
    store.service.add(&sample_record("water pollution", "high")).await.unwrap();

    let outcome = store.service.query("break it down by pollution type").await;

    assert_eq!(outcome.result.len(), 1);
    let row = &outcome.result[0];
    assert_eq!(row["pollution_type"], serde_json::json!("water pollution"));
    assert_eq!(row["count"], serde_json::json!(2));
    // low=1 and high=3 average to 2.0
    assert_eq!(row["avg_severity"].as_f64(), Some(2.0));
}

#[tokio::test]
async fn given_one_record_per_severity_when_querying_by_type_then_average_is_midpoint() {
    let store = test_store().await;
    for severity in ["low", "medium", "high", "critical"] {
        store.service.add(&sample_record("air pollution", severity)).await.unwrap();
    }

    let outcome = store.service.query("break it down by pollution type").await;

    assert_eq!(outcome.result.len(), 1);
    let row = &outcome.result[0];
    assert_eq!(row["count"], serde_json::json!(4));
    // (1 + 2 + 3 + 4) / 4
    assert_eq!(row["avg_severity"].as_f64(), Some(2.5));
}

#[tokio::test]
async fn given_severity_question_when_querying_then_only_severe_rows_match() {
    let store = test_store().await;
    store.service.add(&sample_record("noise pollution", "low")).await.unwrap();
    store.service.add(&sample_record("chemical spill", "critical")).await.unwrap();

    let outcome = store.service.query("which reports are severe?").await;

    assert_eq!(outcome.result.len(), 1);
    assert_eq!(outcome.result[0]["pollution_type"], serde_json::json!("chemical spill"));
}

#[tokio::test]
async fn given_unmatched_question_when_querying_then_default_summary_applies() {
    let store = test_store().await;
    store.service.add(&sample_record("plastic pollution", "medium")).await.unwrap();

    let outcome = store.service.query("tell me something interesting").await;

    assert!(outcome.sql_query.contains("LIMIT 50"));
    assert_eq!(outcome.result.len(), 1);
}

#[tokio::test]
async fn given_competing_triggers_when_querying_then_first_template_wins() {
    let store = test_store().await;

    // "recent" precedes "count" in the template table.
    let outcome = store.service.query("count of recent reports").await;

    assert!(outcome.sql_query.contains("LIMIT 10"));
}

#[tokio::test]
async fn given_broken_store_when_querying_then_error_string_and_empty_rows() {
    // Schema never initialized, so the SELECT fails.
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("empty.db").display());
    let service = RecordService::new(Arc::new(SqliteRecordRepository::new(url)));

    let outcome = service.query("recent").await;

    assert!(outcome.sql_query.starts_with("ERROR:"));
    assert!(outcome.result.is_empty());
}

#[tokio::test]
async fn given_records_when_computing_statistics_then_counts_line_up() {
    let store = test_store().await;
    store.service.add(&sample_record("air pollution", "low")).await.unwrap();
    store.service.add(&sample_record("air pollution", "high")).await.unwrap();

    let mut third = sample_record("oil spill", "critical");
    third.latitude = None;
    third.longitude = None;
    store.service.add(&third).await.unwrap();

    let stats = store.service.get_statistics().await.unwrap();

    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.records_with_location, 2);
    assert_eq!(stats.recent_activity, 3);
    assert_eq!(stats.pollution_types[0].pollution_type, "air pollution");
    assert_eq!(stats.pollution_types[0].count, 2);
}

#[tokio::test]
async fn given_cleanup_with_zero_days_when_running_then_existing_rows_removed() {
    let store = test_store().await;
    store.service.add(&sample_record("waste dumping", "medium")).await.unwrap();

    let removed = store.service.cleanup_old_records(0).await.unwrap();

    assert_eq!(removed, 1);
    let outcome = store.service.query("recent").await;
    assert!(outcome.result.is_empty());
}

#[tokio::test]
async fn given_unknown_scheme_when_selecting_backend_then_error() {
    assert!(repository_for_url("mysql://localhost/db").is_err());
}
