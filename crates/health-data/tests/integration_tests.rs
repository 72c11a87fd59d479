//! Integration tests for the dataset engine.
//!
//! These tests drive the service end to end over the fixture files: upload,
//! profile, clean, chart, export and AI narration against a stub provider.

use health_data::ai::AIProvider;
use health_data::{
    Aggregation, ChartData, ChartRequest, CleaningConfig, CleaningRequest, ColumnType,
    DatasetError, DatasetService, DatasetStore, InMemoryStore, MissingValueStrategy, ServiceConfig, Value,
    charts,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(filename: &str) -> Vec<u8> {
    std::fs::read(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn upload(service: &DatasetService, filename: &str) -> String {
    service
        .upload(&read_fixture(filename), filename, None)
        .expect("Upload should succeed")
        .id
}

struct RecordingProvider {
    prompts: Mutex<Vec<String>>,
}

impl AIProvider for RecordingProvider {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok("Cholesterol is highest among asymptomatic patients.".to_string())
    }

    fn name(&self) -> &str {
        "Recording"
    }
}

// ============================================================================
// Ingestion and Profiling
// ============================================================================

#[test]
fn test_csv_upload_profile() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");
    let metadata = service.metadata(&id).unwrap();

    assert_eq!(metadata.name, "heart");
    assert_eq!(metadata.row_count, 11);
    assert_eq!(metadata.column_types["age"], ColumnType::Numeric);
    assert_eq!(metadata.column_types["sex"], ColumnType::String);
    assert_eq!(metadata.column_types["visit_date"], ColumnType::Date);

    let age = metadata.summary["age"].as_numeric().unwrap();
    assert_eq!(age.count, 11);
    assert_eq!(age.min, 37.0);
    assert_eq!(age.max, 63.0);
    assert_eq!(age.median, 56.0);
    assert_eq!(age.q1, 41.0);
    assert_eq!(age.q3, 57.0);

    assert_eq!(metadata.summary["trestbps"].missing_count(), 1);
    assert_eq!(metadata.summary["chol"].missing_count(), 1);

    let sex = metadata.summary["sex"].as_categorical().unwrap();
    assert_eq!(sex.mode.as_deref(), Some("M"));
    assert_eq!(sex.mode_frequency, 8);
    assert_eq!(sex.unique_count, 2);
}

#[test]
fn test_delimited_text_upload() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "vitals.data");
    let rows = service.store().rows(&id).unwrap();

    // blank line skipped, ragged last line dropped
    assert_eq!(rows.len(), 3);
    let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(columns, vec!["Column1", "Column2", "Column3", "Column4"]);
    assert_eq!(rows[2]["Column4"], Value::Number(204.0));
}

#[test]
fn test_strict_parsing_rejects_ragged_row() {
    let config = ServiceConfig {
        strict_parsing: true,
        ..ServiceConfig::default()
    };
    let service = DatasetService::new(InMemoryStore::new(), config).unwrap();

    let err = service
        .upload(&read_fixture("vitals.data"), "vitals.data", None)
        .unwrap_err();
    assert_eq!(err.error_code(), "MALFORMED_ROW");
    assert!(err.to_string().contains("Line 5"));
}

#[test]
fn test_csv_upload_tolerates_late_text_and_ragged_rows() {
    let mut csv = String::from("id,hr\n");
    for i in 0..150 {
        csv.push_str(&format!("{},{}\n", i, 70 + i % 20));
    }
    csv.push_str("150,n/a\n151,72,extra\n");

    let service = DatasetService::in_memory();
    let metadata = service.upload(csv.as_bytes(), "monitor.csv", None).unwrap();
    assert_eq!(metadata.row_count, 151);
    let hr = metadata.summary["hr"].as_numeric().unwrap();
    assert_eq!(hr.count, 151);
    assert_eq!(hr.max, 89.0);

    let strict = DatasetService::new(
        InMemoryStore::new(),
        ServiceConfig {
            strict_parsing: true,
            ..ServiceConfig::default()
        },
    )
    .unwrap();
    let err = strict.upload(csv.as_bytes(), "monitor.csv", None).unwrap_err();
    assert_eq!(err.error_code(), "MALFORMED_ROW");
    assert!(err.to_string().contains("Line 153"));
}

#[test]
fn test_listing_drops_categories() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let listed = service.list();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].summary["sex"].as_categorical().unwrap().categories.is_empty());

    let full = service.metadata(&id).unwrap();
    assert_eq!(full.summary["sex"].as_categorical().unwrap().categories["F"], 3);
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_clean_duplicates_then_remove_missing() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let config = CleaningConfig::builder()
        .remove_duplicates(true)
        .missing_values(MissingValueStrategy::Remove)
        .build()
        .unwrap();
    let outcome = service.clean(&id, &config).unwrap();

    assert_eq!(outcome.rows_before, 11);
    assert_eq!(outcome.rows_after, 8);
    assert_eq!(outcome.actions.len(), 2);
    assert_eq!(service.metadata(&id).unwrap().row_count, 8);
    assert_eq!(service.statistics(&id).unwrap()["chol"].missing_count(), 0);
}

#[test]
fn test_clean_median_imputation() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let request: CleaningRequest = serde_json::from_value(serde_json::json!({
        "operations": ["remove_duplicates", "handle_missing_values"],
        "missingValueStrategy": "median"
    }))
    .unwrap();
    service.clean_request(&id, &request).unwrap();

    let rows = service.store().rows(&id).unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[4]["trestbps"], Value::Number(140.0));
    assert_eq!(rows[6]["chol"], Value::Number(233.0));
}

#[test]
fn test_clean_standardize_column() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let config = CleaningConfig::builder()
        .standardize(["age"])
        .build()
        .unwrap();
    service.clean(&id, &config).unwrap();

    let age = service.statistics(&id).unwrap()["age"].as_numeric().unwrap().clone();
    assert!(age.mean.abs() < 1e-9);
    assert!((age.std_dev - 1.0).abs() < 1e-9);
}

#[test]
fn test_clean_request_without_strategy_defaults_to_remove() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let request = CleaningRequest {
        operations: vec!["handle_missing_values".to_string(), "shuffle".to_string()],
        missing_value_strategy: None,
        columns_to_standardize: None,
    };
    let outcome = service.clean_request(&id, &request).unwrap();
    assert_eq!(outcome.rows_after, 9);
}

// ============================================================================
// Charts
// ============================================================================

#[test]
fn test_bar_chart_count_by_sex() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let request = ChartRequest::Bar {
        category_field: "sex".to_string(),
        value_field: "trestbps".to_string(),
        aggregation: Aggregation::Count,
    };
    let Ok(ChartData::Bar(chart)) = service.chart(&id, &request).unwrap() else {
        panic!("expected a bar chart");
    };

    let points: Vec<(String, f64)> = chart.data.into_iter().map(|p| (p.category, p.value)).collect();
    assert_eq!(points, vec![("M".to_string(), 8.0), ("F".to_string(), 2.0)]);
    assert_eq!(chart.y_axis, "count of trestbps");
}

#[test]
fn test_line_chart_orders_by_date() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let request: ChartRequest = serde_json::from_value(serde_json::json!({
        "chartType": "line",
        "timeField": "visit_date",
        "valueFields": ["chol"]
    }))
    .unwrap();
    let json = charts::chart_json(&service.chart(&id, &request).unwrap()).unwrap();

    let periods = json["data"].as_array().unwrap();
    assert_eq!(periods.len(), 10);
    assert_eq!(periods[0]["timePeriod"], "2024-01-05");
    assert_eq!(periods[1]["timePeriod"], "2024-01-12");
    assert_eq!(periods[1]["chol"], 250.0);
    assert_eq!(periods[9]["timePeriod"], "2024-05-20");
}

#[test]
fn test_pie_chart_percentages() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let request = ChartRequest::Pie {
        category_field: "cp".to_string(),
        value_field: "target".to_string(),
    };
    let Ok(ChartData::Pie(chart)) = service.chart(&id, &request).unwrap() else {
        panic!("expected a pie chart");
    };

    assert_eq!(chart.total, 6.0);
    let percentages: f64 = chart.data.iter().map(|s| s.percentage).sum();
    assert!((percentages - 100.0).abs() < 1e-9);
}

#[test]
fn test_invalid_chart_parameters() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let request = ChartRequest::Heatmap {
        row_field: "sex".to_string(),
        column_field: String::new(),
        value_field: "chol".to_string(),
    };
    let result = service.chart(&id, &request).unwrap();
    assert_eq!(
        charts::chart_json(&result).unwrap(),
        serde_json::json!({ "error": "Invalid input parameters" })
    );
}

// ============================================================================
// Export, paging and deletion
// ============================================================================

#[test]
fn test_download_after_cleaning() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");
    let config = CleaningConfig::builder()
        .remove_duplicates(true)
        .build()
        .unwrap();
    service.clean(&id, &config).unwrap();

    let csv = String::from_utf8(service.download_csv(&id).unwrap()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("age,sex,cp,trestbps,chol,target,visit_date"));
    assert_eq!(lines.next(), Some("63,M,typical,145,233,1,2024-01-05"));
    assert_eq!(csv.lines().count(), 11);
}

#[test]
fn test_paging_and_delete() {
    let service = DatasetService::in_memory();
    let id = upload(&service, "heart.csv");

    let page = service.get_page(&id, Some(3), Some(5)).unwrap();
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data.len(), 1);

    service.delete(&id).unwrap();
    assert!(matches!(
        service.get_page(&id, None, None),
        Err(DatasetError::DatasetNotFound(_))
    ));
}

// ============================================================================
// AI Narration
// ============================================================================

#[test]
fn test_analysis_prompt_reaches_provider() {
    let provider = Arc::new(RecordingProvider {
        prompts: Mutex::new(Vec::new()),
    });
    let service = DatasetService::in_memory().with_ai_provider(provider.clone());
    let id = upload(&service, "heart.csv");

    let analysis = service.analyze(&id).unwrap();
    assert!(analysis.contains("asymptomatic"));

    let prompts = provider.prompts.lock();
    assert!(prompts[0].contains("approximately 11 rows"));
    assert!(prompts[0].contains("age, sex, cp, trestbps, chol, target, visit_date"));
    assert!(prompts[0].contains("\"type\": \"numeric\""));
}
