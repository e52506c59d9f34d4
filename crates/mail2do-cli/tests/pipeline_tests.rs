//! End-to-end pipeline tests with a scripted model and an in-memory store

use chrono::{NaiveDate, NaiveDateTime};
use mail2do_cli::{CliError, Pipeline};
use mail2do_domain::{
    CandidateTask, EmailRecord, FieldSpec, FieldType, PropertyValue, SchemaDescriptor, StoreUser,
    UploadStatus,
};
use mail2do_extractor::{ExtractorConfig, ProcessedSet, PromptComposer};
use mail2do_gatekeeper::SchemaGate;
use mail2do_llm::MockProvider;
use mail2do_store::MemoryStore;
use mail2do_uploader::{BatchUploader, UploadConfig};
use std::fs;
use tempfile::tempdir;

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 17)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new(
        "db1",
        "Tasks",
        vec![
            FieldSpec::new("Task name", FieldType::Title),
            FieldSpec::new("Priority", FieldType::Select).with_allowed_values(["Low", "High"]),
            FieldSpec::new("Assignee", FieldType::Person),
            FieldSpec::new("Date Added", FieldType::Date),
        ],
    )
}

fn mock() -> MockProvider {
    let mut llm = MockProvider::default();
    llm.add_response(
        "kettle",
        r#"{"Task name": "Return defective item", "Priority": "High"}"#,
    );
    llm.add_response("Reminder", r#"{"Task name": "Task"}"#);
    llm.add_response(
        "on-call",
        r#"{"Task name": "Add Alice's on-call dates", "Assignee": ["Alice"]}"#,
    );
    llm
}

fn emails() -> Vec<EmailRecord> {
    vec![
        EmailRecord::new("205", "Your kettle order", "The kettle arrived broken."),
        EmailRecord::new("206", "Reminder", "Don't forget."),
        EmailRecord::new("207", "Rota", "Alice's on-call dates are attached."),
    ]
}

fn pipeline(llm: MockProvider) -> Pipeline<MockProvider> {
    Pipeline::new(
        llm,
        schema(),
        PromptComposer::default_template(),
        ExtractorConfig {
            request_delay_ms: 0,
            ..ExtractorConfig::default()
        },
        UploadConfig {
            request_delay_ms: 0,
            ..UploadConfig::default()
        },
    )
    .with_timestamp(timestamp())
}

fn alice() -> StoreUser {
    StoreUser {
        id: "user-alice".to_string(),
        name: Some("Alice".to_string()),
        email: Some("alice@example.com".to_string()),
    }
}

#[test]
fn test_three_scenarios_in_email_order() {
    let mut store = MemoryStore::new()
        .with_titles(["Add Alice's on-call dates"])
        .with_users(vec![alice()]);

    let report = pipeline(mock())
        .run(emails(), ProcessedSet::in_memory(), false, &mut store)
        .unwrap();

    let statuses: Vec<_> = report
        .results
        .iter()
        .map(|o| (o.task.as_str(), o.status.to_string()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Return defective item", "created".to_string()),
            ("Task", "skipped (fallback name)".to_string()),
            ("Add Alice's on-call dates", "skipped (already exists)".to_string()),
        ]
    );

    // One query for each non-fallback title, one write for the new task
    assert_eq!(store.query_count(), 2);
    assert_eq!(store.created_titles(), vec!["Return defective item"]);

    let written = &store.created()[0];
    assert_eq!(written.get("Priority"), Some(&PropertyValue::Select("High".into())));
    assert_eq!(written.get("Date Added"), Some(&PropertyValue::Date("2026-10-17".into())));
}

#[test]
fn test_second_run_is_idempotent() {
    let dir = tempdir().unwrap();
    let processed_path = dir.path().join("processed_emails.txt");
    let llm = mock();
    let mut store = MemoryStore::new().with_users(vec![alice()]);

    let first = pipeline(llm.clone())
        .run(
            emails(),
            ProcessedSet::load(&processed_path).unwrap(),
            false,
            &mut store,
        )
        .unwrap();
    assert_eq!(first.results.len(), 3);
    assert_eq!(llm.call_count(), 3);
    let created_after_first = store.created().len();

    let second = pipeline(llm.clone())
        .run(
            emails(),
            ProcessedSet::load(&processed_path).unwrap(),
            false,
            &mut store,
        )
        .unwrap();

    assert!(second.results.is_empty());
    assert_eq!(second.already_processed, 3);
    assert_eq!(llm.call_count(), 3);
    assert_eq!(store.created().len(), created_after_first);
    assert_eq!(
        fs::read_to_string(&processed_path).unwrap(),
        "205\n206\n207\n"
    );
}

#[test]
fn test_dry_run_records_nothing() {
    let dir = tempdir().unwrap();
    let processed_path = dir.path().join("processed_emails.txt");
    fs::write(&processed_path, "206\n").unwrap();
    let mut store = MemoryStore::new().with_users(vec![alice()]);

    let mut dry_run = Pipeline::new(
        mock(),
        schema(),
        PromptComposer::default_template(),
        ExtractorConfig {
            request_delay_ms: 0,
            ..ExtractorConfig::default()
        },
        UploadConfig::dry_run(),
    )
    .with_timestamp(timestamp());
    let processed = ProcessedSet::load(&processed_path).unwrap().detached();
    let report = dry_run.run(emails(), processed, false, &mut store).unwrap();

    assert_eq!(report.already_processed, 1);
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|o| o.status == UploadStatus::Created));
    assert!(store.created().is_empty());
    assert_eq!(fs::read_to_string(&processed_path).unwrap(), "206\n");
}

#[test]
fn test_people_resolved_to_user_ids() {
    let mut store = MemoryStore::new().with_users(vec![alice()]);

    let report = pipeline(mock())
        .run(emails(), ProcessedSet::in_memory(), false, &mut store)
        .unwrap();

    assert_eq!(report.results[2].status, UploadStatus::Created);
    let on_call = &store.created()[1];
    assert_eq!(
        on_call.get("Assignee"),
        Some(&PropertyValue::People(vec!["user-alice".to_string()]))
    );
}

#[test]
fn test_extraction_failures_are_reported_not_uploaded() {
    let mut llm = mock();
    llm.add_response("Garbled", "no json here");
    let mut store = MemoryStore::new();
    let mut emails = emails();
    emails.insert(1, EmailRecord::new("300", "Garbled", "???"));

    let report = pipeline(llm)
        .run(emails, ProcessedSet::in_memory(), false, &mut store)
        .unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.extraction_failures.len(), 1);
    assert_eq!(report.extraction_failures[0].uid, "300");

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("results").is_some());
    assert_eq!(json["extraction_failures"][0]["uid"], "300");
    assert_eq!(json["already_processed"], 0);
}

#[test]
fn test_store_write_failure_does_not_stop_run() {
    let mut store = MemoryStore::new().fail_write_for("Return defective item");

    let report = pipeline(mock())
        .run(emails(), ProcessedSet::in_memory(), false, &mut store)
        .unwrap();

    assert_eq!(
        report.results[0].status,
        UploadStatus::Failed("write rejected for Return defective item".to_string())
    );
    assert_eq!(report.results[2].status, UploadStatus::Created);
}

#[test]
fn test_dedup_query_failure_writes_nothing() {
    let mut store = MemoryStore::new().fail_queries();

    let report = pipeline(mock())
        .run(emails(), ProcessedSet::in_memory(), false, &mut store)
        .unwrap();

    assert!(report.results[0].status.is_failure());
    assert_eq!(report.results[1].status, UploadStatus::SkippedFallbackName);
    assert!(store.created().is_empty());
}

#[test]
fn test_edited_task_file_is_checked_before_upload() {
    let tasks: Vec<CandidateTask> = serde_json::from_str(
        r#"[
            {"_mail2do_uid": "205", "Task name": "Return defective item", "Priority": "Urgent!!"},
            {"_mail2do_uid": "207", "Task name": "Call plumber", "Priority": "Low"}
        ]"#,
    )
    .unwrap();
    let mut store = MemoryStore::new();
    let mut uploader = BatchUploader::new(UploadConfig {
        request_delay_ms: 0,
        ..UploadConfig::default()
    })
    .with_gate(SchemaGate::default_config());

    let outcomes = uploader.upload_all(&tasks, &schema(), &mut store).unwrap();

    assert!(outcomes[0].status.is_failure());
    assert!(outcomes[0].status.to_string().contains("Urgent!!"));
    assert_eq!(outcomes[1].status, UploadStatus::Created);
    assert_eq!(store.created_titles(), vec!["Call plumber"]);
}

#[test]
fn test_cli_error_wraps_uploader_error() {
    let err: CliError = mail2do_uploader::UploaderError::UserDirectory("down".into()).into();
    assert_eq!(err.to_string(), "Could not list workspace users: down");
}
