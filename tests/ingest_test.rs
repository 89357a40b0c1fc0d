mod helpers;

use cyberguard::ingest::{NOT_AVAILABLE, OPENING_SENTENCE};
use cyberguard::store::{SqliteVecBackend, SqliteVecIndex, VectorIndex, INDEX_FILE};
use cyberguard::{ingest, ingest_with_options, IngestError, IngestOptions};
use helpers::{write_csv, CountingEmbedder, FailingEmbedder};
use tempfile::TempDir;

const EVENTS_CSV: &str = "\
Event_ID,Timestamp,Attack Type,Attack Severity,Data Exfiltrated,Threat Intelligence,Response Action,User Agent
E1,2024-01-01T00:00:00Z,Phishing,High,,,Quarantined,Mozilla/5.0
E2,2024-01-02T08:30:00Z,Ransomware,Critical,True,Known IOC,Isolated host,
E3,2024-01-03T12:00:00Z,DDoS,Low,False,,Blocked,curl/8.4
";

#[test]
fn ingest_indexes_one_document_per_row() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), "events.csv", EVENTS_CSV);
    let store = tmp.path().join("stores").join("events");
    let embedder = CountingEmbedder::default();

    let index = ingest(&csv, &store, &embedder, &SqliteVecBackend::default()).unwrap();

    assert_eq!(index.len(), 3);
    assert_eq!(embedder.calls(), 3);
    assert!(store.join(INDEX_FILE).exists());

    let docs = index.documents().unwrap();
    assert_eq!(
        docs[1].content,
        "A cybersecurity event was recorded. Attack Type: Ransomware. Attack Severity: Critical. \
         Data Exfiltrated: True. Threat Intelligence: Known IOC. Response Action: Isolated host."
    );
    let ids: Vec<&str> = docs.iter().map(|d| d.metadata.event_id.as_str()).collect();
    assert_eq!(ids, ["E1", "E2", "E3"]);
    assert!(docs.iter().all(|d| d.metadata.source_csv == "events.csv"));
    assert!(docs.iter().all(|d| d.content.starts_with(OPENING_SENTENCE)));
}

#[test]
fn persisted_index_matches_returned_index() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), "events.csv", EVENTS_CSV);
    let store = tmp.path().join("store");

    let index = ingest(
        &csv,
        &store,
        &CountingEmbedder::default(),
        &SqliteVecBackend::new(2),
    )
    .unwrap();
    let loaded = SqliteVecIndex::load(&store).unwrap();

    assert_eq!(loaded.len(), index.len());
    assert_eq!(loaded.vector_count().unwrap(), 3);
    assert_eq!(loaded.documents().unwrap(), index.documents().unwrap());
    let meta = loaded.meta().unwrap();
    assert_eq!(meta.embedding_model, "counting-test");
    assert_eq!(meta.dimensions, helpers::TEST_DIM);
}

#[test]
fn reference_example_renders_exactly() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(
        tmp.path(),
        "sample.csv",
        "Event_ID, Timestamp, Attack Type, Attack Severity\nE1,2024-01-01T00:00:00Z,Phishing,High\n",
    );

    let index = ingest(
        &csv,
        &tmp.path().join("store"),
        &CountingEmbedder::default(),
        &SqliteVecBackend::default(),
    )
    .unwrap();

    let doc = &index.documents().unwrap()[0];
    assert_eq!(
        doc.content,
        "A cybersecurity event was recorded. Attack Type: Phishing. Attack Severity: High."
    );
    assert_eq!(doc.metadata.source_csv, "sample.csv");
    assert_eq!(doc.metadata.event_id, "E1");
    assert_eq!(doc.metadata.timestamp, "2024-01-01T00:00:00Z");
}

#[test]
fn missing_csv_fails_without_creating_store() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("never-created");
    let embedder = CountingEmbedder::default();

    let err = ingest(
        &tmp.path().join("absent.csv"),
        &store,
        &embedder,
        &SqliteVecBackend::default(),
    )
    .unwrap_err();

    assert!(matches!(err, IngestError::NotFound { .. }));
    assert!(!store.exists());
    assert_eq!(embedder.calls(), 0);
}

#[test]
fn header_only_csv_fails_before_embedding() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), "empty.csv", "Event_ID,Attack Type\n");
    let store = tmp.path().join("store");
    let embedder = CountingEmbedder::default();

    let err = ingest(&csv, &store, &embedder, &SqliteVecBackend::default()).unwrap_err();

    assert!(matches!(err, IngestError::NoContent { .. }));
    assert_eq!(embedder.calls(), 0);
    assert!(!store.exists());
}

#[test]
fn rows_without_event_fields_still_produce_documents() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(
        tmp.path(),
        "sparse.csv",
        "Source IP,Attack Type\n10.0.0.1,\n10.0.0.2,Malware\n",
    );

    let index = ingest(
        &csv,
        &tmp.path().join("store"),
        &CountingEmbedder::default(),
        &SqliteVecBackend::default(),
    )
    .unwrap();

    let docs = index.documents().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].content, OPENING_SENTENCE);
    assert_eq!(docs[0].metadata.event_id, NOT_AVAILABLE);
    assert_eq!(docs[0].metadata.timestamp, NOT_AVAILABLE);
}

#[test]
fn skipping_uninformative_rows_can_leave_nothing_to_index() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), "sparse.csv", "Source IP,Attack Type\n10.0.0.1,\n");
    let embedder = CountingEmbedder::default();
    let options = IngestOptions {
        skip_uninformative_rows: true,
    };

    let err = ingest_with_options(
        &csv,
        &tmp.path().join("store"),
        &embedder,
        &SqliteVecBackend::default(),
        options,
    )
    .unwrap_err();

    assert!(matches!(err, IngestError::NoContent { .. }));
    assert_eq!(embedder.calls(), 0);
}

#[test]
fn malformed_row_aborts_the_run() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(
        tmp.path(),
        "bad.csv",
        "Event_ID,Attack Type\nE1,Phishing\nE2,DDoS,extra\n",
    );
    let store = tmp.path().join("store");
    let embedder = CountingEmbedder::default();

    let err = ingest(&csv, &store, &embedder, &SqliteVecBackend::default()).unwrap_err();

    assert!(matches!(err, IngestError::Row { line: 3, .. }));
    assert_eq!(embedder.calls(), 0);
    assert!(!store.exists());
}

#[test]
fn backend_failure_propagates_and_persists_nothing() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), "events.csv", EVENTS_CSV);
    let store = tmp.path().join("store");

    let err = ingest(&csv, &store, &FailingEmbedder, &SqliteVecBackend::default()).unwrap_err();

    match err {
        IngestError::Backend(e) => {
            assert!(format!("{e:#}").contains("embedding service unavailable"))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!store.join(INDEX_FILE).exists());
}

#[test]
fn reingesting_replaces_the_previous_index() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store");
    let backend = SqliteVecBackend::default();
    let embedder = CountingEmbedder::default();

    let first = write_csv(tmp.path(), "first.csv", EVENTS_CSV);
    ingest(&first, &store, &embedder, &backend).unwrap();

    let second = write_csv(tmp.path(), "second.csv", "Attack Type\nSQL Injection\n");
    ingest(&second, &store, &embedder, &backend).unwrap();

    let loaded = SqliteVecIndex::load(&store).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(
        loaded.documents().unwrap()[0].metadata.source_csv,
        "second.csv"
    );
}

#[cfg(unix)]
#[test]
fn unwritable_store_path_keeps_previous_index() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new().unwrap();
    let csv = write_csv(tmp.path(), "events.csv", EVENTS_CSV);
    let embedder = CountingEmbedder::default();
    let backend = SqliteVecBackend::default();

    let store = tmp.path().join("store");
    ingest(&csv, &store, &embedder, &backend).unwrap();

    // SQLite takes UTF-8 paths only, so saving under this name must fail
    let odd_store = tmp.path().join(OsStr::from_bytes(b"store\xff"));
    std::fs::rename(&store, &odd_store).unwrap();

    let replacement = write_csv(tmp.path(), "replacement.csv", "Attack Type\nMalware\n");
    let err = ingest(&replacement, &odd_store, &embedder, &backend).unwrap_err();
    assert!(matches!(err, IngestError::Backend(_)));
    assert!(odd_store.join(INDEX_FILE).exists());

    std::fs::rename(&odd_store, &store).unwrap();
    let loaded = SqliteVecIndex::load(&store).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(
        loaded.documents().unwrap()[0].metadata.source_csv,
        "events.csv"
    );
}
