//! Ingestion tests: validation, content-hash dedup, and queue load-shedding.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use cfgaudit_core::CoreError;
use cfgaudit_pipeline::error::PipelineError;
use cfgaudit_pipeline::ingest::IngestService;
use cfgaudit_pipeline::queue::AnalysisQueue;
use cfgaudit_pipeline::store::PipelineStore;
use cfgaudit_pipeline::PipelineConfig;
use uuid::Uuid;

use common::{upload, MemStore};

fn service(store: Arc<MemStore>, queue_capacity: usize) -> IngestService<MemStore> {
    let (queue, _rx) = AnalysisQueue::new(queue_capacity);
    IngestService::new(store, queue, PipelineConfig::default().max_file_size)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_content_rejected_and_nothing_persisted() {
    let store = Arc::new(MemStore::new());
    let svc = service(Arc::clone(&store), 10);
    let tenant = Uuid::new_v4();

    let err = svc.submit(upload(tenant, "empty.cfg", b"")).await;
    assert_matches!(err, Err(PipelineError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn oversized_content_rejected() {
    let store = Arc::new(MemStore::new());
    let (queue, _rx) = AnalysisQueue::new(10);
    let svc = IngestService::new(Arc::clone(&store), queue, 16);

    let err = svc
        .submit(upload(Uuid::new_v4(), "big.cfg", b"hostname much-too-long\n"))
        .await;
    assert_matches!(err, Err(PipelineError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn unknown_metadata_rejected() {
    let store = Arc::new(MemStore::new());
    let svc = service(store, 10);
    let tenant = Uuid::new_v4();

    let mut bad_device = upload(tenant, "a.cfg", b"hostname r1\n");
    bad_device.device_type = "toaster".into();
    assert_matches!(
        svc.submit(bad_device).await,
        Err(PipelineError::Core(CoreError::Validation(_)))
    );

    let mut bad_manufacturer = upload(tenant, "b.cfg", b"hostname r1\n");
    bad_manufacturer.manufacturer = "acme".into();
    assert_matches!(
        svc.submit(bad_manufacturer).await,
        Err(PipelineError::Core(CoreError::Validation(_)))
    );

    let mut bad_config_type = upload(tenant, "c.cfg", b"hostname r1\n");
    bad_config_type.config_type = "golden_config".into();
    assert_matches!(
        svc.submit(bad_config_type).await,
        Err(PipelineError::Core(CoreError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// Dedup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_content_rejected_for_same_tenant() {
    let store = Arc::new(MemStore::new());
    let svc = service(Arc::clone(&store), 10);
    let tenant = Uuid::new_v4();

    svc.submit(upload(tenant, "first.cfg", b"hostname r1\n"))
        .await
        .unwrap();

    // Same bytes, different filename: still a duplicate.
    let err = svc
        .submit(upload(tenant, "renamed.cfg", b"hostname r1\n"))
        .await;
    assert_matches!(err, Err(PipelineError::Core(CoreError::Duplicate(_))));
}

#[tokio::test]
async fn identical_content_accepted_for_another_tenant() {
    let store = Arc::new(MemStore::new());
    let svc = service(Arc::clone(&store), 10);

    let a = svc
        .submit(upload(Uuid::new_v4(), "a.cfg", b"hostname r1\n"))
        .await
        .unwrap();
    let b = svc
        .submit(upload(Uuid::new_v4(), "b.cfg", b"hostname r1\n"))
        .await
        .unwrap();

    assert_eq!(a.file_hash, b.file_hash);
    assert_ne!(a.tenant_id, b.tenant_id);
}

#[tokio::test]
async fn accepted_file_starts_pending_with_sniffed_format() {
    let store = Arc::new(MemStore::new());
    let svc = service(Arc::clone(&store), 10);

    let file = svc
        .submit(upload(Uuid::new_v4(), "fw.json", b"{\"ssh\": {\"enabled\": true}}"))
        .await
        .unwrap();

    assert_eq!(file.parsing_status, "pending");
    assert_eq!(file.analysis_status, "pending");
    assert_eq!(file.config_format, "json");
    assert_eq!(file.file_hash.len(), 64);
    assert_eq!(file.file_size, 26);
}

// ---------------------------------------------------------------------------
// Queue saturation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_queue_drops_job_but_submission_succeeds() {
    let store = Arc::new(MemStore::new());
    let (queue, rx) = AnalysisQueue::new(2);
    let svc = IngestService::new(
        Arc::clone(&store),
        queue,
        PipelineConfig::default().max_file_size,
    );
    let tenant = Uuid::new_v4();

    let a = svc.submit(upload(tenant, "a.cfg", b"hostname a\n")).await.unwrap();
    let b = svc.submit(upload(tenant, "b.cfg", b"hostname b\n")).await.unwrap();
    let c = svc.submit(upload(tenant, "c.cfg", b"hostname c\n")).await.unwrap();

    // All three rows exist; the third enqueue was shed.
    let mut queued = Vec::new();
    while let Some(id) = rx.try_next() {
        queued.push(id);
    }
    assert_eq!(queued, vec![a.id, b.id]);
    assert_eq!(store.file(c.id).analysis_status, "pending");

    // The dropped file can be re-queued once there is room again.
    assert!(svc.trigger_analysis(tenant, c.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Trigger / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_analysis_unknown_file_is_not_found() {
    let store = Arc::new(MemStore::new());
    let svc = service(store, 10);

    let err = svc.trigger_analysis(Uuid::new_v4(), Uuid::new_v4()).await;
    assert_matches!(err, Err(PipelineError::Core(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn trigger_analysis_is_tenant_scoped() {
    let store = Arc::new(MemStore::new());
    let svc = service(Arc::clone(&store), 10);

    let file = svc
        .submit(upload(Uuid::new_v4(), "a.cfg", b"hostname a\n"))
        .await
        .unwrap();

    let err = svc.trigger_analysis(Uuid::new_v4(), file.id).await;
    assert_matches!(err, Err(PipelineError::Core(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn delete_removes_file_and_derived_data() {
    let store = Arc::new(MemStore::new());
    let svc = service(Arc::clone(&store), 10);
    let tenant = Uuid::new_v4();

    let file = svc
        .submit(upload(tenant, "a.cfg", b"hostname a\n"))
        .await
        .unwrap();
    svc.delete(tenant, file.id).await.unwrap();

    assert!(store.find_file(file.id).await.unwrap().is_none());
    assert_matches!(
        svc.delete(tenant, file.id).await,
        Err(PipelineError::Core(CoreError::NotFound { .. }))
    );
}
