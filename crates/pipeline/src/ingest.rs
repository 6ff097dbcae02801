//! Ingestion: validation, content-hash dedup, persistence, and enqueueing.

use std::sync::Arc;

use cfgaudit_core::hashing::sha256_hex;
use cfgaudit_core::sniff::detect_format;
use cfgaudit_core::validation::{
    validate_config_type, validate_content_size, validate_device_type, validate_manufacturer,
};
use cfgaudit_core::CoreError;
use cfgaudit_db::models::config_file::{ConfigFile, NewConfigFile};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::queue::AnalysisQueue;
use crate::store::PipelineStore;

/// One upload: raw bytes plus the caller-supplied metadata.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub tenant_id: Uuid,
    pub uploaded_by: Option<Uuid>,
    pub filename: String,
    pub content: Vec<u8>,
    pub device_type: String,
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub config_type: String,
    pub mime_type: String,
    pub tags: Vec<String>,
    pub notes: String,
}

/// Front door of the pipeline. Validates, dedups, persists, and enqueues.
pub struct IngestService<S> {
    store: Arc<S>,
    queue: AnalysisQueue,
    max_file_size: usize,
}

impl<S: PipelineStore> IngestService<S> {
    pub fn new(store: Arc<S>, queue: AnalysisQueue, max_file_size: usize) -> Self {
        Self {
            store,
            queue,
            max_file_size,
        }
    }

    /// Accept an upload.
    ///
    /// Validation and duplicate failures persist nothing. A full queue is
    /// not a failure: the row is stored `pending` and the drop is logged;
    /// `trigger_analysis` re-enqueues it later.
    pub async fn submit(&self, request: UploadRequest) -> Result<ConfigFile, PipelineError> {
        validate_content_size(request.content.len(), self.max_file_size)?;
        validate_device_type(&request.device_type)?;
        validate_config_type(&request.config_type)?;
        validate_manufacturer(&request.manufacturer)?;

        let file_hash = sha256_hex(&request.content);
        if let Some(existing) = self
            .store
            .find_file_by_hash(request.tenant_id, &file_hash)
            .await?
        {
            return Err(CoreError::Duplicate(format!(
                "identical content already uploaded as '{}'",
                existing.filename
            ))
            .into());
        }

        let config_format = detect_format(&request.content, &request.filename);

        let file = self
            .store
            .create_file(&NewConfigFile {
                tenant_id: request.tenant_id,
                uploaded_by: request.uploaded_by,
                filename: request.filename,
                file_hash,
                mime_type: request.mime_type,
                file_content: request.content,
                device_type: request.device_type,
                manufacturer: request.manufacturer,
                model: request.model,
                firmware_version: request.firmware_version,
                config_type: request.config_type,
                config_format: config_format.as_str().to_string(),
                tags: request.tags,
                notes: request.notes,
            })
            .await?;

        info!(file_id = %file.id, tenant_id = %file.tenant_id,
            format = %file.config_format, "config file accepted");
        self.queue.enqueue(file.id);

        Ok(file)
    }

    /// Re-enqueue a file for analysis. This is the only retry path.
    /// Returns `false` when the queue dropped the job or the file is
    /// already queued or mid-analysis.
    pub async fn trigger_analysis(
        &self,
        tenant_id: Uuid,
        file_id: Uuid,
    ) -> Result<bool, PipelineError> {
        let file = self
            .store
            .find_file_for_tenant(tenant_id, file_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "config file",
                id: file_id.to_string(),
            })?;

        debug!(file_id = %file.id, "re-queueing analysis");
        Ok(self.queue.enqueue(file.id))
    }

    /// Delete a file. Findings and the analysis result cascade with it.
    pub async fn delete(&self, tenant_id: Uuid, file_id: Uuid) -> Result<(), PipelineError> {
        if !self.store.delete_file(tenant_id, file_id).await? {
            return Err(CoreError::NotFound {
                entity: "config file",
                id: file_id.to_string(),
            }
            .into());
        }
        info!(file_id = %file_id, "config file deleted");
        Ok(())
    }
}
