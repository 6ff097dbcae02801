//! Persistence seam for the pipeline.
//!
//! `PipelineStore` is the outbound contract: everything the ingestion path
//! and the analysis processor need from storage, and nothing else. The
//! production implementation delegates to the sqlx repositories; tests use
//! an in-memory store.

use async_trait::async_trait;
use cfgaudit_db::models::config_analysis::NewAnalysisResult;
use cfgaudit_db::models::config_file::{ConfigFile, NewConfigFile};
use cfgaudit_db::models::config_finding::NewConfigFinding;
use cfgaudit_db::models::config_standard::ConfigStandard;
use cfgaudit_db::models::status::{AnalysisStatus, ParsingStatus};
use cfgaudit_db::repositories::{ConfigAnalysisRepo, ConfigFileRepo, ConfigStandardRepo};
use cfgaudit_db::DbPool;
use serde_json::Value;
use uuid::Uuid;

use crate::error::PipelineError;

#[async_trait]
pub trait PipelineStore: Send + Sync {
    async fn create_file(&self, input: &NewConfigFile) -> Result<ConfigFile, PipelineError>;

    async fn find_file(&self, id: Uuid) -> Result<Option<ConfigFile>, PipelineError>;

    async fn find_file_for_tenant(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ConfigFile>, PipelineError>;

    async fn find_file_by_hash(
        &self,
        tenant_id: Uuid,
        file_hash: &str,
    ) -> Result<Option<ConfigFile>, PipelineError>;

    async fn set_parsing_status(
        &self,
        id: Uuid,
        status: ParsingStatus,
        error: Option<&str>,
    ) -> Result<(), PipelineError>;

    async fn store_parsed_document(
        &self,
        id: Uuid,
        document: &Value,
        config_format: &str,
    ) -> Result<(), PipelineError>;

    async fn set_analysis_status(
        &self,
        id: Uuid,
        status: AnalysisStatus,
    ) -> Result<(), PipelineError>;

    /// Active standards applicable to a device, in deterministic order.
    async fn active_standards(
        &self,
        manufacturer: &str,
        device_type: &str,
    ) -> Result<Vec<ConfigStandard>, PipelineError>;

    /// Atomically replace the file's findings and analysis result with a
    /// finished run's output. All-or-nothing: a failure leaves the
    /// previous run's data untouched.
    async fn store_analysis_run(
        &self,
        config_file_id: Uuid,
        findings: &[NewConfigFinding],
        result: &NewAnalysisResult,
    ) -> Result<(), PipelineError>;

    async fn delete_file(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, PipelineError>;
}

// ---------------------------------------------------------------------------
// PgStore
// ---------------------------------------------------------------------------

/// Production store backed by the sqlx repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineStore for PgStore {
    async fn create_file(&self, input: &NewConfigFile) -> Result<ConfigFile, PipelineError> {
        Ok(ConfigFileRepo::create(&self.pool, input).await?)
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<ConfigFile>, PipelineError> {
        Ok(ConfigFileRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_file_for_tenant(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ConfigFile>, PipelineError> {
        Ok(ConfigFileRepo::find_by_id_for_tenant(&self.pool, tenant_id, id).await?)
    }

    async fn find_file_by_hash(
        &self,
        tenant_id: Uuid,
        file_hash: &str,
    ) -> Result<Option<ConfigFile>, PipelineError> {
        Ok(ConfigFileRepo::find_by_hash(&self.pool, tenant_id, file_hash).await?)
    }

    async fn set_parsing_status(
        &self,
        id: Uuid,
        status: ParsingStatus,
        error: Option<&str>,
    ) -> Result<(), PipelineError> {
        Ok(ConfigFileRepo::update_parsing_status(&self.pool, id, status, error).await?)
    }

    async fn store_parsed_document(
        &self,
        id: Uuid,
        document: &Value,
        config_format: &str,
    ) -> Result<(), PipelineError> {
        Ok(ConfigFileRepo::store_parsed_document(&self.pool, id, document, config_format).await?)
    }

    async fn set_analysis_status(
        &self,
        id: Uuid,
        status: AnalysisStatus,
    ) -> Result<(), PipelineError> {
        Ok(ConfigFileRepo::update_analysis_status(&self.pool, id, status).await?)
    }

    async fn active_standards(
        &self,
        manufacturer: &str,
        device_type: &str,
    ) -> Result<Vec<ConfigStandard>, PipelineError> {
        Ok(ConfigStandardRepo::list_active_for_device(&self.pool, manufacturer, device_type)
            .await?)
    }

    async fn store_analysis_run(
        &self,
        config_file_id: Uuid,
        findings: &[NewConfigFinding],
        result: &NewAnalysisResult,
    ) -> Result<(), PipelineError> {
        ConfigAnalysisRepo::replace_run(&self.pool, config_file_id, findings, result).await?;
        Ok(())
    }

    async fn delete_file(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, PipelineError> {
        Ok(ConfigFileRepo::delete(&self.pool, tenant_id, id).await?)
    }
}
