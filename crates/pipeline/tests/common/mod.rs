//! Shared test support: an in-memory `PipelineStore` and upload builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use cfgaudit_core::CoreError;
use cfgaudit_db::models::config_analysis::NewAnalysisResult;
use cfgaudit_db::models::config_file::{ConfigFile, NewConfigFile};
use cfgaudit_db::models::config_finding::NewConfigFinding;
use cfgaudit_db::models::config_standard::ConfigStandard;
use cfgaudit_db::models::status::{AnalysisStatus, ParsingStatus};
use cfgaudit_pipeline::error::PipelineError;
use cfgaudit_pipeline::ingest::UploadRequest;
use cfgaudit_pipeline::store::PipelineStore;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// MemStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    files: HashMap<Uuid, ConfigFile>,
    standards: Vec<ConfigStandard>,
    findings: HashMap<Uuid, Vec<NewConfigFinding>>,
    results: HashMap<Uuid, NewAnalysisResult>,
}

/// In-memory store for pipeline tests.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
    /// When set, `store_analysis_run` fails, simulating a persistence
    /// error mid-analysis.
    pub fail_store_run: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_standard(&self, standard: ConfigStandard) {
        self.inner.lock().unwrap().standards.push(standard);
    }

    pub fn file(&self, id: Uuid) -> ConfigFile {
        self.inner.lock().unwrap().files[&id].clone()
    }

    pub fn findings_for(&self, id: Uuid) -> Vec<NewConfigFinding> {
        self.inner
            .lock()
            .unwrap()
            .findings
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn result_for(&self, id: Uuid) -> Option<NewAnalysisResult> {
        self.inner.lock().unwrap().results.get(&id).cloned()
    }
}

#[async_trait]
impl PipelineStore for MemStore {
    async fn create_file(&self, input: &NewConfigFile) -> Result<ConfigFile, PipelineError> {
        let now = Utc::now();
        let file = ConfigFile {
            id: Uuid::new_v4(),
            tenant_id: input.tenant_id,
            uploaded_by: input.uploaded_by,
            filename: input.filename.clone(),
            file_size: input.file_content.len() as i64,
            file_hash: input.file_hash.clone(),
            mime_type: input.mime_type.clone(),
            file_content: input.file_content.clone(),
            device_type: input.device_type.clone(),
            manufacturer: input.manufacturer.clone(),
            model: input.model.clone(),
            firmware_version: input.firmware_version.clone(),
            config_type: input.config_type.clone(),
            config_format: input.config_format.clone(),
            parsing_status: ParsingStatus::Pending.as_str().to_string(),
            parsing_error: None,
            parsed_data: None,
            analysis_status: AnalysisStatus::Pending.as_str().to_string(),
            analysis_started_at: None,
            analysis_completed_at: None,
            tags: serde_json::json!(input.tags),
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<ConfigFile>, PipelineError> {
        Ok(self.inner.lock().unwrap().files.get(&id).cloned())
    }

    async fn find_file_for_tenant(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ConfigFile>, PipelineError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .files
            .get(&id)
            .filter(|f| f.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_file_by_hash(
        &self,
        tenant_id: Uuid,
        file_hash: &str,
    ) -> Result<Option<ConfigFile>, PipelineError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .files
            .values()
            .find(|f| f.tenant_id == tenant_id && f.file_hash == file_hash)
            .cloned())
    }

    async fn set_parsing_status(
        &self,
        id: Uuid,
        status: ParsingStatus,
        error: Option<&str>,
    ) -> Result<(), PipelineError> {
        let mut inner = self.inner.lock().unwrap();
        let file = inner.files.get_mut(&id).expect("unknown file id");
        file.parsing_status = status.as_str().to_string();
        file.parsing_error = error.map(str::to_string);
        Ok(())
    }

    async fn store_parsed_document(
        &self,
        id: Uuid,
        document: &Value,
        config_format: &str,
    ) -> Result<(), PipelineError> {
        let mut inner = self.inner.lock().unwrap();
        let file = inner.files.get_mut(&id).expect("unknown file id");
        file.parsed_data = Some(document.clone());
        file.config_format = config_format.to_string();
        file.parsing_status = ParsingStatus::Parsed.as_str().to_string();
        file.parsing_error = None;
        Ok(())
    }

    async fn set_analysis_status(
        &self,
        id: Uuid,
        status: AnalysisStatus,
    ) -> Result<(), PipelineError> {
        let mut inner = self.inner.lock().unwrap();
        let file = inner.files.get_mut(&id).expect("unknown file id");
        file.analysis_status = status.as_str().to_string();
        match status {
            AnalysisStatus::Analyzing => {
                file.analysis_started_at = Some(Utc::now());
                file.analysis_completed_at = None;
            }
            AnalysisStatus::Completed | AnalysisStatus::Failed => {
                file.analysis_completed_at = Some(Utc::now());
            }
            AnalysisStatus::Pending => {}
        }
        Ok(())
    }

    async fn active_standards(
        &self,
        manufacturer: &str,
        device_type: &str,
    ) -> Result<Vec<ConfigStandard>, PipelineError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .standards
            .iter()
            .filter(|s| {
                s.status == "active"
                    && s.manufacturer.eq_ignore_ascii_case(manufacturer)
                    && (s.device_type == device_type || s.device_type == "any")
            })
            .cloned()
            .collect())
    }

    async fn store_analysis_run(
        &self,
        config_file_id: Uuid,
        findings: &[NewConfigFinding],
        result: &NewAnalysisResult,
    ) -> Result<(), PipelineError> {
        if self.fail_store_run.load(Ordering::SeqCst) {
            return Err(CoreError::Internal("simulated storage failure".into()).into());
        }
        // Both tables swap together, like the transactional store.
        let mut inner = self.inner.lock().unwrap();
        inner.findings.insert(config_file_id, findings.to_vec());
        inner.results.insert(config_file_id, result.clone());
        Ok(())
    }

    async fn delete_file(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, PipelineError> {
        let mut inner = self.inner.lock().unwrap();
        let matched = inner
            .files
            .get(&id)
            .is_some_and(|f| f.tenant_id == tenant_id);
        if matched {
            inner.files.remove(&id);
            inner.findings.remove(&id);
            inner.results.remove(&id);
        }
        Ok(matched)
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// A valid Cisco router upload with the given content.
pub fn upload(tenant_id: Uuid, filename: &str, content: &[u8]) -> UploadRequest {
    UploadRequest {
        tenant_id,
        uploaded_by: None,
        filename: filename.to_string(),
        content: content.to_vec(),
        device_type: "router".to_string(),
        manufacturer: "cisco".to_string(),
        model: "ISR4451".to_string(),
        firmware_version: "17.9".to_string(),
        config_type: "running_config".to_string(),
        mime_type: "text/plain".to_string(),
        tags: Vec::new(),
        notes: String::new(),
    }
}

/// An active absence-check standard for Cisco routers.
pub fn absence_standard(requirement_id: &str, path: &str) -> ConfigStandard {
    let now = Utc::now();
    ConfigStandard {
        id: Uuid::new_v4(),
        standard_name: "CIS Cisco IOS Benchmark".to_string(),
        standard_version: "1.0".to_string(),
        manufacturer: "cisco".to_string(),
        device_type: "router".to_string(),
        category: "network".to_string(),
        requirement_id: requirement_id.to_string(),
        requirement_title: format!("{path} must not be configured"),
        requirement_description: String::new(),
        compliance_frameworks: serde_json::json!(["PCI DSS"]),
        check_type: "absence".to_string(),
        check_config_path: path.to_string(),
        check_pattern: String::new(),
        expected_value: String::new(),
        default_severity: "high".to_string(),
        priority: "high".to_string(),
        remediation_guidance: "Remove the setting".to_string(),
        status: "active".to_string(),
        created_at: now,
        updated_at: now,
    }
}
