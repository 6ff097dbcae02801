//! Analysis processor: drives one file through the parse → analyze →
//! score → persist state machine.

use std::sync::Arc;

use async_trait::async_trait;
use cfgaudit_core::catalog::CatalogStandard;
use cfgaudit_core::sniff::ConfigFormat;
use cfgaudit_core::{engine, scoring, CoreError};
use cfgaudit_db::models::config_analysis::NewAnalysisResult;
use cfgaudit_db::models::config_file::ConfigFile;
use cfgaudit_db::models::config_finding::NewConfigFinding;
use cfgaudit_db::models::status::{AnalysisStatus, ParsingStatus};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::parser::ConfigParse;
use crate::queue::JobProcessor;
use crate::store::PipelineStore;

pub struct AnalysisProcessor<S> {
    store: Arc<S>,
    parser: Arc<dyn ConfigParse>,
}

impl<S: PipelineStore> AnalysisProcessor<S> {
    pub fn new(store: Arc<S>, parser: Arc<dyn ConfigParse>) -> Self {
        Self { store, parser }
    }

    /// Produce the parsed document, running the parser if the file is not
    /// already `parsed`. A parse failure is terminal for both stage
    /// markers; analysis never runs on an unparsed file.
    async fn ensure_parsed(&self, file: &ConfigFile) -> Result<Value, PipelineError> {
        if file.is_parsed() {
            if let Some(document) = &file.parsed_data {
                return Ok(document.clone());
            }
        }

        self.store
            .set_parsing_status(file.id, ParsingStatus::Parsing, None)
            .await?;

        let format = format_hint(&file.config_format);
        match self.parser.parse(&file.file_content, format) {
            Ok(document) => {
                self.store
                    .store_parsed_document(file.id, &document, format.as_str())
                    .await?;
                Ok(document)
            }
            Err(e) => {
                let message = e.to_string();
                self.store
                    .set_parsing_status(file.id, ParsingStatus::Failed, Some(&message))
                    .await?;
                self.store
                    .set_analysis_status(file.id, AnalysisStatus::Failed)
                    .await?;
                Err(e.into())
            }
        }
    }

    /// Rule engine + scorer + replace-not-append persistence.
    async fn analyze(&self, file: &ConfigFile, document: &Value) -> Result<(), PipelineError> {
        let rows = self
            .store
            .active_standards(&file.manufacturer, &file.device_type)
            .await?;

        let standards: Vec<CatalogStandard> = rows
            .iter()
            .filter_map(|row| {
                let catalog = row.to_catalog();
                if catalog.is_none() {
                    warn!(standard_id = %row.id, check_type = %row.check_type,
                        "skipping standard with unusable check definition");
                }
                catalog
            })
            .collect();

        let raw_text = String::from_utf8_lossy(&file.file_content);
        let findings = engine::evaluate(&standards, document, &raw_text);
        let summary = scoring::summarize(&findings, &standards);

        let new_findings: Vec<NewConfigFinding> = findings
            .iter()
            .map(|draft| NewConfigFinding::from_draft(file.id, file.tenant_id, draft))
            .collect();

        let result = NewAnalysisResult::from_summary(file.id, file.tenant_id, &summary);
        self.store
            .store_analysis_run(file.id, &new_findings, &result)
            .await?;

        info!(file_id = %file.id, findings = summary.total_findings,
            security_score = summary.security_score, risk_level = %summary.risk_level,
            "analysis completed");
        Ok(())
    }
}

/// Stored format hint → parser format. Unknown hints fall back to text.
fn format_hint(config_format: &str) -> ConfigFormat {
    match config_format {
        "json" => ConfigFormat::Json,
        "xml" => ConfigFormat::Xml,
        _ => ConfigFormat::Text,
    }
}

#[async_trait]
impl<S: PipelineStore + 'static> JobProcessor for AnalysisProcessor<S> {
    async fn process(&self, file_id: Uuid) -> Result<(), PipelineError> {
        let file = self
            .store
            .find_file(file_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "config file",
                id: file_id.to_string(),
            })?;

        let document = self.ensure_parsed(&file).await?;

        self.store
            .set_analysis_status(file.id, AnalysisStatus::Analyzing)
            .await?;

        match self.analyze(&file, &document).await {
            Ok(()) => {
                self.store
                    .set_analysis_status(file.id, AnalysisStatus::Completed)
                    .await
            }
            Err(e) => {
                self.store
                    .set_analysis_status(file.id, AnalysisStatus::Failed)
                    .await?;
                Err(e)
            }
        }
    }

    async fn on_timeout(&self, file_id: Uuid) {
        if let Err(e) = self
            .store
            .set_analysis_status(file_id, AnalysisStatus::Failed)
            .await
        {
            error!(file_id = %file_id, error = %e,
                "failed to mark timed-out analysis as failed");
        }
    }
}
