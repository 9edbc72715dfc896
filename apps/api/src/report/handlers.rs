use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::report::catalog::{
    scan_profile, template_profile, ReportTemplate, Resolved, ScanProfile, ScanType,
    TemplateProfile,
};
use crate::report::context::{AttachmentDescriptor, PromptContext, PromptStyle};
use crate::report::normalizer::{normalize_report, SectionSource};
use crate::report::prompt_builder;
use crate::routes::model::require_api_key;
use crate::state::AppState;

/// Report request as sent by the form. Every field is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub scan_type: String,
    pub report_template: String,
    pub clinical_question: String,
    pub attachments: Vec<AttachmentDescriptor>,
    pub instructions: String,
    pub custom_system_prompt: String,
    pub structured_prompting: bool,
}

impl Default for ReportRequest {
    fn default() -> Self {
        Self {
            scan_type: String::new(),
            report_template: String::new(),
            clinical_question: String::new(),
            attachments: Vec::new(),
            instructions: String::new(),
            custom_system_prompt: String::new(),
            structured_prompting: true,
        }
    }
}

impl ReportRequest {
    /// Resolves catalog keys and builds the prompt context. Unrecognised keys
    /// fall back to the defaults and produce one warning each; blank keys fall
    /// back silently.
    pub fn into_context(self) -> (PromptContext, Vec<String>) {
        let scan = ScanType::resolve(&self.scan_type);
        let template = ReportTemplate::resolve(&self.report_template);

        let warnings: Vec<String> = [
            fallback_warning(&scan, "scan_type"),
            fallback_warning(&template, "report_template"),
        ]
        .into_iter()
        .flatten()
        .collect();
        for w in &warnings {
            warn!("{w}");
        }

        let context = PromptContext {
            scan_type: scan.value,
            report_template: template.value,
            clinical_question: self.clinical_question,
            attachments: self.attachments,
            instructions: self.instructions,
            custom_system_prompt: self.custom_system_prompt,
            style: if self.structured_prompting {
                PromptStyle::Structured
            } else {
                PromptStyle::Simple
            },
        };
        (context, warnings)
    }
}

fn fallback_warning<T: std::fmt::Display>(resolved: &Resolved<T>, field: &str) -> Option<String> {
    if resolved.requested.trim().is_empty() {
        return None;
    }
    resolved.warning(field)
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    #[serde(flatten)]
    pub report: ReportRequest,
    #[serde(default)]
    pub raw_text: String,
}

#[derive(Serialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
pub struct NormalizeResponse {
    pub report: String,
    pub findings_source: SectionSource,
    pub impression_source: SectionSource,
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
pub struct GenerateReportResponse {
    pub report_id: Uuid,
    pub model: String,
    pub prompt: String,
    pub raw_response: String,
    pub report: String,
    pub findings_source: SectionSource,
    pub impression_source: SectionSource,
    pub warnings: Vec<String>,
}

/// POST /api/v1/reports/prompt
pub async fn handle_build_prompt(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Json<PromptResponse> {
    let (context, warnings) = req.into_context();
    let prompt = prompt_builder::build(&context, state.clock.now());
    Json(PromptResponse { prompt, warnings })
}

/// POST /api/v1/reports/normalize
pub async fn handle_normalize(
    State(state): State<AppState>,
    Json(req): Json<NormalizeRequest>,
) -> Json<NormalizeResponse> {
    let (context, warnings) = req.report.into_context();
    let normalized = normalize_report(&req.raw_text, &context, state.clock.now());
    Json(NormalizeResponse {
        report: normalized.text,
        findings_source: normalized.findings_source,
        impression_source: normalized.impression_source,
        warnings,
    })
}

/// POST /api/v1/reports/generate
/// Builds the prompt, calls the model once and normalizes its reply.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReportRequest>,
) -> Result<Json<GenerateReportResponse>, AppError> {
    require_api_key(&headers, &state.config.api_key)?;

    let report_id = Uuid::new_v4();
    let (context, warnings) = req.into_context();
    // One instant for both halves so the prompt and the report agree on date and time.
    let now = state.clock.now();

    info!(
        "Generating report {report_id}: scan_type={}, template={}, attachments={}",
        context.scan_type,
        context.report_template,
        context.attachments.len()
    );

    let prompt = prompt_builder::build(&context, now);
    let raw_response = state.model.generate(&prompt).await?;
    let normalized = normalize_report(&raw_response, &context, now);

    info!(
        "Report {report_id} normalized: findings={:?}, impression={:?}, recommendations={}",
        normalized.findings_source, normalized.impression_source, normalized.has_recommendations
    );

    Ok(Json(GenerateReportResponse {
        report_id,
        model: state.model.model_name().to_string(),
        prompt,
        raw_response,
        report: normalized.text,
        findings_source: normalized.findings_source,
        impression_source: normalized.impression_source,
        warnings,
    }))
}

#[derive(Serialize)]
pub struct ScanTypeEntry {
    pub key: ScanType,
    #[serde(flatten)]
    pub profile: ScanProfile,
}

#[derive(Serialize)]
pub struct TemplateEntry {
    pub key: ReportTemplate,
    #[serde(flatten)]
    pub profile: TemplateProfile,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub scan_types: Vec<ScanTypeEntry>,
    pub report_templates: Vec<TemplateEntry>,
}

/// GET /api/v1/catalog
pub async fn handle_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        scan_types: ScanType::ALL
            .into_iter()
            .map(|key| ScanTypeEntry {
                key,
                profile: scan_profile(key),
            })
            .collect(),
        report_templates: ReportTemplate::ALL
            .into_iter()
            .map(|key| TemplateEntry {
                key,
                profile: template_profile(key),
            })
            .collect(),
    })
}
