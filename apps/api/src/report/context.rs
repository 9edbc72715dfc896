//! Report request configuration — the immutable input to prompt building and
//! normalization.

use serde::{Deserialize, Serialize};

use crate::report::catalog::{ReportTemplate, ScanType};

/// Metadata for one uploaded study file. No file bytes are needed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub name: String,
    pub size_bytes: u64,
}

/// Which prompt shape to send to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// Full instruction set with the fixed output skeleton.
    #[default]
    Structured,
    /// Short request without preamble or skeleton.
    Simple,
}

/// Everything a caller configures for one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub scan_type: ScanType,
    pub report_template: ReportTemplate,
    pub clinical_question: String,
    pub attachments: Vec<AttachmentDescriptor>,
    pub instructions: String,
    pub custom_system_prompt: String,
    pub style: PromptStyle,
}

impl PromptContext {
    pub fn new(scan_type: ScanType, report_template: ReportTemplate) -> Self {
        Self {
            scan_type,
            report_template,
            ..Self::default()
        }
    }

    pub fn with_clinical_question(mut self, question: impl Into<String>) -> Self {
        self.clinical_question = question.into();
        self
    }

    pub fn with_attachment(mut self, name: impl Into<String>, size_bytes: u64) -> Self {
        self.attachments.push(AttachmentDescriptor {
            name: name.into(),
            size_bytes,
        });
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_custom_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = prompt.into();
        self
    }

    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    /// Clinical question, if it has any non-whitespace content.
    pub fn clinical_question(&self) -> Option<&str> {
        non_blank(&self.clinical_question)
    }

    pub fn instructions(&self) -> Option<&str> {
        non_blank(&self.instructions)
    }

    pub fn custom_system_prompt(&self) -> Option<&str> {
        non_blank(&self.custom_system_prompt)
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Renders a byte count in base-1024 units, rounded to two decimals with
/// trailing zeros dropped: `2097152` → `"2 MB"`, `1536` → `"1.5 KB"`.
/// Sizes beyond the GB range stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}
