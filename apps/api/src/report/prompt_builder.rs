//! Prompt Builder — composes a `PromptContext` into the exact text sent to the model.
//!
//! Block order for the structured style is fixed and every block appears at
//! most once:
//! preamble → institutional guidance? → metadata → clinical question? →
//! report requirements → systematic checklist? → attachments? →
//! additional instructions? → output skeleton.

use chrono::NaiveDateTime;

use crate::report::catalog::{narrative_for, scan_profile, sections_for, technique_for};
use crate::report::clock::{report_date, report_time};
use crate::report::context::{format_file_size, PromptContext, PromptStyle};
use crate::report::extractor::defuse_reserved_labels;
use crate::report::prompts::{
    CLINICAL_HISTORY_PLACEHOLDER, REPORT_OUTPUT_SKELETON, REPORT_SYSTEM_PREAMBLE,
    SIMPLE_PROMPT_CLOSING, SIMPLE_PROMPT_HEADING,
};

/// Builds the prompt for `context` as of `now`. Total: absent optional fields
/// only drop their block. Caller text never carries the report title or the
/// section labels in upper case, so the skeleton's title stays unique.
pub fn build(context: &PromptContext, now: NaiveDateTime) -> String {
    match context.style {
        PromptStyle::Structured => build_structured(context, now),
        PromptStyle::Simple => build_simple(context),
    }
}

fn build_structured(context: &PromptContext, now: NaiveDateTime) -> String {
    let profile = scan_profile(context.scan_type);
    let scan_upper = context.scan_type.as_str().to_uppercase();
    let date = report_date(now);
    let time = report_time(now);

    let mut prompt = String::with_capacity(4096);
    prompt.push_str(REPORT_SYSTEM_PREAMBLE);
    prompt.push_str("\n\n");

    if let Some(guidance) = context.custom_system_prompt() {
        prompt.push_str(&format!(
            "INSTITUTIONAL GUIDANCE:\n{}\n\n",
            defuse_reserved_labels(guidance)
        ));
    }

    prompt.push_str(&format!("EXAMINATION TYPE: {scan_upper}\n"));
    prompt.push_str(&format!(
        "REPORT TEMPLATE: {}\n",
        context.report_template.as_str().to_uppercase()
    ));
    prompt.push_str(&format!("DATE: {date}\n"));
    prompt.push_str(&format!("TIME: {time}\n\n"));

    let question = context.clinical_question().map(defuse_reserved_labels);
    if let Some(question) = &question {
        prompt.push_str(&format!("CLINICAL QUESTION: {question}\n\n"));
    }

    prompt.push_str(&format!(
        "REPORT REQUIREMENTS:\n{}\n\n",
        narrative_for(context.report_template)
    ));

    if profile.systematic_checklist {
        prompt.push_str("SYSTEMATIC EVALUATION REQUIRED FOR:\n");
        for section in sections_for(context.scan_type) {
            prompt.push_str(&format!("- {section}\n"));
        }
        prompt.push('\n');
    }

    if !context.attachments.is_empty() {
        prompt.push_str("UPLOADED FILES FOR ANALYSIS:\n");
        for (i, file) in context.attachments.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {} ({})\n",
                i + 1,
                defuse_reserved_labels(&file.name),
                format_file_size(file.size_bytes)
            ));
        }
        prompt.push('\n');
    }

    if let Some(instructions) = context.instructions() {
        prompt.push_str(&format!(
            "ADDITIONAL INSTRUCTIONS:\n{}\n\n",
            defuse_reserved_labels(instructions)
        ));
    }

    // Caller text is substituted last so braces inside it are never expanded.
    let skeleton = REPORT_OUTPUT_SKELETON
        .replace("{scan_type}", &scan_upper)
        .replace("{date}", &date)
        .replace("{time}", &time)
        .replace("{technique}", technique_for(context.scan_type))
        .replace(
            "{clinical_history}",
            question.as_deref().unwrap_or(CLINICAL_HISTORY_PLACEHOLDER),
        );
    prompt.push_str(&skeleton);

    prompt
}

/// Short request used when structured prompting is turned off. The custom
/// system prompt has no preamble to attach to here and is not emitted.
fn build_simple(context: &PromptContext) -> String {
    let mut prompt = format!("{SIMPLE_PROMPT_HEADING}\n\n");
    prompt.push_str(&format!(
        "Scan Type: {}\n",
        context.scan_type.as_str().to_uppercase()
    ));
    prompt.push_str(&format!(
        "Report Template: {}\n\n",
        context.report_template.as_str()
    ));

    if let Some(question) = context.clinical_question() {
        prompt.push_str(&format!(
            "Clinical Question: {}\n\n",
            defuse_reserved_labels(question)
        ));
    }

    if !context.attachments.is_empty() {
        prompt.push_str(&format!(
            "Number of uploaded files: {}\n",
            context.attachments.len()
        ));
        for (i, file) in context.attachments.iter().enumerate() {
            prompt.push_str(&format!(
                "File {}: {} ({})\n",
                i + 1,
                defuse_reserved_labels(&file.name),
                format_file_size(file.size_bytes)
            ));
        }
        prompt.push('\n');
    }

    if let Some(instructions) = context.instructions() {
        prompt.push_str(&format!(
            "Additional Instructions: {}\n\n",
            defuse_reserved_labels(instructions)
        ));
    }

    prompt.push_str(SIMPLE_PROMPT_CLOSING);
    prompt
}
