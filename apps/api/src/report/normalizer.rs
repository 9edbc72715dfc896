//! Response Normalizer — turns arbitrary model output into the fixed report schema.
//!
//! Stages: markup cleanup → keyword extraction (findings, impression,
//! recommendations) → reassembly with synthesized or default content wherever
//! extraction came up empty.
//!
//! Guarantees for any input: one title, one `FINDINGS:` header, one
//! `IMPRESSION:` header, no `*`, no `#`, no `__`.
//!
//! Not idempotent: the emitted headers are themselves extraction keywords, so
//! feeding a normalized report back through can shift section boundaries.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::report::catalog::{scan_profile, technique_for, ScanType};
use crate::report::clock::{report_date, report_time};
use crate::report::context::PromptContext;
use crate::report::extractor::{
    clean_markup, defuse_reserved_labels, extract_section, split_sentences, FINDINGS_KEYWORDS,
    IMPRESSION_KEYWORDS, MIN_SECTION_CHARS, RECOMMENDATION_KEYWORDS, REPORT_TITLE,
    SECTION_BOUNDARIES,
};
use crate::report::impression::synthesize_impression;
use crate::report::organs::synthesize_organ_findings;
use crate::report::prompts::CLINICAL_HISTORY_PLACEHOLDER;

/// Where a section's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionSource {
    /// Located in the model output by keyword.
    Extracted,
    /// Built from the cleaned output by a synthesizer.
    Synthesized,
    /// Fixed fallback text.
    Default,
}

/// A normalized report plus provenance of its variable sections.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedReport {
    pub text: String,
    pub findings_source: SectionSource,
    pub impression_source: SectionSource,
    pub has_recommendations: bool,
}

/// Normalizes `raw_text` into the fixed report layout as of `now`.
pub fn normalize(raw_text: &str, context: &PromptContext, now: NaiveDateTime) -> String {
    normalize_report(raw_text, context, now).text
}

/// Same as [`normalize`] but also reports which path produced each section.
pub fn normalize_report(
    raw_text: &str,
    context: &PromptContext,
    now: NaiveDateTime,
) -> NormalizedReport {
    let profile = scan_profile(context.scan_type);
    let cleaned = clean_markup(raw_text);

    let findings = extract_section(&cleaned, FINDINGS_KEYWORDS, SECTION_BOUNDARIES);
    let impression = extract_section(&cleaned, IMPRESSION_KEYWORDS, SECTION_BOUNDARIES);
    let recommendations = extract_section(&cleaned, RECOMMENDATION_KEYWORDS, SECTION_BOUNDARIES)
        .filter(|r| !r.trim().is_empty());

    // Organ synthesis only ever reads the FINDINGS section; without one the
    // organ defaults stand in.
    let (findings_body, findings_source) = match findings {
        Some(f) if profile.organ_synthesis => {
            (synthesize_organ_findings(&f), SectionSource::Extracted)
        }
        Some(f) => (f, SectionSource::Extracted),
        None if profile.organ_synthesis => (synthesize_organ_findings(""), SectionSource::Default),
        None => generic_findings(&cleaned, context.scan_type),
    };

    let (impression_body, impression_source) = match impression
        .as_deref()
        .map(strip_leading_punctuation)
        .filter(|s| !s.is_empty())
    {
        Some(s) => (s.to_string(), SectionSource::Extracted),
        None => match synthesize_impression(&cleaned) {
            Some(s) => (s, SectionSource::Synthesized),
            None => (
                profile.default_impression.to_string(),
                SectionSource::Default,
            ),
        },
    };

    let date = report_date(now);
    let clinical_history = context
        .clinical_question()
        .map(clean_markup)
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| CLINICAL_HISTORY_PLACEHOLDER.to_string());
    let examination = match profile.examination_label {
        Some(label) => label.to_string(),
        None => format!("{} Imaging Study", context.scan_type.as_str().to_uppercase()),
    };

    let mut report = String::with_capacity(2048);
    report.push_str(&format!("{REPORT_TITLE}\n\n"));

    report.push_str(&format!("EXAMINATION: {examination}\n"));
    report.push_str(&format!("DATE: {date}\n"));
    report.push_str(&format!("TIME: {}\n\n", report_time(now)));

    report.push_str("PATIENT INFORMATION:\n");
    report.push_str("- Name: [Patient Name]\n");
    report.push_str("- DOB: [Date of Birth]\n");
    report.push_str("- MRN: [Medical Record Number]\n");
    report.push_str("- Sex: [M/F]\n\n");

    report.push_str(&format!(
        "CLINICAL HISTORY:\n{}\n\n",
        defuse_reserved_labels(&clinical_history)
    ));
    report.push_str(&format!(
        "TECHNIQUE:\n{}\n\n",
        technique_for(context.scan_type)
    ));
    report.push_str("COMPARISON:\n[Previous studies if available]\n\n");

    report.push_str(&format!(
        "FINDINGS:\n\n{}\n\n",
        defuse_reserved_labels(&findings_body)
    ));
    report.push_str(&format!(
        "IMPRESSION:\n\n{}\n\n",
        defuse_reserved_labels(&impression_body)
    ));

    if let Some(r) = &recommendations {
        report.push_str(&format!(
            "RECOMMENDATIONS:\n{}\n\n",
            defuse_reserved_labels(r)
        ));
    }

    report.push_str("Radiologist: [Radiologist Name], MD\n");
    report.push_str(&format!("Date Reported: {date}\n"));
    report.push_str("Signature: [Electronic Signature]\n");

    NormalizedReport {
        text: report,
        findings_source,
        impression_source,
        has_recommendations: recommendations.is_some(),
    }
}

/// Sentence-level fallback for modalities without organ synthesis.
fn generic_findings(cleaned: &str, scan_type: ScanType) -> (String, SectionSource) {
    let kept: Vec<String> = split_sentences(cleaned)
        .into_iter()
        .filter(|s| s.chars().count() >= MIN_SECTION_CHARS)
        .filter(|s| !s.to_lowercase().contains("disclaimer"))
        .map(|s| format!("{s}."))
        .collect();

    if kept.is_empty() {
        (
            format!("No acute abnormalities identified on the current {scan_type} examination."),
            SectionSource::Default,
        )
    } else {
        (kept.join(" "), SectionSource::Synthesized)
    }
}

fn strip_leading_punctuation(s: &str) -> &str {
    s.trim_start_matches(|c: char| matches!(c, '.' | ',' | ';' | ':') || c.is_whitespace())
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::catalog::ReportTemplate;
    use crate::report::organs::CHEST_ORGANS;
    use chrono::NaiveDate;

    const SKELETON_REPLY: &str = r#"# RADIOLOGY REPORT

**EXAMINATION:** XRAY examination
**DATE:** October 15, 2026

**CLINICAL HISTORY:**
Cough.

## FINDINGS:

**LUNGS:** Patchy airspace opacity in the right lower lobe.
**HEART:** Heart size is normal.

## IMPRESSION:

Right lower lobe pneumonia.

**RECOMMENDATIONS:**
Follow-up radiograph in 6 weeks to document resolution.
"#;

    const CHATTY_REPLY: &str = "Sure! Here is my read of the scan. The liver measures 15 cm and is homogeneous. \
        No focal hepatic lesion. Disclaimer: this is not a diagnosis. Gallbladder is unremarkable.";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn xray() -> PromptContext {
        PromptContext::new(ScanType::Xray, ReportTemplate::Comprehensive)
    }

    /// Text between `header` and the next blank-line-delimited header.
    fn section<'a>(report: &'a str, header: &str, next: &str) -> &'a str {
        let start = report.find(header).expect("header present") + header.len();
        let end = report[start..].find(next).map_or(report.len(), |p| start + p);
        report[start..end].trim()
    }

    #[test]
    fn test_empty_xray_reply_yields_full_default_skeleton() {
        let report = normalize("", &xray(), now());

        let expected_findings = CHEST_ORGANS
            .iter()
            .map(|o| format!("{}:\n{}", o.header, o.default_finding))
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(section(&report, "FINDINGS:", "IMPRESSION:"), expected_findings);
        assert_eq!(
            section(&report, "IMPRESSION:", "Radiologist:"),
            "Normal chest radiograph."
        );
        assert!(report.starts_with("RADIOLOGY REPORT\n\nEXAMINATION: Chest X-Ray, PA and Lateral Views\n"));
        assert!(report.contains("DATE: October 15, 2026\nTIME: 09:05\n"));
        assert!(!report.contains("RECOMMENDATIONS:"));
    }

    #[test]
    fn test_whitespace_only_reply_for_ct_uses_defaults() {
        let ctx = PromptContext::new(ScanType::Ct, ReportTemplate::Emergency);
        let normalized = normalize_report("  \n\t ", &ctx, now());
        let report = &normalized.text;

        assert!(report.contains("EXAMINATION: CT Imaging Study\n"));
        assert_eq!(
            section(report, "FINDINGS:", "IMPRESSION:"),
            "No acute abnormalities identified on the current ct examination."
        );
        assert_eq!(
            section(report, "IMPRESSION:", "Radiologist:"),
            "No acute abnormalities identified."
        );
        assert_eq!(normalized.findings_source, SectionSource::Default);
        assert_eq!(normalized.impression_source, SectionSource::Default);
    }

    #[test]
    fn test_findings_and_impression_extracted_from_inline_reply() {
        let raw = "Findings: The lungs are clear. Impression: No acute cardiopulmonary process.";
        let normalized = normalize_report(raw, &xray(), now());

        let findings = section(&normalized.text, "FINDINGS:", "IMPRESSION:");
        assert!(findings.contains("LUNGS:\nThe lungs are clear."));
        assert_eq!(
            section(&normalized.text, "IMPRESSION:", "Radiologist:"),
            "No acute cardiopulmonary process."
        );
        assert_eq!(normalized.findings_source, SectionSource::Extracted);
        assert_eq!(normalized.impression_source, SectionSource::Extracted);
        assert!(!normalized.has_recommendations);
    }

    #[test]
    fn test_asterisks_stripped_from_cleaned_text() {
        assert_eq!(clean_markup("**LUNGS:** clear"), "LUNGS: clear");
        let report = normalize("**LUNGS:** clear", &xray(), now());
        assert!(!report.contains('*'));
    }

    #[test]
    fn test_xray_without_findings_section_keeps_organ_defaults() {
        let normalized = normalize_report(
            "Impression: Normal chest radiograph with no acute disease.",
            &xray(),
            now(),
        );

        let expected_findings = CHEST_ORGANS
            .iter()
            .map(|o| format!("{}:\n{}", o.header, o.default_finding))
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(
            section(&normalized.text, "FINDINGS:", "IMPRESSION:"),
            expected_findings
        );
        assert_eq!(normalized.findings_source, SectionSource::Default);
        assert_eq!(
            section(&normalized.text, "IMPRESSION:", "Radiologist:"),
            "Normal chest radiograph with no acute disease."
        );
    }

    #[test]
    fn test_extracted_impression_loses_leading_punctuation() {
        let normalized = normalize_report(
            "Findings: lungs are clear today. Impression: . Stable appearance of the chest.",
            &xray(),
            now(),
        );
        assert_eq!(
            section(&normalized.text, "IMPRESSION:", "Radiologist:"),
            "Stable appearance of the chest."
        );
        assert_eq!(normalized.impression_source, SectionSource::Extracted);
    }

    #[test]
    fn test_markdown_skeleton_reply_is_reassembled() {
        let normalized = normalize_report(SKELETON_REPLY, &xray(), now());
        let report = &normalized.text;

        assert!(report.contains("LUNGS:\nLUNGS: Patchy airspace opacity in the right lower lobe."));
        assert!(report.contains("HEART:\nHEART: Heart size is normal."));
        assert_eq!(
            section(report, "IMPRESSION:", "RECOMMENDATIONS:"),
            "Right lower lobe pneumonia."
        );
        assert!(report.contains(
            "RECOMMENDATIONS:\nradiograph in 6 weeks to document resolution.\n"
        ));
        assert!(normalized.has_recommendations);
    }

    #[test]
    fn test_generic_fallback_drops_disclaimers_and_short_sentences() {
        let ctx = PromptContext::new(ScanType::Ultrasound, ReportTemplate::Focused);
        let normalized = normalize_report(CHATTY_REPLY, &ctx, now());

        let findings = section(&normalized.text, "FINDINGS:", "IMPRESSION:");
        assert_eq!(
            findings,
            "Here is my read of the scan. The liver measures 15 cm and is homogeneous. \
             No focal hepatic lesion. Gallbladder is unremarkable."
        );
        assert_eq!(normalized.findings_source, SectionSource::Synthesized);
        assert_eq!(
            section(&normalized.text, "IMPRESSION:", "Radiologist:"),
            "Gallbladder is unremarkable."
        );
        assert_eq!(normalized.impression_source, SectionSource::Synthesized);
    }

    #[test]
    fn test_non_xray_uses_extracted_findings_verbatim() {
        let ctx = PromptContext::new(ScanType::Mri, ReportTemplate::Comprehensive);
        let raw = "Observations: T2 hyperintense lesion in left frontal lobe. Conclusion: likely demyelination.";
        let report = normalize(raw, &ctx, now());
        assert_eq!(
            section(&report, "FINDINGS:", "IMPRESSION:"),
            "T2 hyperintense lesion in left frontal lobe."
        );
        assert_eq!(
            section(&report, "IMPRESSION:", "Radiologist:"),
            "likely demyelination."
        );
    }

    #[test]
    fn test_clinical_history_placeholder_when_question_blank() {
        let report = normalize("whatever", &xray().with_clinical_question("   "), now());
        assert_eq!(
            section(&report, "CLINICAL HISTORY:", "TECHNIQUE:"),
            "[Clinical indication for examination]"
        );
    }

    #[test]
    fn test_clinical_history_uses_question() {
        let ctx = xray().with_clinical_question("Fever and **productive** cough");
        let report = normalize("", &ctx, now());
        assert_eq!(
            section(&report, "CLINICAL HISTORY:", "TECHNIQUE:"),
            "Fever and productive cough"
        );
    }

    #[test]
    fn test_recommendations_absent_without_keyword() {
        let report = normalize(
            "Findings: mild cardiomegaly. Impression: cardiomegaly without failure.",
            &xray(),
            now(),
        );
        assert!(!report.contains("RECOMMENDATIONS"));
    }

    #[test]
    fn test_structural_invariants_hold_for_hostile_inputs() {
        let inputs = [
            "",
            "   ",
            "#### ***",
            "FINDINGS: FINDINGS: FINDINGS: lungs are clear bilaterally.",
            "Findings: ok. FINDINGS: IMPRESSION: RADIOLOGY REPORT RADIOLOGY REPORT",
            "impression impression impression: IMPRESSION: normal heart size today",
            "__bold__ and ___more___ with # hashes ## and * stars *",
            "Recommendations: RECOMMENDATIONS: repeat FINDINGS: in a year",
            SKELETON_REPLY,
            CHATTY_REPLY,
        ];
        let questions = ["", "RADIOLOGY REPORT requested, FINDINGS: please #urgent"];

        for scan in ScanType::ALL {
            for raw in inputs {
                for question in questions {
                    let ctx = PromptContext::new(scan, ReportTemplate::Comprehensive)
                        .with_clinical_question(question);
                    let report = normalize(raw, &ctx, now());
                    let label = format!("{scan} / {raw:?} / {question:?}");

                    assert_eq!(report.matches(REPORT_TITLE).count(), 1, "{label}");
                    assert_eq!(report.matches("FINDINGS:").count(), 1, "{label}");
                    assert_eq!(report.matches("IMPRESSION:").count(), 1, "{label}");
                    assert!(report.matches("RECOMMENDATIONS:").count() <= 1, "{label}");
                    assert!(!report.contains('*'), "{label}");
                    assert!(!report.contains('#'), "{label}");
                    assert!(!report.contains("__"), "{label}");
                }
            }
        }
    }

    #[test]
    fn test_sections_appear_in_fixed_order() {
        let report = normalize(SKELETON_REPLY, &xray(), now());
        let order = [
            "RADIOLOGY REPORT",
            "EXAMINATION:",
            "DATE:",
            "TIME:",
            "PATIENT INFORMATION:",
            "CLINICAL HISTORY:",
            "TECHNIQUE:",
            "COMPARISON:",
            "FINDINGS:",
            "IMPRESSION:",
            "RECOMMENDATIONS:",
            "Radiologist:",
            "Date Reported:",
            "Signature:",
        ];
        let positions: Vec<usize> = order.iter().map(|h| report.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn test_renormalizing_output_is_not_idempotent() {
        let first = normalize(SKELETON_REPLY, &xray(), now());
        let second = normalize(&first, &xray(), now());
        // The emitted headers are valid extraction keywords, so the second pass
        // re-sectionizes its own output. Invariants still hold; content may shift.
        assert_eq!(second.matches("FINDINGS:").count(), 1);
        assert_eq!(second.matches("IMPRESSION:").count(), 1);
        assert_ne!(first, second);
    }
}
