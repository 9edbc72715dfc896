//! Organ Findings Synthesizer — reorganises chest radiograph findings per organ.
//!
//! Each category pulls the sentence around its first keyword hit. Categories
//! with no usable sentence get a fixed, clinically normal default.

use crate::report::extractor::MIN_SECTION_CHARS;

/// One organ system in the chest radiograph FINDINGS layout.
#[derive(Debug, Clone, Copy)]
pub struct OrganCategory {
    pub header: &'static str,
    pub keywords: &'static [&'static str],
    pub default_finding: &'static str,
}

/// Fixed category order; headers match the xray section list in the catalog.
pub const CHEST_ORGANS: &[OrganCategory] = &[
    OrganCategory {
        header: "LUNGS",
        keywords: &["lung", "pulmonary", "chest"],
        default_finding: "The lungs are well expanded and clear bilaterally. No consolidation, mass, or nodule is identified. The lung volumes are normal. No pleural effusion or pneumothorax is present.",
    },
    OrganCategory {
        header: "HEART",
        keywords: &["heart", "cardiac", "cardio"],
        default_finding: "The cardiac silhouette is normal in size and configuration. The cardiothoracic ratio measures approximately 0.45.",
    },
    OrganCategory {
        header: "MEDIASTINUM",
        keywords: &["mediastinum", "mediastinal", "trachea"],
        default_finding: "The mediastinal contours are within normal limits. The trachea is midline. The hilar structures appear normal bilaterally.",
    },
    OrganCategory {
        header: "BONES",
        keywords: &["bone", "skeletal", "rib", "spine"],
        default_finding: "The visualized osseous structures are intact. No acute fracture or destructive lesion is identified.",
    },
    OrganCategory {
        header: "SOFT TISSUES",
        keywords: &["soft tissue", "tissue"],
        default_finding: "The soft tissues are unremarkable.",
    },
    OrganCategory {
        header: "PLEURA",
        keywords: &["pleura", "pleural"],
        default_finding: "The pleural surfaces are smooth. The costophrenic angles are sharp bilaterally.",
    },
];

/// Returns the sentence around the first hit of a keyword, bounded by the
/// surrounding periods. Keywords are tried in list order; a sentence shorter
/// than `MIN_SECTION_CHARS` moves on to the next keyword.
pub fn extract_organ_finding(text: &str, keywords: &[&str]) -> Option<String> {
    let lower = text.to_ascii_lowercase();

    keywords.iter().find_map(|kw| {
        let hit = lower.find(&kw.to_ascii_lowercase())?;
        let start = text[..hit].rfind('.').map_or(0, |p| p + 1);
        let end = text[hit..].find('.').map_or(text.len(), |p| hit + p);
        let sentence = text[start..end].trim();

        if sentence.chars().count() < MIN_SECTION_CHARS {
            None
        } else if sentence.ends_with(['!', '?']) {
            Some(sentence.to_string())
        } else {
            Some(format!("{sentence}."))
        }
    })
}

/// Builds the per-organ FINDINGS body: one `HEADER:` line and one finding per
/// category, blocks separated by a blank line.
pub fn synthesize_organ_findings(findings_text: &str) -> String {
    CHEST_ORGANS
        .iter()
        .map(|organ| {
            let finding = extract_organ_finding(findings_text, organ.keywords)
                .unwrap_or_else(|| organ.default_finding.to_string());
            format!("{}:\n{}", organ.header, finding)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
