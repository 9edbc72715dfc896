//! Template Catalog — immutable per-modality and per-template data tables.
//!
//! Everything the prompt builder and the normalizer need to know about a scan
//! type or a report template lives here. Adding a modality or a template is an
//! edit to this file only: callers look profiles up, they never branch on
//! specific variants.

use std::fmt;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Keys
// ────────────────────────────────────────────────────────────────────────────

/// Imaging modality. `Xray` is the catalog default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    #[default]
    Xray,
    Ct,
    Mri,
    Ultrasound,
}

impl ScanType {
    pub const ALL: [ScanType; 4] = [
        ScanType::Xray,
        ScanType::Ct,
        ScanType::Mri,
        ScanType::Ultrasound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Xray => "xray",
            ScanType::Ct => "ct",
            ScanType::Mri => "mri",
            ScanType::Ultrasound => "ultrasound",
        }
    }

    /// Resolves a caller-supplied key, substituting `Xray` for anything unknown.
    pub fn resolve(raw: &str) -> Resolved<ScanType> {
        Resolved::lookup(raw, &Self::ALL, |s| s.as_str())
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative style requested from the model. Never changes the output schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTemplate {
    #[default]
    Comprehensive,
    Focused,
    Comparison,
    Emergency,
}

impl ReportTemplate {
    pub const ALL: [ReportTemplate; 4] = [
        ReportTemplate::Comprehensive,
        ReportTemplate::Focused,
        ReportTemplate::Comparison,
        ReportTemplate::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTemplate::Comprehensive => "comprehensive",
            ReportTemplate::Focused => "focused",
            ReportTemplate::Comparison => "comparison",
            ReportTemplate::Emergency => "emergency",
        }
    }

    /// Resolves a caller-supplied key, substituting `Comprehensive` for anything unknown.
    pub fn resolve(raw: &str) -> Resolved<ReportTemplate> {
        Resolved::lookup(raw, &Self::ALL, |t| t.as_str())
    }
}

impl fmt::Display for ReportTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving a free-form key against the catalog.
///
/// The legacy contract substitutes the default silently; this keeps the
/// substitution but lets callers see that it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub requested: String,
    pub fallback_applied: bool,
}

impl<T: Copy + Default> Resolved<T> {
    fn lookup(raw: &str, all: &[T], key: impl Fn(&T) -> &'static str) -> Self {
        let wanted = raw.trim();
        match all.iter().find(|v| key(*v).eq_ignore_ascii_case(wanted)) {
            Some(v) => Resolved {
                value: *v,
                requested: raw.to_string(),
                fallback_applied: false,
            },
            None => Resolved {
                value: T::default(),
                requested: raw.to_string(),
                fallback_applied: true,
            },
        }
    }
}

impl<T: fmt::Display> Resolved<T> {
    /// Human-readable note for callers when a default was substituted.
    pub fn warning(&self, field: &str) -> Option<String> {
        self.fallback_applied.then(|| {
            format!(
                "Unrecognized {field} '{}'; using '{}'",
                self.requested, self.value
            )
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scan type profiles
// ────────────────────────────────────────────────────────────────────────────

/// Static description of one imaging modality.
#[derive(Debug, Clone, Serialize)]
pub struct ScanProfile {
    /// Technique sentence, reproduced verbatim in prompt and report.
    pub technique: &'static str,
    /// Ordered systematic sections for this modality.
    pub sections: &'static [&'static str],
    /// Whether `sections` is sent to the model as a mandatory checklist.
    pub systematic_checklist: bool,
    /// Whether FINDINGS are reorganised per organ category.
    pub organ_synthesis: bool,
    /// Fixed EXAMINATION line; `None` renders `"<SCANTYPE> Imaging Study"`.
    pub examination_label: Option<&'static str>,
    /// IMPRESSION used when nothing can be extracted or synthesized.
    pub default_impression: &'static str,
    pub sample_questions: &'static [&'static str],
}

const GENERIC_IMPRESSION: &str = "No acute abnormalities identified.";

/// Returns the static profile for a scan type.
pub fn scan_profile(scan: ScanType) -> ScanProfile {
    match scan {
        ScanType::Xray => ScanProfile {
            technique: "Standard PA and lateral chest radiographs obtained in the upright position.",
            sections: &["LUNGS", "HEART", "MEDIASTINUM", "BONES", "SOFT TISSUES", "PLEURA"],
            systematic_checklist: true,
            organ_synthesis: true,
            examination_label: Some("Chest X-Ray, PA and Lateral Views"),
            default_impression: "Normal chest radiograph.",
            sample_questions: &[
                "Are there any signs of pneumonia, consolidation, or lung infection?",
                "Is there evidence of bone fractures or skeletal abnormalities?",
                "Are the heart size and cardiothoracic ratio within normal limits?",
                "Any signs of pneumothorax, pleural effusion, or lung collapse?",
                "Evaluate for signs of congestive heart failure or pulmonary edema",
                "Assess for foreign bodies or medical devices",
            ],
        },
        ScanType::Ct => ScanProfile {
            technique: "Contrast-enhanced CT examination performed according to standard protocol.",
            sections: &["TECHNIQUE", "FINDINGS", "CONTRAST", "ORGANS"],
            systematic_checklist: false,
            organ_synthesis: false,
            examination_label: None,
            default_impression: GENERIC_IMPRESSION,
            sample_questions: &[
                "Are there signs of internal bleeding or active hemorrhage?",
                "What is the extent and pattern of trauma-related injuries?",
                "Any evidence of organ damage, laceration, or contusion?",
                "Are there signs of infection, abscess, or inflammatory changes?",
                "Evaluate for bowel obstruction or perforation",
                "Assess vascular structures for aneurysm or dissection",
            ],
        },
        ScanType::Mri => ScanProfile {
            technique: "MRI examination performed with multiple sequences according to standard protocol.",
            sections: &["TECHNIQUE", "SEQUENCES", "FINDINGS", "SIGNAL_CHARACTERISTICS"],
            systematic_checklist: false,
            organ_synthesis: false,
            examination_label: None,
            default_impression: GENERIC_IMPRESSION,
            sample_questions: &[
                "Are there any brain lesions, tumors, or space-occupying masses?",
                "What are the findings regarding white matter signal changes?",
                "Is there evidence of acute stroke, hemorrhage, or ischemia?",
                "Any signs of inflammation, infection, or demyelinating disease?",
                "Evaluate ventricular size and any signs of hydrocephalus",
                "Assess for structural abnormalities or developmental variants",
            ],
        },
        ScanType::Ultrasound => ScanProfile {
            technique: "Real-time ultrasonographic examination performed according to standard protocol.",
            sections: &["TECHNIQUE", "FINDINGS", "MEASUREMENTS", "DOPPLER"],
            systematic_checklist: false,
            organ_synthesis: false,
            examination_label: None,
            default_impression: GENERIC_IMPRESSION,
            sample_questions: &[
                "Are there any abnormal masses, cysts, or lesions identified?",
                "Is the organ structure, size, and echogenicity within normal limits?",
                "Any signs of fluid accumulation or inflammatory changes?",
                "What are the measurements and dimensions of relevant structures?",
                "Evaluate blood flow patterns and vascular patency",
                "Assess for gallstones, kidney stones, or other calcifications",
            ],
        },
    }
}

pub fn technique_for(scan: ScanType) -> &'static str {
    scan_profile(scan).technique
}

pub fn sections_for(scan: ScanType) -> &'static [&'static str] {
    scan_profile(scan).sections
}

// ────────────────────────────────────────────────────────────────────────────
// Report template profiles
// ────────────────────────────────────────────────────────────────────────────

/// Static description of one narrative style.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub focus: &'static str,
    /// Instruction text injected under `REPORT REQUIREMENTS:`.
    pub narrative: &'static str,
}

/// Returns the static profile for a report template.
pub fn template_profile(template: ReportTemplate) -> TemplateProfile {
    match template {
        ReportTemplate::Comprehensive => TemplateProfile {
            name: "Comprehensive Report",
            description: "Complete systematic evaluation with detailed findings for all anatomical structures",
            focus: "thorough documentation of all findings",
            narrative: "Generate a complete, detailed radiology report with all standard sections. Include:\n\
                - Complete systematic evaluation of all anatomical structures\n\
                - Detailed findings for each organ system\n\
                - Comprehensive impression with differential considerations\n\
                - Specific recommendations for follow-up if indicated",
        },
        ReportTemplate::Focused => TemplateProfile {
            name: "Focused Analysis",
            description: "Targeted analysis emphasizing key pathological findings and clinical significance",
            focus: "specific abnormalities and their clinical relevance",
            narrative: "Generate a focused report emphasizing:\n\
                - Key pathological findings and their significance\n\
                - Clinical relevance of abnormal observations\n\
                - Targeted impression addressing the clinical question\n\
                - Specific actionable recommendations",
        },
        ReportTemplate::Comparison => TemplateProfile {
            name: "Comparison Study",
            description: "Systematic comparison with prior studies highlighting interval changes",
            focus: "progression, stability, or improvement of findings",
            narrative: "Generate a comparison report that:\n\
                - Systematically compares current findings with prior studies\n\
                - Highlights interval changes (improved, stable, worse)\n\
                - Documents progression or resolution of findings\n\
                - Provides timeline-based recommendations",
        },
        ReportTemplate::Emergency => TemplateProfile {
            name: "Emergency Assessment",
            description: "Urgent evaluation focusing on life-threatening conditions requiring immediate attention",
            focus: "critical findings needing emergent intervention",
            narrative: "Generate an urgent radiology report focusing on:\n\
                - Life-threatening conditions requiring immediate attention\n\
                - Critical findings that need emergent intervention\n\
                - Clear, direct language for urgent communication\n\
                - Immediate actionable recommendations for clinical team",
        },
    }
}

pub fn narrative_for(template: ReportTemplate) -> &'static str {
    template_profile(template).narrative
}

pub fn focus_for(template: ReportTemplate) -> &'static str {
    template_profile(template).focus
}
