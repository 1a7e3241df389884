// Country legal playbooks - required documents, checks, risk flags and fees per jurisdiction
// A playbook may skip optional stages but must keep canonical order and both endpoints

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::legal::WorkflowStage;
use crate::validation::ValidationReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalPlaybook {
    pub country_code: String,
    pub stages: Vec<WorkflowStage>,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub standard_checks: Vec<String>,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    pub typical_timeline_days: u32,
    #[serde(default)]
    pub fee_categories: Vec<String>,
}

impl LegalPlaybook {
    /// Load a playbook from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read playbook {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse playbook {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Canonical stages this playbook does not cover
    pub fn coverage_gaps(&self) -> Vec<WorkflowStage> {
        WorkflowStage::ALL
            .into_iter()
            .filter(|stage| !self.stages.contains(stage))
            .collect()
    }

    pub fn covers_all_stages(&self) -> bool {
        self.coverage_gaps().is_empty()
    }
}

pub fn validate_playbook(playbook: &LegalPlaybook) -> ValidationReport {
    let mut report = ValidationReport::new();

    let code = &playbook.country_code;
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        report.push("country_code", format!("'{}' is not a two-letter uppercase country code", code));
    }

    if playbook.stages.is_empty() {
        report.push("stages", "must list at least one stage");
    } else {
        let mut seen = HashSet::new();
        for stage in &playbook.stages {
            if !seen.insert(*stage) {
                report.push("stages", format!("duplicate stage {}", stage));
            }
        }
        if !playbook.stages.windows(2).all(|pair| pair[0] < pair[1]) {
            report.push("stages", "must follow the canonical workflow order");
        }
        if playbook.stages.first() != Some(&WorkflowStage::OfferCreated) {
            report.push("stages", "must start at OfferCreated");
        }
        if playbook.stages.last() != Some(&WorkflowStage::Completion) {
            report.push("stages", "must end at Completion");
        }
    }

    if playbook.typical_timeline_days == 0 {
        report.push("typical_timeline_days", "must be greater than zero");
    }

    for (field, entries) in [
        ("required_documents", &playbook.required_documents),
        ("standard_checks", &playbook.standard_checks),
        ("risk_flags", &playbook.risk_flags),
        ("fee_categories", &playbook.fee_categories),
    ] {
        if entries.iter().any(|entry| entry.trim().is_empty()) {
            report.push(field, "must not contain blank entries");
        }
    }

    report
}
