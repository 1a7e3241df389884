use anyhow::{bail, Result};
use std::path::PathBuf;
use world_property::domain::{validate_playbook, LegalPlaybook};

pub struct ValidatePlaybookCommand {
    pub path: PathBuf,
}

impl ValidatePlaybookCommand {
    pub async fn execute(&self) -> Result<()> {
        let playbook = LegalPlaybook::from_toml_file(&self.path)?;
        let report = validate_playbook(&playbook);

        if !report.success() {
            println!("❌ Playbook {} has {} issue(s):", self.path.display(), report.issues.len());
            for issue in &report.issues {
                println!("   • {}", issue);
            }
            bail!("playbook validation failed");
        }

        println!("✅ Playbook for {} is valid", playbook.country_code);
        println!("   ⏱️  Typical timeline: {} days", playbook.typical_timeline_days);
        println!("   📄 Required documents: {}", playbook.required_documents.len());
        let gaps = playbook.coverage_gaps();
        if gaps.is_empty() {
            println!("   🧭 Covers every workflow stage");
        } else {
            let names: Vec<_> = gaps.iter().map(|stage| stage.as_str()).collect();
            println!("   🧭 Skips: {}", names.join(", "));
        }
        Ok(())
    }
}
