use anyhow::Result;
use world_property::workflows::legal::stage_catalog;

pub struct StagesCommand;

impl StagesCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self) -> Result<()> {
        println!("📜 LEGAL WORKFLOW STAGES");
        println!("========================");
        for (position, step) in stage_catalog().iter().enumerate() {
            println!("{}. {:<20} {}", position + 1, step.stage, step.description);
        }
        println!();
        println!("💡 Cases move one stage at a time; re-applying the current stage is a no-op.");
        Ok(())
    }
}
