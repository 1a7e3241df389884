use anyhow::{bail, Result};
use world_property::config::WorldPropertyConfig;
use world_property::domain::{Offer, WorkflowStage};
use world_property::service::ServiceError;
use world_property::workflows::legal::step_for;
use world_property::workflows::TransitionOutcome;

use super::build_service;

pub struct OpenCommand {
    pub offer: Offer,
    pub actor: Option<String>,
}

impl OpenCommand {
    pub async fn execute(&self, config: &WorldPropertyConfig) -> Result<()> {
        println!("📝 Opening legal case for offer {}...", self.offer.id);

        let service = build_service(config).await?;
        match service.open_case(&self.offer, self.actor.as_deref()).await {
            Ok(case) => {
                println!("✅ Legal case opened");
                println!("   🆔 Case: {}", case.id);
                println!("   🏠 Property: {}", case.property_id);
                println!("   📍 Stage: {}", case.stage);
                println!();
                println!("💡 Next: wp advance {} {}", case.id, step_after(&case.stage));
                Ok(())
            }
            Err(ServiceError::Validation(e)) => {
                println!("❌ Offer is not valid:");
                for issue in &e.issues {
                    println!("   • {}", issue);
                }
                bail!("offer validation failed")
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub struct AdvanceCommand {
    pub case_id: String,
    pub target: String,
    pub actor: Option<String>,
}

impl AdvanceCommand {
    pub async fn execute(&self, config: &WorldPropertyConfig) -> Result<()> {
        let service = build_service(config).await?;
        let outcome = match service
            .advance(&self.case_id, &self.target, self.actor.as_deref())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) if e.is_conflict() => {
                println!("⚠️  Case {} changed while advancing; run the command again", self.case_id);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        match outcome {
            TransitionOutcome::Applied { previous_stage, state } if previous_stage == state.stage => {
                println!("ℹ️  Case {} is already at {}", state.case_id, state.stage);
                Ok(())
            }
            TransitionOutcome::Applied { previous_stage, state } => {
                println!("✅ Case {} advanced: {} → {}", state.case_id, previous_stage, state.stage);
                println!("   📋 {}", step_for(state.stage).description);
                Ok(())
            }
            TransitionOutcome::Rejected { state, reason } => {
                println!("❌ Transition rejected: {}", reason);
                println!("   📍 Case {} remains at {}", state.case_id, state.stage);
                bail!("transition rejected")
            }
        }
    }
}

pub struct StatusCommand {
    pub case_id: Option<String>,
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &WorldPropertyConfig) -> Result<()> {
        let service = build_service(config).await?;

        let Some(case_id) = &self.case_id else {
            let cases = service.list_cases().await?;
            if self.json {
                println!("{}", serde_json::to_string_pretty(&cases)?);
                return Ok(());
            }
            println!("📊 LEGAL CASES ({})", cases.len());
            println!("================");
            if cases.is_empty() {
                println!("📋 No cases yet");
                println!("   💡 Open one with: wp open --offer-id <id> --property-id <id> --amount <minor units>");
            }
            for record in cases {
                println!(
                    "🔹 {} - {} (v{}, updated {})",
                    record.state.case_id,
                    record.state.stage,
                    record.version,
                    record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            return Ok(());
        };

        let status = service.status(case_id).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&status.record)?);
            return Ok(());
        }

        let stage = status.record.state.stage;
        println!("📊 CASE {}", case_id);
        println!("   📍 Stage: {} ({}/{})", stage, stage.index() + 1, WorkflowStage::ALL.len());
        println!("   📋 {}", status.step.description);
        println!("   🔢 Version: {}", status.record.version);
        println!("   🕒 Updated: {}", status.record.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        if stage.is_terminal() {
            println!("   🎉 Purchase complete");
        } else {
            println!("   ➡️  Next: {}", step_after(&stage));
        }
        Ok(())
    }
}

fn step_after(stage: &WorkflowStage) -> String {
    stage
        .next()
        .map(|next| next.to_string())
        .unwrap_or_else(|| "none".to_string())
}
