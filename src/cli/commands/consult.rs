use anyhow::Result;
use world_property::config::WorldPropertyConfig;
use world_property::legal_ai::{consult_with_timeout, CannedLegalAiClient, ConsultationRequest};

use super::build_service;

pub struct ConsultCommand {
    pub case_id: String,
    pub country: String,
    pub context: Option<String>,
}

impl ConsultCommand {
    pub async fn execute(&self, config: &WorldPropertyConfig) -> Result<()> {
        let service = build_service(config).await?;
        let status = service.status(&self.case_id).await?;

        let request = ConsultationRequest {
            case_id: self.case_id.clone(),
            stage: status.record.state.stage,
            country_code: self.country.trim().to_uppercase(),
            context_summary: self.context.clone().unwrap_or_default(),
        };

        print!("🤖 Consulting legal assistant... ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let client = CannedLegalAiClient::new(config.legal_ai.simulated_latency());
        let response = match consult_with_timeout(&client, &request, config.legal_ai.timeout()).await {
            Ok(response) => {
                println!("✅");
                response
            }
            Err(e) => {
                println!("❌");
                return Err(e.into());
            }
        };

        println!();
        println!("❓ CLARIFYING QUESTIONS:");
        for question in &response.clarifying_questions {
            println!("   • {}", question);
        }
        println!();
        println!("📋 READINESS: {}", response.readiness_summary);
        println!("➡️  Recommended next stage: {}", response.recommended_next_stage);
        Ok(())
    }
}
