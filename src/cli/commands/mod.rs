use anyhow::Result;
use std::sync::Arc;
use world_property::audit::{AuditSink, JsonLinesAuditSink, TracingAuditSink};
use world_property::config::WorldPropertyConfig;
use world_property::service::LegalWorkflowService;
use world_property::store::{open_store, LegalWorkflowStore};

pub mod case;
pub mod consult;
pub mod convert;
pub mod playbook;
pub mod stages;

pub type CliService = LegalWorkflowService<Arc<dyn LegalWorkflowStore>, Arc<dyn AuditSink>>;

/// Build the legal workflow service from configuration
pub async fn build_service(config: &WorldPropertyConfig) -> Result<CliService> {
    let store = open_store(config).await?;
    let audit: Arc<dyn AuditSink> = match &config.audit.log_path {
        Some(path) => Arc::new(JsonLinesAuditSink::new(path)),
        None => Arc::new(TracingAuditSink),
    };
    Ok(LegalWorkflowService::new(store, audit))
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🏠 World Property - Legal workflow for property offers");
    println!();
    println!("To get started:");
    println!("  📜 wp stages                  # See the legal workflow");
    println!("  📝 wp open --offer-id ...     # Open a case for an offer");
    println!("  ➡️  wp advance <case> <stage>  # Move a case forward");
    println!("  📊 wp status [case]           # Inspect cases");
    println!();
    println!("Tools:");
    println!("  💱 wp convert 1000 GBP EUR    # Convert between currencies");
    println!("  🤖 wp consult <case>          # Ask the legal assistant");
    println!("  📚 wp playbook validate <file>");
    println!();
    println!("💡 Start with 'wp stages' to see where a case can go.");
    Ok(())
}
