use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "wp")]
#[command(about = "World Property legal workflow for property offers")]
#[command(long_about = "World Property tracks a buyer's legal journey from an accepted offer to completion. \
                       Open a case with 'wp open', then move it forward one stage at a time with 'wp advance'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the legal workflow stages in order
    Stages,
    /// Open a legal case for an offer
    Open {
        /// Offer identifier
        #[arg(long, help = "Identifier of the offer the case is opened for")]
        offer_id: String,
        /// Property identifier
        #[arg(long, help = "Identifier of the property being purchased")]
        property_id: String,
        /// Offer amount in minor units
        #[arg(long, help = "Offer amount in minor units (pence, cents)", allow_negative_numbers = true)]
        amount: i64,
        /// ISO 4217 currency code
        #[arg(long, default_value = "GBP", help = "Three-letter currency code of the amount")]
        currency: String,
        /// Who is opening the case
        #[arg(long, help = "Actor recorded in the audit trail")]
        actor: Option<String>,
    },
    /// Move a case to the next stage (or re-apply its current stage)
    Advance {
        /// Case identifier
        case_id: String,
        /// Target stage identifier, e.g. AIConsultation
        target: String,
        /// Who is advancing the case
        #[arg(long, help = "Actor recorded in the audit trail")]
        actor: Option<String>,
    },
    /// Show one case, or every case when no id is given
    Status {
        /// Case identifier
        case_id: Option<String>,
        /// Print machine-readable JSON
        #[arg(long, help = "Print the stored record as JSON")]
        json: bool,
    },
    /// Convert an amount between currencies using the configured rate table
    Convert {
        /// Amount in major units
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Source currency code
        from: String,
        /// Target currency code
        to: String,
    },
    /// Ask the legal assistant for a readiness brief on a case
    Consult {
        /// Case identifier
        case_id: String,
        /// Jurisdiction of the property
        #[arg(long, default_value = "GB", help = "Two-letter country code of the property")]
        country: String,
        /// Free-text context passed to the assistant
        #[arg(long, help = "Short summary of the buyer's situation")]
        context: Option<String>,
    },
    /// Country legal playbook tools
    Playbook {
        #[command(subcommand)]
        command: PlaybookCommands,
    },
}

#[derive(Subcommand)]
pub enum PlaybookCommands {
    /// Check a playbook TOML file against the workflow rules
    Validate {
        /// Path to the playbook file
        path: PathBuf,
    },
}
