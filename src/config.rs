use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for World Property
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorldPropertyConfig {
    /// Legal case state persistence
    pub store: StoreConfig,
    /// Audit trail destination
    pub audit: AuditConfig,
    /// Currency conversion settings
    pub fx: FxConfig,
    /// Legal AI consultation settings
    pub legal_ai: LegalAiConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Database settings (used by the sqlite backend)
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory holding one JSON file per case (file backend)
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Append audit events to this JSON lines file; logs only when unset
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FxConfig {
    /// How long a fetched rate table is reused
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LegalAiConfig {
    pub timeout_ms: u64,
    /// Delay of the offline canned client
    pub simulated_latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for WorldPropertyConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::File,
                directory: PathBuf::from(".world-property/cases"),
            },
            audit: AuditConfig {
                log_path: Some(PathBuf::from(".world-property/audit.jsonl")),
            },
            fx: FxConfig {
                cache_ttl_seconds: 3600,
            },
            legal_ai: LegalAiConfig {
                timeout_ms: 10_000,
                simulated_latency_ms: 500,
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
            },
            database: Some(DatabaseConfig {
                url: "sqlite://.world-property/world-property.db".to_string(),
                max_connections: 5,
                auto_migrate: true,
            }),
        }
    }
}

impl FxConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl LegalAiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl WorldPropertyConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (world-property.toml, .world-property-rc)
    /// 3. Environment variables (WORLD_PROPERTY_<SECTION>__<KEY>)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`load`](Self::load) with config files resolved against `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let toml_path = dir.join("world-property.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".world-property-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("WORLD_PROPERTY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
