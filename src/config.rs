use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Aliawan
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AliawanConfig {
    /// Cloud account and endpoint settings
    pub provider: ProviderConfig,
    /// Load balancer defaults
    pub slb: SlbConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Access key id (usually set via ALIBABA_CLOUD_ACCESS_KEY_ID)
    pub access_key_id: Option<String>,
    /// Access key secret (usually set via ALIBABA_CLOUD_ACCESS_KEY_SECRET)
    pub access_key_secret: Option<String>,
    /// Region all operations run against
    pub region_id: String,
    /// ECS OpenAPI endpoint
    pub ecs_endpoint: String,
    /// ESS (auto scaling) OpenAPI endpoint
    pub ess_endpoint: String,
    /// SLB OpenAPI endpoint
    pub slb_endpoint: String,
    /// Instance metadata service endpoint
    pub metadata_endpoint: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlbConfig {
    /// Load balancer the VServer groups live on; required for the slb command
    pub load_balancer_id: Option<String>,
    /// Port used when --slbport is not passed
    pub default_port: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level for the tracing subscriber
    pub log_level: String,
    /// Emit logs as JSON instead of human-readable lines
    pub json_logs: bool,
}

impl Default for AliawanConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig {
                access_key_id: None, // Read from env vars by load()
                access_key_secret: None,
                region_id: "cn-hangzhou".to_string(),
                ecs_endpoint: "https://ecs.aliyuncs.com".to_string(),
                ess_endpoint: "https://ess.aliyuncs.com".to_string(),
                slb_endpoint: "https://slb.aliyuncs.com".to_string(),
                metadata_endpoint: "http://100.100.100.200".to_string(),
            },
            slb: SlbConfig {
                load_balancer_id: None,
                default_port: None,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl AliawanConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (aliawan.toml, .aliawan-rc)
    /// 3. Environment variables (prefixed with ALIAWAN_)
    pub fn load() -> Result<Self> {
        let defaults = AliawanConfig::default();
        let mut builder = Config::builder()
            .add_source(Config::try_from(&defaults)?);

        if Path::new("aliawan.toml").exists() {
            builder = builder.add_source(File::with_name("aliawan"));
        }

        if Path::new(".aliawan-rc").exists() {
            builder = builder.add_source(File::with_name(".aliawan-rc"));
        }

        // Nested keys use a double-underscore separator so multi-word field
        // names survive the split: ALIAWAN_PROVIDER__REGION_ID maps to
        // provider.region_id, ALIAWAN_SLB__DEFAULT_PORT to slb.default_port.
        builder = builder.add_source(
            Environment::with_prefix("ALIAWAN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut aliawan_config: AliawanConfig = config.try_deserialize()?;

        // Credentials follow the provider's conventional variable names when
        // not set through files or ALIAWAN_-prefixed variables.
        if aliawan_config.provider.access_key_id.is_none() {
            if let Ok(key_id) = std::env::var("ALIBABA_CLOUD_ACCESS_KEY_ID") {
                aliawan_config.provider.access_key_id = Some(key_id);
            }
        }
        if aliawan_config.provider.access_key_secret.is_none() {
            if let Ok(secret) = std::env::var("ALIBABA_CLOUD_ACCESS_KEY_SECRET") {
                aliawan_config.provider.access_key_secret = Some(secret);
            }
        }

        Ok(aliawan_config)
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
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<AliawanConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = AliawanConfig::load_env_file();
        AliawanConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static AliawanConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_endpoints() {
        let cfg = AliawanConfig::default();
        assert_eq!(cfg.provider.region_id, "cn-hangzhou");
        assert_eq!(cfg.provider.ecs_endpoint, "https://ecs.aliyuncs.com");
        assert_eq!(cfg.provider.ess_endpoint, "https://ess.aliyuncs.com");
        assert_eq!(cfg.provider.slb_endpoint, "https://slb.aliyuncs.com");
        assert_eq!(cfg.provider.metadata_endpoint, "http://100.100.100.200");
    }

    #[test]
    fn defaults_leave_credentials_and_slb_unset() {
        let cfg = AliawanConfig::default();
        assert!(cfg.provider.access_key_id.is_none());
        assert!(cfg.provider.access_key_secret.is_none());
        assert!(cfg.slb.load_balancer_id.is_none());
        assert!(cfg.slb.default_port.is_none());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = AliawanConfig::default();
        let serialized = toml::to_string_pretty(&cfg).unwrap();
        let parsed: AliawanConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.provider.region_id, cfg.provider.region_id);
        assert_eq!(parsed.observability.log_level, "info");
    }

    #[test]
    fn env_overrides_reach_nested_fields() {
        std::env::set_var("ALIAWAN_PROVIDER__REGION_ID", "eu-central-1");
        std::env::set_var("ALIAWAN_SLB__DEFAULT_PORT", "8080");

        let cfg = AliawanConfig::load().unwrap();

        std::env::remove_var("ALIAWAN_PROVIDER__REGION_ID");
        std::env::remove_var("ALIAWAN_SLB__DEFAULT_PORT");

        assert_eq!(cfg.provider.region_id, "eu-central-1");
        assert_eq!(cfg.slb.default_port.as_deref(), Some("8080"));
    }

    #[test]
    fn save_to_file_writes_readable_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliawan.toml");

        let mut cfg = AliawanConfig::default();
        cfg.slb.load_balancer_id = Some("lb-1".to_string());
        cfg.save_to_file(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: AliawanConfig = toml::from_str(&written).unwrap();
        assert_eq!(parsed.slb.load_balancer_id.as_deref(), Some("lb-1"));
    }
}
