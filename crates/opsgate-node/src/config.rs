//! Node configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use opsgate_common::security::AuditSeverity;
use opsgate_common::Account;
use opsgate_consensus::GateConfig;

/// Default configuration file, overridable with `OPSGATE_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "opsgate.toml";

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Bootstrap authority (label or 0x-prefixed account)
    pub owner: String,
    /// Gate settings
    pub gate: GateConfig,
    /// Seed admins registered at startup
    pub admins: Vec<String>,
    /// Seed non-admin users registered at startup
    pub users: Vec<String>,
    /// Votes replayed after bootstrap, in order
    pub votes: Vec<ScriptedVote>,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Audit events below this severity are dropped
    pub audit_min_severity: AuditSeverity,
    /// Resume from this snapshot instead of deploying fresh
    pub restore_path: Option<String>,
    /// Write the final snapshot here instead of stdout
    pub snapshot_path: Option<String>,
}

/// One scripted `set_operating_status` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedVote {
    pub caller: String,
    pub value: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: "owner".to_string(),
            gate: GateConfig::default(),
            admins: Vec::new(),
            users: Vec::new(),
            votes: Vec::new(),
            log_filter: "info".to_string(),
            audit_min_severity: AuditSeverity::Info,
            restore_path: None,
            snapshot_path: None,
        }
    }
}

impl NodeConfig {
    /// Load configuration from `.env`, the config file, and `OPSGATE__*` variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let path =
            std::env::var("OPSGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("OPSGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("admins")
                    .with_list_parse_key("users"),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path))?;

        Self::from_settings(settings)
    }

    /// Deserialize and validate already-layered settings
    pub fn from_settings(settings: config::Config) -> Result<Self> {
        let cfg: Self = settings
            .try_deserialize()
            .context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.gate.threshold == 0 {
            bail!("gate.threshold must be at least 1");
        }
        if self.owner.trim().is_empty() {
            bail!("owner must not be empty");
        }
        Ok(())
    }

    pub fn owner_account(&self) -> Account {
        resolve_account(&self.owner)
    }
}

/// Parse a 0x-prefixed account, or derive one from a label
pub fn resolve_account(name: &str) -> Account {
    name.parse().unwrap_or_else(|_| Account::from_label(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<NodeConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        NodeConfig::from_settings(settings)
    }

    #[test]
    fn test_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.owner, "owner");
        assert_eq!(cfg.gate.threshold, 3);
        assert_eq!(cfg.audit_min_severity, AuditSeverity::Info);
        assert!(cfg.admins.is_empty());
        assert!(cfg.restore_path.is_none());
        assert!(cfg.snapshot_path.is_none());
    }

    #[test]
    fn test_full_file() {
        let cfg = parse(
            r#"
            owner = "deployer"
            admins = ["admin1", "admin2", "admin3"]
            users = ["alice"]
            audit_min_severity = "Warning"

            [gate]
            threshold = 2

            [[votes]]
            caller = "admin1"
            value = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.gate.threshold, 2);
        assert_eq!(cfg.audit_min_severity, AuditSeverity::Warning);
        assert_eq!(cfg.admins.len(), 3);
        assert_eq!(cfg.votes.len(), 1);
        assert!(!cfg.votes[0].value);
        assert_eq!(cfg.owner_account(), Account::from_label("deployer"));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = parse("[gate]\nthreshold = 0\n").unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_resolve_hex_account() {
        let account = Account::from_label("admin1");
        assert_eq!(resolve_account(&account.to_string()), account);
        assert_eq!(resolve_account("admin1"), account);
    }
}
