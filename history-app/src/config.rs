use std::{fs, path::PathBuf};

use history_core::batch::BatchPolicy;
use serde::{Deserialize, Serialize};

use crate::result::Result;

pub const CONFIG_VAR: &str = "HISTORY_CONFIG";
pub const DATABASE_VAR: &str = "HISTORY_DATABASE";
pub const OWNER_VAR: &str = "HISTORY_OWNER";
pub const POLICY_VAR: &str = "HISTORY_POLICY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: PathBuf,
    pub policy: BatchPolicy,
    pub owner: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("hands.db"),
            policy: BatchPolicy::default(),
            owner: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database: Option<PathBuf>,
    policy: Option<BatchPolicy>,
    owner: Option<String>,
}

/// Defaults, then the TOML file named by `HISTORY_CONFIG`, then the
/// individual environment variables.
pub fn load() -> Result<Config> {
    load_with(|name| std::env::var(name).ok())
}

pub fn load_with(var: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(path) = var(CONFIG_VAR).filter(|path| !path.is_empty()) {
        let content = fs::read_to_string(&path)
            .map_err(|err| format!("config: cannot read '{path}': {err}"))?;
        config.apply(toml::from_str(&content)?);
    }

    if let Some(database) = var(DATABASE_VAR).filter(|v| !v.is_empty()) {
        config.database = PathBuf::from(database);
    }
    if let Some(owner) = var(OWNER_VAR).filter(|v| !v.is_empty()) {
        config.owner = Some(owner);
    }
    if let Some(policy) = var(POLICY_VAR).filter(|v| !v.is_empty()) {
        let Some(policy) = BatchPolicy::from_str(&policy) else {
            return Err(format!("config: invalid {POLICY_VAR} '{policy}'").into());
        };
        config.policy = policy;
    }

    Ok(config)
}

impl Config {
    fn apply(&mut self, file: FileConfig) {
        if let Some(database) = file.database {
            self.database = database;
        }
        if let Some(policy) = file.policy {
            self.policy = policy;
        }
        if file.owner.is_some() {
            self.owner = file.owner;
        }
    }
}
