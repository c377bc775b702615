//! Config and data directory resolution.
//!
//! Config lookup order:
//! 1. `--config <path>` from the CLI
//! 2. `CONSULT_TRIAGE_CONFIG`
//! 3. `$XDG_CONFIG_HOME/consult_triage/config.json`
//! 4. the platform config dir (`dirs::config_dir()`)
//! 5. embedded defaults
//!
//! A file named by 1 or 2 must exist. Files at 3 or 4 are optional, but once
//! found they must parse and validate.

use crate::policy::Policy;
use crate::validate::validate_policy;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_CONFIG: &str = "CONSULT_TRIAGE_CONFIG";
pub const ENV_DATA_DIR: &str = "CONSULT_TRIAGE_DATA";
const DIR_NAME: &str = "consult_triage";
const CONFIG_FILE: &str = "config.json";

/// Errors from config resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config {}: {summary}", path.display())]
    Invalid { path: PathBuf, summary: String },

    #[error("failed to resolve data directory")]
    DataDirUnavailable,
}

impl From<ConfigError> for ct_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid { .. } => ct_common::Error::InvalidPolicy(err.to_string()),
            other => ct_common::Error::Config(other.to_string()),
        }
    }
}

/// Paths supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Where the active policy came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Cli(PathBuf),
    Env(PathBuf),
    Xdg(PathBuf),
    Platform(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Cli(p)
            | ConfigSource::Env(p)
            | ConfigSource::Xdg(p)
            | ConfigSource::Platform(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

/// A policy together with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub policy: Policy,
    pub source: ConfigSource,
}

impl ResolvedConfig {
    pub fn using_defaults(&self) -> bool {
        self.source == ConfigSource::Defaults
    }
}

/// Resolve the active policy from the process environment.
pub fn resolve_config(paths: &ConfigPaths) -> Result<ResolvedConfig, ConfigError> {
    resolve_config_with(paths, |key| std::env::var(key).ok(), dirs::config_dir())
}

/// Resolve the active policy with an injected environment.
pub fn resolve_config_with<F>(
    paths: &ConfigPaths,
    env: F,
    platform_config_dir: Option<PathBuf>,
) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = &paths.config_file {
        return load(ConfigSource::Cli(path.clone()));
    }

    if let Some(path) = env(ENV_CONFIG).filter(|p| !p.is_empty()) {
        return load(ConfigSource::Env(PathBuf::from(path)));
    }

    let candidates = [
        env("XDG_CONFIG_HOME")
            .filter(|p| !p.is_empty())
            .map(|xdg| ConfigSource::Xdg(PathBuf::from(xdg).join(DIR_NAME).join(CONFIG_FILE))),
        platform_config_dir
            .map(|base| ConfigSource::Platform(base.join(DIR_NAME).join(CONFIG_FILE))),
    ];

    for source in candidates.into_iter().flatten() {
        if source.path().is_some_and(Path::exists) {
            return load(source);
        }
        debug!(source = ?source, "no config at default location");
    }

    debug!("using embedded default policy");
    Ok(ResolvedConfig {
        policy: Policy::default(),
        source: ConfigSource::Defaults,
    })
}

fn load(source: ConfigSource) -> Result<ResolvedConfig, ConfigError> {
    let Some(path) = source.path() else {
        return Ok(ResolvedConfig {
            policy: Policy::default(),
            source,
        });
    };
    let policy = load_policy_file(path)?;
    info!(path = %path.display(), "loaded policy");
    Ok(ResolvedConfig { policy, source })
}

/// Read, parse and validate a policy file.
pub fn load_policy_file(path: &Path) -> Result<Policy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let policy: Policy = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let validation = validate_policy(&policy);
    if !validation.is_valid() {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            summary: validation.summary(),
        });
    }

    Ok(policy)
}

/// Resolve the data directory from the process environment.
pub fn resolve_data_dir(paths: &ConfigPaths) -> Result<PathBuf, ConfigError> {
    resolve_data_dir_with(paths, |key| std::env::var(key).ok(), dirs::data_dir())
}

/// Resolve the data directory with an injected environment.
pub fn resolve_data_dir_with<F>(
    paths: &ConfigPaths,
    env: F,
    platform_data_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // 1) Explicit override
    if let Some(dir) = &paths.data_dir {
        return Ok(dir.clone());
    }

    // 2) Environment
    if let Some(dir) = env(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    // 3) XDG_DATA_HOME
    if let Some(xdg) = env("XDG_DATA_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(xdg).join(DIR_NAME));
    }

    // 4) Platform default
    platform_data_dir
        .map(|base| base.join(DIR_NAME))
        .ok_or(ConfigError::DataDirUnavailable)
}
