//! Scorer configuration: TOML file, per-user default location, env overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScorerError, ScorerResult};
use crate::protocol::Markers;

/// Port override.
pub const ENV_PORT: &str = "AMRGEN_SCORER_PORT";
/// Model name override.
pub const ENV_MODEL: &str = "AMRGEN_SCORER_MODEL";
/// Scorer program override.
pub const ENV_PROGRAM: &str = "AMRGEN_SCORER_PROGRAM";

/// How to launch and talk to the scorer subprocess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Address the client listens on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the client listens on; `0` picks a free one.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Scorer executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the model name.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Pretrained model selector, passed as the last argument.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub markers: Markers,

    /// How long to wait for the scorer to connect, in milliseconds.
    #[serde(default = "default_accept_timeout_ms")]
    pub accept_timeout_ms: u64,

    /// How long to wait for one reply line, in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Relaunches allowed for a single batch before giving up.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    32000
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["nn_lm_client.py".to_string()]
}

fn default_model() -> String {
    "awd_lstm_lm_600".to_string()
}

fn default_accept_timeout_ms() -> u64 {
    120_000
}

fn default_read_timeout_ms() -> u64 {
    30_000
}

fn default_max_restarts() -> usize {
    2
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            program: default_program(),
            args: default_args(),
            model: default_model(),
            markers: Markers::default(),
            accept_timeout_ms: default_accept_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            max_restarts: default_max_restarts(),
        }
    }
}

impl ScorerConfig {
    /// Read a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ScorerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScorerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&content).map_err(|e| {
            ScorerError::Config(format!("invalid scorer TOML in {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded scorer config");
        Ok(config)
    }

    /// Load from `path`, else from the per-user config file if present, else
    /// defaults; then apply environment overrides.
    pub fn resolve(path: Option<&Path>) -> ScorerResult<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::config_file_path().filter(|p| p.exists()) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Per-user config file location.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "amrgen", "amrgen")
            .map(|dirs| dirs.config_dir().join("scorer.toml"))
    }

    /// Apply overrides from a variable lookup such as the process environment.
    pub fn with_overrides<F>(self, lookup: F) -> ScorerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ScorerError::Config(format!("{ENV_PORT}: invalid port '{raw}'")))?,
            None => self.port,
        };

        Ok(Self {
            port,
            model: lookup(ENV_MODEL).unwrap_or(self.model),
            program: lookup(ENV_PROGRAM).unwrap_or(self.program),
            ..self
        })
    }

    /// `host:port` of the listening endpoint.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ScorerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:32000");
        assert_eq!(config.model, "awd_lstm_lm_600");
        assert_eq!(config.markers.pad, "<pad>");
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scorer.toml");
        std::fs::write(
            &path,
            "port = 33000\nargs = [\"-u\", \"lm.py\"]\n\n[markers]\nbos = \"<s>\"\n",
        )
        .unwrap();

        let config = ScorerConfig::load(&path).unwrap();
        assert_eq!(config.port, 33000);
        assert_eq!(config.args, vec!["-u", "lm.py"]);
        assert_eq!(config.markers.bos, "<s>");
        assert_eq!(config.markers.eos, "<eos>");
        assert_eq!(config.max_restarts, 2);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scorer.toml");
        std::fs::write(&path, "port = \"many\"").unwrap();
        assert!(matches!(
            ScorerConfig::load(&path),
            Err(ScorerError::Config(_))
        ));
        assert!(matches!(
            ScorerConfig::load(&dir.path().join("absent.toml")),
            Err(ScorerError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [(ENV_PORT, "40000"), (ENV_MODEL, "big_lm")].into();
        let config = ScorerConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.port, 40000);
        assert_eq!(config.model, "big_lm");
        assert_eq!(config.program, "python3");

        let err = ScorerConfig::default()
            .with_overrides(|key| (key == ENV_PORT).then(|| "x".to_string()))
            .unwrap_err();
        assert!(matches!(err, ScorerError::Config(_)));
    }
}
