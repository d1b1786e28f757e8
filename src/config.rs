//! Pipeline configuration, persisted as TOML.
//!
//! ```toml
//! [source]
//! dir = "data/trusted"
//!
//! [graph]
//! users = 100
//! keywords_per_topic = 15
//! keyword_match = "substring"
//! tbox = "docker-import/tbox.ttl"
//! abox = "docker-import/abox.ttl"
//!
//! [store]
//! server = "http://localhost:7200"
//! repository = "letstalk"
//!
//! [analysis]
//! model_dir = "data/kg"
//! triples = "data/triples.tsv"
//! ```
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisConfig;
use crate::assemble::{AssemblyOptions, KeywordMatch};
use crate::error::ConfigError;
use crate::store::StoreConfig;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "letstalk.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the collection files.
    #[serde(default = "default_source_dir")]
    pub dir: PathBuf,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("data/trusted")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: default_source_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Synthetic users to generate.
    #[serde(default = "default_users")]
    pub users: usize,
    #[serde(default = "default_keywords_per_topic")]
    pub keywords_per_topic: usize,
    #[serde(default)]
    pub keyword_match: KeywordMatch,
    /// Fixed RNG seed; unset draws a fresh seed per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_tbox")]
    pub tbox: PathBuf,
    #[serde(default = "default_abox")]
    pub abox: PathBuf,
}

fn default_users() -> usize {
    100
}
fn default_keywords_per_topic() -> usize {
    AssemblyOptions::default().keywords_per_topic
}
fn default_tbox() -> PathBuf {
    PathBuf::from("docker-import/tbox.ttl")
}
fn default_abox() -> PathBuf {
    PathBuf::from("docker-import/abox.ttl")
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            keywords_per_topic: default_keywords_per_topic(),
            keyword_match: KeywordMatch::default(),
            seed: None,
            tbox: default_tbox(),
            abox: default_abox(),
        }
    }
}

impl GraphConfig {
    pub fn to_assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            keywords_per_topic: self.keywords_per_topic,
            keyword_match: self.keyword_match,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl PipelineConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `letstalk.toml` if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    tracing::debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| serialize_error(path, e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "store.timeout_secs must be greater than zero".into(),
            });
        }
        if !self.store.server.starts_with("http://") && !self.store.server.starts_with("https://") {
            return Err(ConfigError::Invalid {
                message: format!(
                    "store.server must start with http:// or https://, got \"{}\"",
                    self.store.server
                ),
            });
        }
        self.analysis
            .request
            .validate()
            .map_err(|e| ConfigError::Invalid {
                message: format!("analysis.request: {e}"),
            })
    }
}

fn serialize_error(path: &Path, err: toml::ser::Error) -> ConfigError {
    ConfigError::Serialize {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.store.server, "http://localhost:7200");
        assert_eq!(config.graph.keywords_per_topic, 15);
        assert_eq!(config.analysis.request.eps, 4.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [graph]
            users = 5
            keyword_match = "whole_word"
            seed = 42

            [store]
            repository = "test"
            "#,
        )
        .unwrap();
        assert_eq!(config.graph.users, 5);
        assert_eq!(config.graph.keyword_match, KeywordMatch::WholeWord);
        assert_eq!(config.graph.seed, Some(42));
        assert_eq!(config.store.repository, "test");
        assert_eq!(config.store.timeout_secs, 60);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("conf/letstalk.toml");
        let mut config = PipelineConfig::default();
        config.graph.users = 7;
        config.save(&path).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn bad_server_is_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("letstalk.toml");
        std::fs::write(&path, "[store]\nserver = \"localhost:7200\"\n").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn serialization_failure_is_not_a_parse_error() {
        let cause = <toml::ser::Error as serde::ser::Error>::custom("unsupported value");
        let err = serialize_error(Path::new("letstalk.toml"), cause);
        assert!(matches!(&err, ConfigError::Serialize { message, .. } if message.contains("unsupported value")));
        assert!(err.to_string().starts_with("failed to serialize config"));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("letstalk.toml");
        std::fs::write(&path, "[graph\nusers = 1").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
