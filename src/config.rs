// File: src/config.rs
use crate::core::context::DisambiguationConfig;
use crate::core::prefix::PrefixTable;
use crate::core::types::LanguageScope;
use crate::error::{LinkerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub max_headwords: usize,
    pub scope: LanguageScope,
    /// Word to headword links that skip the lookup cascade.
    pub static_words: BTreeMap<String, String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_headwords: 3,
            scope: LanguageScope::Both,
            static_words: BTreeMap::new(),
        }
    }
}

/// Hebrew root service. The service tier is skipped without a `base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 2000,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Part-of-speech tagger. Tagging is unavailable without a `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    pub url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 10_000,
        }
    }
}

impl PosConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Replaces the built-in prefix table. Relative to the config file.
    pub prefix_table: Option<PathBuf>,
    pub disambiguation: DisambiguationConfig,
    pub ranking: RankingConfig,
    pub service: ServiceConfig,
    pub pos: PosConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config = toml_edit::de::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        if path.is_dir() {
            return Err(LinkerError::PathIsDirectory(path.to_path_buf()));
        }
        let mut config = Self::from_toml_str(&fs::read_to_string(path)?)?;
        if let (Some(table), Some(dir)) = (&config.prefix_table, path.parent()) {
            if table.is_relative() {
                config.prefix_table = Some(dir.join(table));
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.disambiguation;
        if !(d.weight > 0.0) {
            return Err(LinkerError::Config("disambiguation.weight must be positive".into()));
        }
        if !(d.boundary >= 0.0) {
            return Err(LinkerError::Config("disambiguation.boundary must not be negative".into()));
        }
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);
        if !in_unit(d.low_confidence) || !in_unit(d.high_confidence) || d.low_confidence >= d.high_confidence {
            return Err(LinkerError::Config(
                "confidence thresholds must satisfy 0 <= low < high <= 1".into(),
            ));
        }
        if self.service.timeout_ms == 0 {
            return Err(LinkerError::Config("service.timeout_ms must be positive".into()));
        }
        if self.pos.timeout_ms == 0 {
            return Err(LinkerError::Config("pos.timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// The configured prefix table, or the built-in one.
    pub fn prefix_table(&self) -> Result<PrefixTable> {
        match &self.prefix_table {
            Some(path) => PrefixTable::load(path),
            None => Ok(PrefixTable::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.disambiguation.weight, 1.2);
        assert_eq!(config.ranking.max_headwords, 3);
        assert_eq!(config.service.timeout(), Duration::from_millis(2000));
        assert!(config.service.base_url.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml_str(
            "[disambiguation]\nboundary = 0.05\n\n[ranking]\nscope = \"aramaic\"\n\n[service]\nbase_url = \"http://localhost:8080\"\n",
        )
        .unwrap();
        assert_eq!(config.disambiguation.boundary, 0.05);
        assert_eq!(config.disambiguation.weight, 1.2);
        assert_eq!(config.ranking.scope, LanguageScope::Aramaic);
        assert_eq!(config.service.max_retries, 2);
        assert_eq!(config.service.base_url.as_deref(), Some("http://localhost:8080"));
        assert!(config.pos.url.is_none());
    }

    #[test]
    fn test_static_words_and_pos_sections() {
        let config = Config::from_toml_str(
            "[ranking.static_words]\n\"מַאי\" = \"מַאי I\"\n\n[pos]\nurl = \"http://localhost:8000/yap/heb/joint\"\n",
        )
        .unwrap();
        assert_eq!(config.ranking.static_words.get("מַאי").map(String::as_str), Some("מַאי I"));
        assert_eq!(config.ranking.max_headwords, 3);
        assert_eq!(config.pos.timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_invalid_values() {
        for source in [
            "[disambiguation]\nweight = 0.0\n",
            "[disambiguation]\nboundary = -0.1\n",
            "[disambiguation]\nlow_confidence = 0.9\n",
            "[service]\ntimeout_ms = 0\n",
            "[pos]\ntimeout_ms = 0\n",
        ] {
            assert!(
                matches!(Config::from_toml_str(source), Err(LinkerError::Config(_))),
                "{}",
                source
            );
        }
        assert!(matches!(
            Config::from_toml_str("[ranking]\nscope = \"latin\"\n"),
            Err(LinkerError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        assert_eq!(Config::load(&missing).unwrap(), Config::default());

        let path = temp_dir.path().join("bavli.toml");
        fs::write(&path, "prefix_table = \"prefixes.toml\"\n[logging]\nlevel = \"debug\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.prefix_table, Some(temp_dir.path().join("prefixes.toml")));
        // the table itself does not exist
        assert!(config.prefix_table().is_err());

        assert!(matches!(
            Config::load(temp_dir.path()),
            Err(LinkerError::PathIsDirectory(_))
        ));
    }
}
