use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::intake::OraclePolicy;
use crate::matching::embedding::DEFAULT_EMBEDDING_DIMS;

/// Stage-3 OCR tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub enabled: bool,
    pub pdftoppm_bin: String,
    pub tesseract_bin: String,
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pdftoppm_bin: "pdftoppm".to_string(),
            tesseract_bin: "tesseract".to_string(),
            dpi: 300,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Nothing is required: without an oracle key the service runs in local mode.
#[derive(Debug, Clone)]
pub struct Config {
    pub oracle_api_key: Option<String>,
    pub oracle_timeout_secs: u64,
    pub oracle_max_attempts: u32,
    pub corpus_path: Option<PathBuf>,
    pub ocr: OcrConfig,
    pub embedding_dims: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oracle_api_key: None,
            oracle_timeout_secs: 30,
            oracle_max_attempts: 3,
            corpus_path: None,
            ocr: OcrConfig::default(),
            embedding_dims: DEFAULT_EMBEDDING_DIMS,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let ocr_defaults = OcrConfig::default();

        Ok(Config {
            oracle_api_key: lookup("CREDX_ORACLE_API_KEY")
                .or_else(|| lookup("ANTHROPIC_API_KEY"))
                .filter(|key| !key.trim().is_empty()),
            oracle_timeout_secs: parse_or(
                &lookup,
                "CREDX_ORACLE_TIMEOUT_SECS",
                defaults.oracle_timeout_secs,
            )?,
            oracle_max_attempts: parse_or(
                &lookup,
                "CREDX_ORACLE_MAX_ATTEMPTS",
                defaults.oracle_max_attempts,
            )?,
            corpus_path: lookup("CREDX_CORPUS_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            ocr: OcrConfig {
                enabled: parse_or(&lookup, "CREDX_OCR_ENABLED", ocr_defaults.enabled)?,
                pdftoppm_bin: lookup("CREDX_PDFTOPPM_BIN").unwrap_or(ocr_defaults.pdftoppm_bin),
                tesseract_bin: lookup("CREDX_TESSERACT_BIN").unwrap_or(ocr_defaults.tesseract_bin),
                dpi: ocr_defaults.dpi,
            },
            embedding_dims: parse_or(&lookup, "CREDX_EMBEDDING_DIMS", defaults.embedding_dims)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }

    pub fn oracle_policy(&self) -> OraclePolicy {
        OraclePolicy {
            timeout: Duration::from_secs(self.oracle_timeout_secs),
            max_attempts: self.oracle_max_attempts.max(1),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value (got '{raw}')")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.oracle_api_key, None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.embedding_dims, 256);
        assert!(config.ocr.enabled);
        assert_eq!(config.oracle_policy(), OraclePolicy::default());
    }

    #[test]
    fn test_oracle_key_falls_back_to_anthropic_key() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "sk-fallback")]).unwrap();
        assert_eq!(config.oracle_api_key.as_deref(), Some("sk-fallback"));

        let config = config_from(&[
            ("CREDX_ORACLE_API_KEY", "sk-primary"),
            ("ANTHROPIC_API_KEY", "sk-fallback"),
        ])
        .unwrap();
        assert_eq!(config.oracle_api_key.as_deref(), Some("sk-primary"));
    }

    #[test]
    fn test_overrides_parse() {
        let config = config_from(&[
            ("CREDX_ORACLE_TIMEOUT_SECS", "5"),
            ("CREDX_ORACLE_MAX_ATTEMPTS", "0"),
            ("CREDX_OCR_ENABLED", "false"),
            ("CREDX_CORPUS_PATH", "/data/jobs.json"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert!(!config.ocr.enabled);
        assert_eq!(config.port, 9000);
        assert_eq!(config.corpus_path, Some(PathBuf::from("/data/jobs.json")));
        let policy = config.oracle_policy();
        assert_eq!(policy.timeout, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_malformed_numbers_are_errors() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config_from(&[("CREDX_EMBEDDING_DIMS", "-4")]).is_err());
    }
}
