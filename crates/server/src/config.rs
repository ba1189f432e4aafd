use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use pumpslip_extract::model::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
use pumpslip_ocr::recognizer::{DEFAULT_OCR_URL, DEFAULT_TESSERACT_LANG};

/// Names the optional TOML file read before the environment is applied.
pub const CONFIG_PATH_VAR: &str = "PUMPSLIP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngine {
    /// OCR sidecar reached over HTTP.
    #[default]
    Http,
    /// In-process Tesseract; only usable in builds with the `tesseract` feature.
    Tesseract,
}

impl FromStr for OcrEngine {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(OcrEngine::Http),
            "tesseract" => Ok(OcrEngine::Tesseract),
            _ => Err(()),
        }
    }
}

/// Everything the server reads at startup.
///
/// Resolution order: built-in defaults, then the TOML file named by
/// `PUMPSLIP_CONFIG`, then individual environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub ollama_base_url: String,
    pub model: String,
    pub llm_timeout_secs: u64,
    pub places_api_key: Option<String>,
    pub places_timeout_secs: u64,
    pub places_language: String,
    pub ocr_engine: OcrEngine,
    pub ocr_url: String,
    pub ocr_timeout_secs: u64,
    pub ocr_lang: String,
    pub tessdata_path: Option<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            ollama_base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 120,
            places_api_key: None,
            places_timeout_secs: 10,
            places_language: "el".to_string(),
            ocr_engine: OcrEngine::Http,
            ocr_url: DEFAULT_OCR_URL.to_string(),
            ocr_timeout_secs: 60,
            ocr_lang: DEFAULT_TESSERACT_LANG.to_string(),
            tessdata_path: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Defaults, then `PUMPSLIP_CONFIG`, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Override fields from variables that are set. Blank values count as unset,
    /// except `GOOGLE_PLACES_API_KEY`, where a blank value switches lookup off.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("PUMPSLIP_BIND") {
            self.bind = v;
        }
        if let Some(v) = get("OLLAMA_BASE_URL") {
            self.ollama_base_url = v;
        }
        if let Some(v) = get("PUMPSLIP_MODEL") {
            self.model = v;
        }
        if let Some(v) = get("PUMPSLIP_LLM_TIMEOUT_SECS") {
            self.llm_timeout_secs = parse_env("PUMPSLIP_LLM_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = lookup("GOOGLE_PLACES_API_KEY") {
            let v = v.trim();
            self.places_api_key = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = get("PUMPSLIP_PLACES_TIMEOUT_SECS") {
            self.places_timeout_secs = parse_env("PUMPSLIP_PLACES_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = get("PUMPSLIP_PLACES_LANGUAGE") {
            self.places_language = v;
        }
        if let Some(v) = get("PUMPSLIP_OCR_ENGINE") {
            self.ocr_engine = v
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PUMPSLIP_OCR_ENGINE", value: v })?;
        }
        if let Some(v) = get("PUMPSLIP_OCR_URL") {
            self.ocr_url = v;
        }
        if let Some(v) = get("PUMPSLIP_OCR_TIMEOUT_SECS") {
            self.ocr_timeout_secs = parse_env("PUMPSLIP_OCR_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = get("PUMPSLIP_OCR_LANG") {
            self.ocr_lang = v;
        }
        if let Some(v) = get("TESSDATA_PREFIX") {
            self.tessdata_path = Some(v);
        }
        if let Some(v) = get("PUMPSLIP_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_env("PUMPSLIP_MAX_UPLOAD_BYTES", v)?;
        }
        Ok(())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn places_timeout(&self) -> Duration {
        Duration::from_secs(self.places_timeout_secs)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}

fn parse_env<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv { name, value })
}
