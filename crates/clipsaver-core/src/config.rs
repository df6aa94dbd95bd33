//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, `config.toml`, `CLIPSAVER_*`
//! environment variables. CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clipsaver_media::EncodeFormat;
use clipsaver_token::{CostModel, DEFAULT_COST_PER_1K};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SaverError, SaverResult};
use crate::fingerprint::FingerprintKind;
use crate::watch::OutputMode;

/// Directory under the home directory holding the ledger and config.
pub const APP_DIR: &str = ".ai_image_token_saver";

/// Ledger file name inside [`APP_DIR`].
pub const LEDGER_FILE: &str = "quick_log.json";

/// Config file name inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Base directory for ClipSaver state, `~/.ai_image_token_saver`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(APP_DIR))
}

/// Which side effect follows an accepted image with savings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Leave the clipboard alone and only report.
    #[default]
    Report,
    /// Put the optimized image back on the clipboard.
    Replace,
    /// Save the optimized file and copy its path.
    Save,
}

impl FromStr for OutputKind {
    type Err = SaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "report" => Ok(OutputKind::Report),
            "replace" | "clipboard" => Ok(OutputKind::Replace),
            "save" | "folder" => Ok(OutputKind::Save),
            other => Err(SaverError::config(format!("unknown output mode '{}'", other))),
        }
    }
}

/// ClipSaver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_ms: u64,
    pub cooldown_ms: u64,
    pub error_backoff_factor: u32,
    pub quality: u8,
    pub target_format: EncodeFormat,
    pub cost_per_1k: f64,
    pub ledger_path: PathBuf,
    pub fingerprint: FingerprintKind,
    pub mode: OutputKind,
    pub folder: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            cooldown_ms: 3000,
            error_backoff_factor: 2,
            quality: 80,
            target_format: EncodeFormat::Webp,
            cost_per_1k: DEFAULT_COST_PER_1K,
            ledger_path: app_dir().join(LEDGER_FILE),
            fingerprint: FingerprintKind::Sampled,
            mode: OutputKind::Report,
            folder: None,
        }
    }
}

impl Settings {
    /// Load settings from `path` (or the default config file) and the
    /// process environment.
    ///
    /// A missing default config file is fine; an explicitly named one must exist.
    pub fn load(path: Option<&Path>) -> SaverResult<Self> {
        let mut settings = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(SaverError::config(format!("config file not found: {}", p.display())));
                }
                Self::from_file(p)?
            }
            None => {
                let default_path = app_dir().join(CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> SaverResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(settings)
    }

    /// Override fields from `CLIPSAVER_*` variables, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> SaverResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_env(&lookup, "CLIPSAVER_QUALITY")? {
            self.quality = v;
        }
        if let Some(v) = parse_env(&lookup, "CLIPSAVER_COST_PER_1K")? {
            self.cost_per_1k = v;
        }
        if let Some(v) = parse_env(&lookup, "CLIPSAVER_POLL_INTERVAL_MS")? {
            self.poll_interval_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "CLIPSAVER_COOLDOWN_MS")? {
            self.cooldown_ms = v;
        }
        if let Some(v) = lookup("CLIPSAVER_LEDGER_PATH").filter(|v| !v.trim().is_empty()) {
            self.ledger_path = PathBuf::from(v);
        }
        Ok(())
    }

    /// Check invariants. Quality above 100 is clamped, not rejected.
    pub fn validate(mut self) -> SaverResult<Self> {
        if self.poll_interval_ms == 0 {
            return Err(SaverError::validation("poll_interval_ms must be greater than zero"));
        }
        if !self.cost_per_1k.is_finite() || self.cost_per_1k < 0.0 {
            return Err(SaverError::validation("cost_per_1k must be a non-negative number"));
        }
        if self.target_format.is_lossless() {
            return Err(SaverError::validation(format!(
                "target_format must be lossy, got {}",
                self.target_format
            )));
        }
        self.error_backoff_factor = self.error_backoff_factor.max(1);
        self.quality = self.quality.min(100);
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Sleep after a failed tick. Saturates instead of overflowing.
    pub fn error_backoff(&self) -> Duration {
        self.poll_interval()
            .checked_mul(self.error_backoff_factor)
            .unwrap_or(Duration::MAX)
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.cost_per_1k)
    }

    /// Resolve the configured side effect. Save mode without a folder
    /// writes under `~/.ai_image_token_saver/images`.
    pub fn output_mode(&self) -> OutputMode {
        match self.mode {
            OutputKind::Report => OutputMode::Report,
            OutputKind::Replace => OutputMode::Replace,
            OutputKind::Save => OutputMode::Save {
                folder: self.folder.clone().unwrap_or_else(|| app_dir().join("images")),
            },
        }
    }
}

fn parse_env<T, F>(lookup: &F, key: &str) -> SaverResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SaverError::config(format!("{}={:?}: {}", key, raw, e))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));
        assert_eq!(settings.cooldown(), Duration::from_secs(3));
        assert_eq!(settings.error_backoff(), Duration::from_secs(2));
        assert_eq!(settings.quality, 80);
        assert_eq!(settings.target_format, EncodeFormat::Webp);
        assert!(settings.ledger_path.ends_with(".ai_image_token_saver/quick_log.json"));
        assert_eq!(settings.output_mode(), OutputMode::Report);
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            quality = 60
            target_format = "jpeg"
            mode = "save"
            folder = "/tmp/shots"
            "#,
        )
        .unwrap();

        assert_eq!(settings.quality, 60);
        assert_eq!(settings.target_format, EncodeFormat::Jpeg);
        assert_eq!(settings.poll_interval_ms, 1000);
        assert_eq!(
            settings.output_mode(),
            OutputMode::Save {
                folder: PathBuf::from("/tmp/shots")
            }
        );
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "quality = \"high\"").unwrap();

        assert!(matches!(Settings::from_file(&path), Err(SaverError::ConfigParse(_))));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(SaverError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                ("CLIPSAVER_QUALITY", "55"),
                ("CLIPSAVER_COST_PER_1K", "0.01"),
                ("CLIPSAVER_LEDGER_PATH", "/tmp/ledger.json"),
                ("CLIPSAVER_COOLDOWN_MS", " 500 "),
            ]))
            .unwrap();

        assert_eq!(settings.quality, 55);
        assert_eq!(settings.cost_per_1k, 0.01);
        assert_eq!(settings.ledger_path, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(settings.cooldown_ms, 500);
        assert_eq!(settings.poll_interval_ms, 1000);
    }

    #[test]
    fn test_bad_env_value_is_error() {
        let mut settings = Settings::default();
        let result = settings.apply_env(env(&[("CLIPSAVER_QUALITY", "lots")]));
        assert!(matches!(result, Err(SaverError::Config(_))));
    }

    #[test]
    fn test_error_backoff_saturates() {
        let settings = Settings {
            poll_interval_ms: u64::MAX,
            error_backoff_factor: u32::MAX,
            ..Settings::default()
        }
        .validate()
        .unwrap();
        assert_eq!(settings.error_backoff(), Duration::MAX);
    }

    #[test]
    fn test_validate() {
        let clamped = Settings {
            quality: 250,
            error_backoff_factor: 0,
            ..Settings::default()
        }
        .validate()
        .unwrap();
        assert_eq!(clamped.quality, 100);
        assert_eq!(clamped.error_backoff_factor, 1);

        let zero_interval = Settings {
            poll_interval_ms: 0,
            ..Settings::default()
        };
        assert!(zero_interval.validate().is_err());

        let negative_cost = Settings {
            cost_per_1k: -1.0,
            ..Settings::default()
        };
        assert!(negative_cost.validate().is_err());

        let lossless_target = Settings {
            target_format: EncodeFormat::Png,
            ..Settings::default()
        };
        assert!(lossless_target.validate().is_err());
    }

    #[test]
    fn test_output_kind_parsing() {
        assert_eq!("report".parse::<OutputKind>().unwrap(), OutputKind::Report);
        assert_eq!("Replace".parse::<OutputKind>().unwrap(), OutputKind::Replace);
        assert_eq!("save".parse::<OutputKind>().unwrap(), OutputKind::Save);
        assert!("print".parse::<OutputKind>().is_err());
    }
}
