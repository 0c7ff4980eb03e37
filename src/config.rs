// src/config.rs
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use crate::drivers::MonitorError;
/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "EEG_MONITOR_CONFIG";
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Hardware,
    Simulation,
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub chunk_size: usize,
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub refresh_interval_ms: u64,
    /// Amplitude units to millivolts. 3.3 V reference over a 10-bit range.
    pub voltage_scale: f64,
    pub source: SourceMode,
    /// Case-insensitive substring of the input device name.
    pub device_name: Option<String>,
    pub window_title: String,
    pub window_size: [f32; 2],
    pub icon_path: Option<PathBuf>,
    pub read_timeout_ms: u64,
}
impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            sample_rate_hz: 50_000,
            channels: 1,
            refresh_interval_ms: 1,
            voltage_scale: 3.3 / 1024.0,
            source: SourceMode::Hardware,
            device_name: None,
            window_title: "EEG Monitoring by Neurazum".to_owned(),
            window_size: [1200.0, 800.0],
            icon_path: None,
            read_timeout_ms: 2000,
        }
    }
}
impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: MonitorConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.chunk_size == 0 {
            return Err(MonitorError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.sample_rate_hz == 0 {
            return Err(MonitorError::InvalidConfig("sample_rate_hz must be > 0".into()));
        }
        if self.channels == 0 {
            return Err(MonitorError::InvalidConfig("channels must be > 0".into()));
        }
        if !self.voltage_scale.is_finite() {
            return Err(MonitorError::InvalidConfig("voltage_scale must be finite".into()));
        }
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_match_capture_constants() {
        let config = MonitorConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.sample_rate_hz, 50_000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.refresh_interval_ms, 1);
        assert!((config.voltage_scale - 0.00322265625).abs() < 1e-15);
        assert!(config.validate().is_ok());
    }
    #[test]
    fn partial_json_fills_in_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"chunk_size": 512, "source": "simulation"}"#).unwrap();
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.source, SourceMode::Simulation);
        assert_eq!(config.sample_rate_hz, 50_000);
        assert_eq!(config.window_title, "EEG Monitoring by Neurazum");
    }
    #[test]
    fn invalid_values_are_rejected() {
        let config = MonitorConfig {
            chunk_size: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
        let config = MonitorConfig {
            voltage_scale: f64::NAN,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn load_reads_file_and_reports_bad_json() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("eeg_monitor_good_{}.json", std::process::id()));
        std::fs::write(&good, r#"{"refresh_interval_ms": 5}"#).unwrap();
        assert_eq!(MonitorConfig::load(&good).unwrap().refresh_interval_ms, 5);
        let bad = dir.join(format!("eeg_monitor_bad_{}.json", std::process::id()));
        std::fs::write(&bad, "{ not json").unwrap();
        let err = MonitorConfig::load(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
        std::fs::remove_file(good).ok();
        std::fs::remove_file(bad).ok();
    }
    #[test]
    fn from_env_defaults_without_variable_and_reports_missing_file() {
        std::env::remove_var(CONFIG_ENV);
        let config = MonitorConfig::from_env().unwrap();
        assert_eq!(config.chunk_size, MonitorConfig::default().chunk_size);
        assert_eq!(config.source, SourceMode::Hardware);
        let missing = std::env::temp_dir().join(format!(
            "eeg_monitor_missing_{}.json",
            std::process::id()
        ));
        std::env::set_var(CONFIG_ENV, &missing);
        let result = MonitorConfig::from_env();
        std::env::remove_var(CONFIG_ENV);
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("reading config"), "{err:#}");
    }
}
