use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detect::sources::vendor::{
    DEFAULT_META_PREFIX, DEFAULT_META_SUFFIX, DEFAULT_VENDOR_NAME,
};
use crate::detect::{SourceRegistry, VendorMetaSource};
use crate::inspector::InspectorSettings;
use crate::overlay::{SaveCadence, DEFAULT_FONT_PATH, DEFAULT_SAVE_INTERVAL};

const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize, Default)]
struct InspectorConfigFile {
    capture_frames: Option<bool>,
    output_dir: Option<PathBuf>,
    save_interval: Option<u64>,
    font_path: Option<PathBuf>,
    run_timeout_secs: Option<u64>,
    metadata: Option<MetadataConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct MetadataConfigFile {
    prefix: Option<String>,
    suffix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InspectorConfig {
    pub capture_frames: bool,
    pub output_dir: PathBuf,
    pub save_interval: u64,
    pub font_path: PathBuf,
    pub run_timeout: Duration,
    pub metadata_prefix: String,
    pub metadata_suffix: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self::from_file(InspectorConfigFile::default())
    }
}

impl InspectorConfig {
    /// Defaults, then the file named by `FRAMEPROBE_CONFIG`, then environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("FRAMEPROBE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: InspectorConfigFile) -> Self {
        let metadata = file.metadata.unwrap_or_default();
        Self {
            capture_frames: file.capture_frames.unwrap_or(true),
            output_dir: file
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            save_interval: file.save_interval.unwrap_or(DEFAULT_SAVE_INTERVAL),
            font_path: file
                .font_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_PATH)),
            run_timeout: Duration::from_secs(
                file.run_timeout_secs.unwrap_or(DEFAULT_RUN_TIMEOUT_SECS),
            ),
            metadata_prefix: metadata
                .prefix
                .unwrap_or_else(|| DEFAULT_META_PREFIX.to_string()),
            metadata_suffix: metadata
                .suffix
                .unwrap_or_else(|| DEFAULT_META_SUFFIX.to_string()),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("FRAMEPROBE_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(path) = std::env::var("FRAMEPROBE_FONT_PATH") {
            if !path.trim().is_empty() {
                self.font_path = PathBuf::from(path);
            }
        }
        if let Ok(capture) = std::env::var("FRAMEPROBE_CAPTURE_FRAMES") {
            self.capture_frames = parse_bool(&capture).ok_or_else(|| {
                anyhow!("FRAMEPROBE_CAPTURE_FRAMES must be true/false, 1/0 or yes/no")
            })?;
        }
        if let Ok(timeout) = std::env::var("FRAMEPROBE_RUN_TIMEOUT_SECS") {
            let seconds: u64 = timeout.trim().parse().map_err(|_| {
                anyhow!("FRAMEPROBE_RUN_TIMEOUT_SECS must be an integer number of seconds")
            })?;
            self.run_timeout = Duration::from_secs(seconds);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.run_timeout.as_secs() == 0 {
            return Err(anyhow!("run timeout must be greater than zero"));
        }
        Ok(())
    }

    pub fn inspector_settings(&self) -> InspectorSettings {
        InspectorSettings {
            capture_frames: self.capture_frames,
            save_cadence: SaveCadence::every(self.save_interval),
        }
    }

    /// Registry with the vendor metadata source using the configured namespace.
    pub fn source_registry(&self) -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        registry.register(VendorMetaSource::new(
            DEFAULT_VENDOR_NAME,
            self.metadata_prefix.clone(),
            self.metadata_suffix.clone(),
        ));
        registry
    }
}

fn read_config_file(path: &Path) -> Result<InspectorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
