use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dedup::LinkKind;
use crate::retry::RetryPolicy;

/// Name of the directory under the download root holding both state files.
pub const DEFAULT_STATE_DIR_NAME: &str = ".download_state";

/// Retry policy parameters (`[retry]` in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of Fetcher attempts per task (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 10,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            // Out-of-range values (inf, huge) keep the default delay.
            base_delay: Duration::try_from_secs_f64(self.base_delay_secs.max(0.0))
                .unwrap_or(RetryPolicy::default().base_delay),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// `[dedup]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub enabled: bool,
    /// How later sharers of a URL are materialized.
    pub mode: LinkKind,
    /// Used when a symlink is refused by the platform or permissions.
    pub symlink_fallback: LinkKind,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: LinkKind::Symlink,
            symlink_fallback: LinkKind::Copy,
        }
    }
}

/// `[fetcher]` section: argv templates for the process-backed fetcher.
/// `{url}`, `{stem}` and `{ext}` are substituted per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub video_command: Vec<String>,
    pub document_command: Vec<String>,
    pub folder_command: Vec<String>,
    pub timeout_secs: u64,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            video_command: argv(&[
                "yt-dlp",
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                "ja,en",
                "--skip-download",
                "--quiet",
                "--no-warnings",
                "-o",
                "{stem}.%(ext)s",
                "{url}",
            ]),
            document_command: argv(&["gdown", "--fuzzy", "--quiet", "-O", "{stem}{ext}", "{url}"]),
            folder_command: argv(&["gdown", "--folder", "--quiet", "-O", "{stem}_folder", "{url}"]),
            timeout_secs: 600,
        }
    }
}

/// Global configuration loaded from `~/.config/lecdl/config.toml`.
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LecdlConfig {
    /// Output root; sheet directories are created beneath it.
    pub download_dir: PathBuf,
    /// Directory for `download_db.json` and `url_dedup.json`.
    /// Defaults to `<download_dir>/.download_state`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    /// Worker-pool width (1 = sequential).
    pub workers: usize,
    /// Fixed pause after each real Fetcher call, in milliseconds.
    pub inter_task_delay_ms: u64,
    /// Character limit applied by filename sanitization.
    pub max_filename_len: usize,
    /// Sheets named here use the chapter layout; all others use the calendar layout.
    pub chapter_sheets: Vec<String>,
    pub retry: RetryConfig,
    pub dedup: DedupConfig,
    pub fetcher: FetcherConfig,
}

impl Default for LecdlConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            state_dir: None,
            workers: 1,
            inter_task_delay_ms: 500,
            max_filename_len: crate::naming::DEFAULT_MAX_LEN,
            chapter_sheets: vec!["コンテンツ".to_string()],
            retry: RetryConfig::default(),
            dedup: DedupConfig::default(),
            fetcher: FetcherConfig::default(),
        }
    }
}

impl LecdlConfig {
    /// Effective state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| self.download_dir.join(DEFAULT_STATE_DIR_NAME))
    }

    pub fn inter_task_delay(&self) -> Duration {
        Duration::from_millis(self.inter_task_delay_ms)
    }

    /// Applies per-invocation overrides (CLI flags) on top of the file values.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.download_dir {
            self.download_dir = dir.clone();
        }
        if let Some(dir) = &overrides.state_dir {
            self.state_dir = Some(dir.clone());
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers.max(1);
        }
        if let Some(mode) = overrides.dedup_mode {
            self.dedup.mode = mode;
        }
        if overrides.no_dedup {
            self.dedup.enabled = false;
        }
    }
}

/// Values given on the command line for a single invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub download_dir: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub dedup_mode: Option<LinkKind>,
    pub no_dedup: bool,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("lecdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LecdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = LecdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path, which must exist.
pub fn load_from_path(path: &Path) -> Result<LecdlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: LecdlConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
