use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};
use directories::BaseDirs;

pub const DEFAULT_API_BASE: &str = "https://code-execution.learnyst.com/api/v2";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        Self::load_with_env(path, env::vars())
    }

    /// Read the rc file at `path`, then overlay the given environment.
    pub fn load_with_env<I>(path: &Path, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = default_map();

        // Read .codepadrc if exists
        if path.exists() {
            if let Ok(file) = fs::File::open(path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(|l| l.ok()) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in vars {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path: path.to_path_buf() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }

    pub fn log_path(&self) -> PathBuf {
        self.get_path("LOG_PATH").unwrap_or_else(|| {
            env::temp_dir().join("codepad").join("codepad.log")
        })
    }
}

/// Where a transport/protocol failure of an execution request is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureChannel {
    /// Console pane; the error pane keeps its previous content.
    #[default]
    Output,
    Error,
}

/// Which execution outcome wins when dispatches overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultPolicy {
    /// Outcomes of superseded dispatches are dropped.
    #[default]
    LastDispatch,
    /// Whatever arrives last overwrites the panes.
    LastArrival,
}

/// Typed view over [`Config`] used by the rest of the application.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base: String,
    pub request_timeout: Option<Duration>,
    pub default_language: String,
    pub default_version: String,
    pub failure_channel: FailureChannel,
    pub result_policy: ResultPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: None,
            default_language: "javascript".to_string(),
            default_version: "20.11.1".to_string(),
            failure_channel: FailureChannel::Output,
            result_policy: ResultPolicy::LastDispatch,
        }
    }
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let defaults = Settings::default();

        let api_base = match cfg.get("API_BASE_URL") {
            Some(v) if v != "default" && !v.trim().is_empty() => v.trim().trim_end_matches('/').to_string(),
            _ => defaults.api_base,
        };

        // 0 or unset leaves the transport default in place
        let request_timeout = cfg
            .get_u64("REQUEST_TIMEOUT")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let failure_channel = match cfg.get("FAILURE_CHANNEL").as_deref().map(str::trim) {
            None | Some("") | Some("output") => FailureChannel::Output,
            Some("error") => FailureChannel::Error,
            Some(other) => bail!("FAILURE_CHANNEL must be 'output' or 'error', got '{}'", other),
        };

        let result_policy = match cfg.get("RESULT_POLICY").as_deref().map(str::trim) {
            None | Some("") | Some("last-dispatch") => ResultPolicy::LastDispatch,
            Some("last-arrival") => ResultPolicy::LastArrival,
            Some(other) => bail!(
                "RESULT_POLICY must be 'last-dispatch' or 'last-arrival', got '{}'",
                other
            ),
        };

        Ok(Self {
            api_base,
            request_timeout,
            default_language: cfg.get("DEFAULT_LANGUAGE").unwrap_or(defaults.default_language),
            default_version: cfg.get("DEFAULT_VERSION").unwrap_or(defaults.default_version),
            failure_channel,
            result_policy,
        })
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or CODEPAD_* for forward-compat
    const KEYS: &[&str] = &[
        "API_BASE_URL",
        "REQUEST_TIMEOUT",
        "DEFAULT_LANGUAGE",
        "DEFAULT_VERSION",
        "FAILURE_CHANNEL",
        "RESULT_POLICY",
        "LOG_PATH",
    ];

    KEYS.contains(&k) || k.starts_with("CODEPAD_")
}

pub fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("codepad").join(".codepadrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    let cache = BaseDirs::new()
        .map(|b| b.cache_dir().to_path_buf())
        .unwrap_or_else(env::temp_dir);

    m.insert("API_BASE_URL".into(), "default".into());
    m.insert("DEFAULT_LANGUAGE".into(), "javascript".into());
    m.insert("DEFAULT_VERSION".into(), "20.11.1".into());
    m.insert("FAILURE_CHANNEL".into(), "output".into());
    m.insert("RESULT_POLICY".into(), "last-dispatch".into());
    m.insert(
        "LOG_PATH".into(),
        cache.join("codepad").join("codepad.log").to_string_lossy().into_owned(),
    );

    m
}
