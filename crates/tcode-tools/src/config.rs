//! # 客户端配置
//!
//! TOML 文件，默认路径：
//! - Linux: `~/.config/tcode/config.toml`
//! - macOS: `~/Library/Application Support/tcode/config.toml`
//! - Windows: `%APPDATA%\tcode\config.toml`
//!
//! 环境变量 `TCODE_CONFIG` 可指定其他路径。文件不存在时使用默认值，
//! 缺失的字段同样取默认值。
//!
//! ```toml
//! servicer_url = "http://localhost:8002"
//! timeout_secs = 15
//! batch_size = 100
//! poll_interval_ms = 100
//! clean_environment = true
//!
//! [teach]
//! joint_steps = [0.01, 0.01, 0.01, 0.01, 0.01, 0.01]
//! coarse_multiplier = 10.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "TCODE_CONFIG";

/// 可通过 `get`/`set` 访问的键
pub const CONFIG_KEYS: &[&str] = &[
    "servicer_url",
    "timeout_secs",
    "batch_size",
    "poll_interval_ms",
    "clean_environment",
    "labware_dir",
    "teach.coarse_multiplier",
];

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine the configuration directory")]
    NoConfigDir,

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 示教模式的点动参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeachSettings {
    /// 每个关节的细调步长（rad）
    pub joint_steps: Vec<f64>,
    /// 粗调步长 = 细调步长 × `coarse_multiplier`
    pub coarse_multiplier: f64,
}

impl Default for TeachSettings {
    fn default() -> Self {
        Self {
            joint_steps: vec![0.01; 6],
            coarse_multiplier: 10.0,
        }
    }
}

/// 客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub servicer_url: String,
    /// 单次 HTTP 请求超时（秒）
    pub timeout_secs: u64,
    /// 批量调度的每批命令数
    pub batch_size: usize,
    /// 运行循环的状态轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 运行脚本前是否清理 servicer 状态
    pub clean_environment: bool,
    /// 耗材目录（未设置时使用默认目录）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labware_dir: Option<PathBuf>,
    pub teach: TeachSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servicer_url: "http://localhost:8002".to_string(),
            timeout_secs: 15,
            batch_size: 100,
            poll_interval_ms: 100,
            clean_environment: true,
            labware_dir: None,
            teach: TeachSettings::default(),
        }
    }
}

impl ClientConfig {
    /// 默认配置文件路径
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("tcode").join("config.toml"))
    }

    /// 从默认路径加载
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Self::default_path()?)
    }

    /// 从文件加载；文件不存在时返回默认配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            },
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            },
        };

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 保存到文件（自动创建父目录）
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.servicer_url.starts_with("http://") || self.servicer_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "servicer_url '{}' must start with 'http://' or 'https://'",
                self.servicer_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.teach.joint_steps.is_empty() {
            return Err(ConfigError::Invalid("teach.joint_steps must not be empty".into()));
        }
        if self.teach.joint_steps.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::Invalid(
                "teach.joint_steps must be finite and positive".into(),
            ));
        }
        if !self.teach.coarse_multiplier.is_finite() || self.teach.coarse_multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "teach.coarse_multiplier must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 读取单个键（`labware_dir` 未设置时返回空字符串）
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "servicer_url" => self.servicer_url.clone(),
            "timeout_secs" => self.timeout_secs.to_string(),
            "batch_size" => self.batch_size.to_string(),
            "poll_interval_ms" => self.poll_interval_ms.to_string(),
            "clean_environment" => self.clean_environment.to_string(),
            "labware_dir" => self
                .labware_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "teach.coarse_multiplier" => self.teach.coarse_multiplier.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// 设置单个键，并检查新配置
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut updated = self.clone();
        match key {
            "servicer_url" => updated.servicer_url = value.trim_end_matches('/').to_string(),
            "timeout_secs" => updated.timeout_secs = parse_value(key, value)?,
            "batch_size" => updated.batch_size = parse_value(key, value)?,
            "poll_interval_ms" => updated.poll_interval_ms = parse_value(key, value)?,
            "clean_environment" => updated.clean_environment = parse_value(key, value)?,
            "labware_dir" => {
                updated.labware_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            },
            "teach.coarse_multiplier" => {
                updated.teach.coarse_multiplier = parse_value(key, value)?;
            },
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("cannot parse '{}' for {}", value, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.servicer_url = "http://10.0.0.5:8002".into();
        config.batch_size = 25;
        config.labware_dir = Some(PathBuf::from("/opt/labware"));
        config.save(&path).unwrap();

        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "batch_size = 10\n[teach]\ncoarse_multiplier = 5.0\n").unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.teach.coarse_multiplier, 5.0);
        assert_eq!(config.teach.joint_steps.len(), 6);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "batch_size = \"many\"").unwrap();
        assert!(matches!(
            ClientConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_get_set() {
        let mut config = ClientConfig::default();
        config.set("servicer_url", "https://fleet.local/").unwrap();
        assert_eq!(config.get("servicer_url").unwrap(), "https://fleet.local");

        config.set("batch_size", "50").unwrap();
        assert_eq!(config.batch_size, 50);

        // 非法值不修改配置
        assert!(config.set("batch_size", "0").is_err());
        assert!(config.set("servicer_url", "fleet.local").is_err());
        assert_eq!(config.batch_size, 50);

        assert!(matches!(
            config.get("interface"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    #[serial]
    fn test_default_path_env_override() {
        unsafe {
            std::env::set_var(CONFIG_ENV, "/tmp/tcode-test/config.toml");
        }
        let path = ClientConfig::default_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/tcode-test/config.toml"));
        unsafe {
            std::env::remove_var(CONFIG_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_default_path_without_env() {
        unsafe {
            std::env::remove_var(CONFIG_ENV);
        }
        if let Ok(path) = ClientConfig::default_path() {
            assert!(path.ends_with("tcode/config.toml"));
        }
    }
}
