//! 配置管理命令
//!
//! 读写 `ClientConfig` 的 TOML 文件（默认路径或 `$TCODE_CONFIG`）

use anyhow::{Context, Result};
use clap::Subcommand;
use tcode_tools::ClientConfig;
use tcode_tools::config::CONFIG_KEYS;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 配置项名称（如 servicer_url, batch_size）
        key: String,

        /// 新值
        value: String,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Set { key, value } => Self::set_(&key, &value),

            ConfigCommand::Get { key } => Self::get_(&key),

            ConfigCommand::Check => Self::check_(),
        }
    }

    fn set_(key: &str, value: &str) -> Result<()> {
        let path = ClientConfig::default_path()?;
        let mut config = ClientConfig::load(&path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?;

        config.set(key, value)?;
        config
            .save(&path)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;

        println!("✅ 设置 {} = {}", key, config.get(key)?);
        Ok(())
    }

    fn get_(key: &str) -> Result<()> {
        let path = ClientConfig::default_path()?;
        let config = ClientConfig::load(&path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?;

        match key {
            "all" => print!("{}", format_all(&config)?),
            _ => {
                let value = config.get(key)?;
                if value.is_empty() {
                    println!("(未设置)");
                } else {
                    println!("{}", value);
                }
            },
        }

        Ok(())
    }

    fn check_() -> Result<()> {
        let path = ClientConfig::default_path()?;
        println!("配置文件: {}", path.display());
        if !path.exists() {
            println!("  (不存在，使用默认值)");
        }

        let config = ClientConfig::load(&path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?;
        config.validate()?;

        print!("{}", format_all(&config)?);
        println!("✅ 配置有效");
        Ok(())
    }
}

fn format_all(config: &ClientConfig) -> Result<String> {
    let mut out = String::from("TCode CLI 配置:\n");
    for key in CONFIG_KEYS {
        let value = config.get(key)?;
        let value = if value.is_empty() { "(未设置)".to_string() } else { value };
        out.push_str(&format!("  {}: {}\n", key, value));
    }
    out.push_str(&format!("  teach.joint_steps: {:?}\n", config.teach.joint_steps));
    Ok(out)
}
