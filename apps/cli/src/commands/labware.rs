//! 耗材目录命令

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use std::path::PathBuf;
use tcode_protocol::LabwareDescription;
use tcode_tools::{ClientConfig, DirectoryCatalog, LabwareCatalog};

use crate::connection::load_config;

/// 耗材目录命令
#[derive(Subcommand, Debug)]
pub enum LabwareCommand {
    /// 列出目录中的耗材
    List {
        /// 耗材目录（覆盖配置）
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// 显示一个耗材的完整描述
    Show {
        /// 耗材名称或文件路径
        name: String,

        /// 耗材目录（覆盖配置）
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

impl LabwareCommand {
    pub fn execute(self) -> Result<()> {
        let config = load_config()?;
        match self {
            LabwareCommand::List { dir } => {
                let catalog = open_catalog(dir, &config)?;
                let names = catalog
                    .names()
                    .with_context(|| format!("读取耗材目录失败: {}", catalog.dir().display()))?;

                println!("📦 耗材目录: {}", catalog.dir().display());
                if names.is_empty() {
                    println!("  (空)");
                }
                for name in names {
                    println!("  {}", name);
                }
                Ok(())
            },

            LabwareCommand::Show { name, dir } => {
                let catalog = open_catalog(dir, &config)?;
                let labware = catalog.load(&name)?;
                println!("📦 {} ({})", name, labware.type_name());
                println!("{}", describe(&labware)?);
                Ok(())
            },
        }
    }
}

/// 目录优先级：命令行 > 配置 > 默认目录
fn open_catalog(dir: Option<PathBuf>, config: &ClientConfig) -> Result<DirectoryCatalog> {
    let dir = dir
        .or_else(|| config.labware_dir.clone())
        .or_else(DirectoryCatalog::default_dir)
        .ok_or_else(|| anyhow!("无法确定耗材目录，请使用 --dir 指定"))?;
    Ok(DirectoryCatalog::new(dir))
}

fn describe(labware: &LabwareDescription) -> Result<String> {
    Ok(serde_json::to_string_pretty(labware)?)
}
