//! run 命令
//!
//! 本地重放绑定 -> 清理环境 -> 调度 -> 运行，直到完成、失败或 Ctrl-C

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tcode_client::{RunOptions, RunOutcome, ScheduleMode, ScriptBuilder};
use tcode_protocol::TCodeScript;
use tcode_tools::ClientConfig;

use crate::connection::{ServicerArgs, load_config};

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径
    pub file: PathBuf,

    #[command(flatten)]
    pub servicer: ServicerArgs,

    /// 运行前不清理 servicer 状态
    #[arg(long)]
    pub no_clean: bool,

    /// 逐条调度
    #[arg(long, conflicts_with = "batch_size")]
    pub serial: bool,

    /// 每批调度的命令数（覆盖配置）
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: Option<u64>,

    /// 调度失败时继续调度后续命令
    #[arg(long)]
    pub continue_on_error: bool,
}

impl RunCommand {
    /// 合并命令行参数与配置
    pub fn options(&self, config: &ClientConfig) -> RunOptions {
        let schedule_mode = if self.serial {
            ScheduleMode::Serial
        } else {
            let batch_size = self
                .batch_size
                .map(|n| n as usize)
                .unwrap_or(config.batch_size);
            ScheduleMode::Batched(batch_size)
        };

        RunOptions {
            clean_environment: config.clean_environment && !self.no_clean,
            schedule_mode,
            continue_on_error: self.continue_on_error,
        }
    }

    pub fn execute(&self) -> Result<()> {
        let config = load_config()?;

        println!("📜 加载脚本: {}", self.file.display());
        let script = TCodeScript::load(&self.file)
            .with_context(|| format!("读取脚本失败: {}", self.file.display()))?;

        // 重复 ID 与悬空引用在连接 servicer 之前拒绝
        let builder = ScriptBuilder::from_script(script)
            .with_context(|| format!("脚本检查失败: {}", self.file.display()))?;
        let script = builder.script();

        println!("📋 脚本: {}", script.metadata.name);
        if let Some(description) = &script.metadata.description {
            println!("    {}", description);
        }
        println!("    {} 个命令", script.commands.len());

        let mut client = self.servicer.connect(&config)?;
        let token = client.cancel_token();
        ctrlc::set_handler(move || token.cancel()).context("安装 Ctrl-C 处理器失败")?;

        let options = self.options(&config);
        println!("🔌 servicer: {}", client.servicer().base_url());
        println!("▶️  开始运行（Ctrl-C 取消）");

        let started = Instant::now();
        let outcome = client.run_script(script, &options)?;
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            RunOutcome::Completed => {
                println!("✅ 运行完成，耗时 {:.2} 秒", elapsed);
                Ok(())
            },
            RunOutcome::Failed(result) => {
                bail!("运行失败（{:.2} 秒）: {}", elapsed, result)
            },
            RunOutcome::Cancelled => {
                println!("🛑 已取消：fleet 已暂停，绑定已清除");
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> RunCommand {
        RunCommand {
            file: PathBuf::from("protocol.json"),
            servicer: ServicerArgs::default(),
            no_clean: false,
            serial: false,
            batch_size: None,
            continue_on_error: false,
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = ClientConfig {
            batch_size: 20,
            ..Default::default()
        };
        let options = command().options(&config);
        assert_eq!(options.schedule_mode, ScheduleMode::Batched(20));
        assert!(options.clean_environment);
        assert!(!options.continue_on_error);
    }

    #[test]
    fn test_flags_override_config() {
        let mut cmd = command();
        cmd.no_clean = true;
        cmd.batch_size = Some(5);
        cmd.continue_on_error = true;

        let options = cmd.options(&ClientConfig::default());
        assert_eq!(options.schedule_mode, ScheduleMode::Batched(5));
        assert!(!options.clean_environment);
        assert!(options.continue_on_error);

        cmd.serial = true;
        assert_eq!(cmd.options(&ClientConfig::default()).schedule_mode, ScheduleMode::Serial);
    }

    #[test]
    fn test_config_can_disable_clean() {
        let config = ClientConfig {
            clean_environment: false,
            ..Default::default()
        };
        assert!(!command().options(&config).clean_environment);
    }
}
