//! 直接访问 servicer 的命令：reset / status / dump-tf-tree

use anyhow::Result;
use clap::Args;
use tcode_servicer::GetStatusResponse;

use crate::connection::{ServicerArgs, load_config};

/// 清理 schedule、耗材和绑定，然后重新扫描 fleet
#[derive(Args, Debug)]
pub struct ResetCommand {
    #[command(flatten)]
    pub servicer: ServicerArgs,
}

impl ResetCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config()?;
        let mut client = self.servicer.connect(&config)?;

        println!("🧹 重置 servicer: {}", client.servicer().base_url());
        client.reset_environment()?;
        println!("✅ 重置完成");
        Ok(())
    }
}

/// 查询运行状态
#[derive(Args, Debug)]
pub struct StatusCommand {
    #[command(flatten)]
    pub servicer: ServicerArgs,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config()?;
        let mut client = self.servicer.connect(&config)?;
        let status = client.get_status()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            print!("{}", format_status(&status));
        }
        Ok(())
    }
}

fn format_status(status: &GetStatusResponse) -> String {
    let state = if status.run_state { "运行" } else { "暂停" };
    let result = if status.result.success {
        "✅".to_string()
    } else {
        format!("❌ {}", status.result)
    };
    format!(
        "状态: {}\n  当前命令: {}\n  待执行: {}\n  结果: {}\n",
        state,
        status.command_id.as_deref().unwrap_or("(无)"),
        status.operation_count,
        result
    )
}

/// servicer 在自己的日志中输出坐标变换树
#[derive(Args, Debug)]
pub struct DumpTfTreeCommand {
    #[command(flatten)]
    pub servicer: ServicerArgs,
}

impl DumpTfTreeCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config()?;
        let mut client = self.servicer.connect(&config)?;
        client.dump_tf_tree()?;
        println!("✅ 已请求输出坐标变换树（见 servicer 日志）");
        Ok(())
    }
}
