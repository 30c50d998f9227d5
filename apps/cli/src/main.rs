//! # TCode CLI
//!
//! 编写、检查并在 servicer 上运行 TCode 脚本。
//!
//! ```bash
//! # 配置默认 servicer
//! tcode config set servicer_url http://lab-pc:8002
//!
//! # 本地检查脚本（不访问网络）
//! tcode validate protocol.json
//!
//! # 清理环境 -> 调度 -> 运行，Ctrl-C 取消
//! tcode run protocol.json --batch-size 50
//!
//! # 示教一个位姿
//! tcode teach --robot-id r0 --output pose.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod connection;

use commands::{
    ConfigCommand, DumpTfTreeCommand, LabwareCommand, ResetCommand, RunCommand, StatusCommand,
    TeachCommand, ValidateCommand,
};

/// TCode CLI - 实验室机器人脚本工具
#[derive(Parser, Debug)]
#[command(name = "tcode")]
#[command(about = "Command-line interface for authoring and running TCode scripts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 本地检查脚本
    Validate {
        #[command(flatten)]
        args: ValidateCommand,
    },

    /// 示教模式
    Teach {
        #[command(flatten)]
        args: TeachCommand,
    },

    /// 清理 servicer 状态并重新扫描 fleet
    Reset {
        #[command(flatten)]
        args: ResetCommand,
    },

    /// 查询 servicer 状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 让 servicer 输出坐标变换树
    DumpTfTree {
        #[command(flatten)]
        args: DumpTfTreeCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 耗材目录
    #[command(subcommand)]
    Labware(LabwareCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive("tcode_cli=info".parse()?)
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute(),
        Commands::Validate { args } => args.execute(),
        Commands::Teach { args } => args.execute(),
        Commands::Reset { args } => args.execute(),
        Commands::Status { args } => args.execute(),
        Commands::DumpTfTree { args } => args.execute(),
        Commands::Config(cmd) => cmd.execute(),
        Commands::Labware(cmd) => cmd.execute(),
    }
}
