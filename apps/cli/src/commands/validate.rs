//! validate 命令
//!
//! 读取（并迁移）脚本，在本地重放所有绑定，检查重复 ID 与悬空引用。
//! 不访问网络。

use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tcode_client::ScriptBuilder;
use tcode_protocol::{TCODE_API_VERSION, TCode, TCodeScript};

/// 脚本检查命令参数
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// 脚本文件路径
    pub file: PathBuf,
}

impl ValidateCommand {
    pub fn execute(&self) -> Result<()> {
        let script = TCodeScript::load(&self.file)
            .with_context(|| format!("读取脚本失败: {}", self.file.display()))?;
        // 读取时已记录版本不一致的警告
        let version_matches = script.metadata.tcode_api_version == TCODE_API_VERSION;

        let builder = ScriptBuilder::from_script(script)
            .with_context(|| format!("脚本检查失败: {}", self.file.display()))?;

        print!("{}", summarize(&builder));
        if !version_matches {
            println!("⚠️  脚本的 tcode_api_version 与当前版本不同");
        }
        println!("✅ 检查通过");
        Ok(())
    }
}

/// 各命令类型的数量（按类型名排序）
fn count_by_type(commands: &[TCode]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for command in commands {
        *counts.entry(command.type_name()).or_insert(0) += 1;
    }
    counts
}

fn summarize(builder: &ScriptBuilder) -> String {
    let metadata = &builder.script().metadata;
    let mut out = format!("📋 脚本: {}\n", metadata.name);
    if let Some(description) = &metadata.description {
        out.push_str(&format!("    {}\n", description));
    }
    out.push_str(&format!("    tcode_api_version: {}\n", metadata.tcode_api_version));
    out.push_str(&format!("    {} 个命令\n", builder.len()));

    let robots: Vec<_> = builder.robot_ids().collect();
    let labware: Vec<_> = builder.labware_ids().collect();
    out.push_str(&format!("    机器人: {}\n", join_or_none(&robots)));
    out.push_str(&format!("    耗材: {}\n", join_or_none(&labware)));

    for (type_name, count) in count_by_type(builder.commands()) {
        out.push_str(&format!("      {:<28} {}\n", type_name, count));
    }
    out
}

fn join_or_none(ids: &[&str]) -> String {
    if ids.is_empty() {
        "(无)".to_string()
    } else {
        ids.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcode_protocol::RobotDescriptor;

    #[test]
    fn test_summary_lists_bindings_and_counts() {
        let mut builder = ScriptBuilder::new("demo", Some("two comments".into()));
        builder.add_robot("r0", RobotDescriptor::default()).unwrap();
        builder.comment("a").unwrap();
        builder.comment("b").unwrap();

        let summary = summarize(&builder);
        assert!(summary.contains("demo"));
        assert!(summary.contains("two comments"));
        assert!(summary.contains("3 个命令"));
        assert!(summary.contains("机器人: r0"));
        assert!(summary.contains("耗材: (无)"));

        let counts = count_by_type(builder.commands());
        assert_eq!(counts["COMMENT"], 2);
        assert_eq!(counts["ADD_ROBOT"], 1);
    }
}
