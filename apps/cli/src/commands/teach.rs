//! teach 命令
//!
//! 终端进入 raw 模式，方向键点动机器人，Enter 确认位姿。

use anyhow::{Context, Result};
use clap::Args;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::fs;
use std::io;
use std::path::PathBuf;
use tcode_client::{ClientError, KeyEvent, KeySource, TeachConfig};

use crate::connection::{ServicerArgs, load_config};

/// 示教命令参数
#[derive(Args, Debug)]
pub struct TeachCommand {
    /// 机器人 ID
    #[arg(long)]
    pub robot_id: String,

    /// 将示教得到的位姿写入 JSON 文件
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub servicer: ServicerArgs,
}

impl TeachCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config()?;
        let teach = TeachConfig::from(&config.teach);
        let mut client = self.servicer.connect(&config)?;

        println!("🎓 示教模式: {}（{} 个关节）", self.robot_id, teach.joint_count());
        println!("  ↑/↓ 点动当前关节   ←/→ 选择关节   Tab 粗调/细调");
        println!("  Enter/Space 确认   Esc 放弃");

        let result = {
            let mut keys = TerminalKeys::new().context("无法进入终端 raw 模式")?;
            client.teach_point(&self.robot_id, &mut keys, &teach)
        };

        let transform = match result {
            Ok(transform) => transform,
            Err(ClientError::TeachAborted) => {
                println!("🛑 已放弃");
                return Ok(());
            },
            Err(e) => return Err(e.into()),
        };

        let [x, y, z] = transform.translation();
        println!("✅ 位姿: x={:.4} m, y={:.4} m, z={:.4} m", x, y, z);

        if let Some(path) = &self.output {
            let mut json = serde_json::to_string_pretty(&transform)?;
            json.push('\n');
            fs::write(path, json).with_context(|| format!("写入失败: {}", path.display()))?;
            println!("💾 已保存: {}", path.display());
        }
        Ok(())
    }
}

/// crossterm 按键来源；存在期间终端保持 raw 模式
struct TerminalKeys;

impl TerminalKeys {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(mapped) = map_key(key.code, key.modifiers) {
                return Ok(mapped);
            }
        }
    }
}

/// raw 模式下 Ctrl-C 不产生信号，按 Esc 处理
fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyEvent> {
    let key = match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyEvent::Esc,
        KeyCode::Up => KeyEvent::Up,
        KeyCode::Down => KeyEvent::Down,
        KeyCode::Left => KeyEvent::Left,
        KeyCode::Right => KeyEvent::Right,
        KeyCode::Tab => KeyEvent::Tab,
        KeyCode::Enter => KeyEvent::Return,
        KeyCode::Char(' ') => KeyEvent::Space,
        KeyCode::Esc => KeyEvent::Esc,
        KeyCode::Backspace => KeyEvent::Backspace,
        KeyCode::Char(c) => KeyEvent::Char(c),
        _ => return None,
    };
    Some(key)
}
