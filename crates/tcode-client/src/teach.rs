//! 示教模式
//!
//! `enter_teach_mode` 与 `exit_teach_mode` 之间是一个交互式点动循环：
//!
//! | 按键 | 动作 |
//! |---|---|
//! | ↑ / ↓ | 当前关节 ± 一个步长（相对 `MOVE_TO_JOINT_POSE`） |
//! | ← / → | 选择上一个 / 下一个关节 |
//! | Tab | 切换粗调 / 细调 |
//! | Enter / Space | 确认当前位姿 |
//! | Esc | 放弃 |
//!
//! 无论循环如何结束，都会尝试 `exit_teach_mode`。
//! 按键来源通过 [`KeySource`] 注入，测试中不需要真实终端。

use crate::error::ClientError;
use crate::runner::{RunOutcome, TCodeServicerClient};
use std::io;
use tcode_protocol::units::rad;
use tcode_protocol::{MoveToJointPose, SchemaVersion, TCode, Transform};
use tcode_servicer::{EnterTeachModeRequest, ExitTeachModeRequest, ServicerApi};
use tcode_tools::TeachSettings;
use tracing::{debug, info, warn};

/// 离散按键事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Up,
    Down,
    Left,
    Right,
    Tab,
    Return,
    Space,
    Esc,
    Backspace,
    Char(char),
}

/// 按键来源
pub trait KeySource {
    /// 阻塞直到下一个按键
    fn next_key(&mut self) -> io::Result<KeyEvent>;
}

impl<K: KeySource + ?Sized> KeySource for &mut K {
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        (**self).next_key()
    }
}

/// 按顺序回放预设按键，耗尽后返回 `UnexpectedEof`
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: std::collections::VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more keys"))
    }
}

/// 点动参数
#[derive(Debug, Clone, PartialEq)]
pub struct TeachConfig {
    /// 每个关节的细调步长（rad），长度即关节数
    pub joint_steps: Vec<f64>,
    pub coarse_multiplier: f64,
}

impl Default for TeachConfig {
    fn default() -> Self {
        Self::from(&TeachSettings::default())
    }
}

impl From<&TeachSettings> for TeachConfig {
    fn from(settings: &TeachSettings) -> Self {
        Self {
            joint_steps: settings.joint_steps.clone(),
            coarse_multiplier: settings.coarse_multiplier,
        }
    }
}

/// 点动循环的当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct JogState {
    joint: usize,
    coarse: bool,
}

impl TeachConfig {
    pub fn joint_count(&self) -> usize {
        self.joint_steps.len()
    }

    /// 当前关节的一次相对移动量（其余关节为 0）
    fn jog_offsets(&self, state: JogState, direction: f64) -> Vec<f64> {
        let multiplier = if state.coarse {
            self.coarse_multiplier
        } else {
            1.0
        };
        self.joint_steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                if i == state.joint {
                    direction * step * multiplier
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl<S: ServicerApi> TCodeServicerClient<S> {
    /// 进入示教模式，交互式点动后返回示教得到的位姿
    ///
    /// 进入成功后总会尝试退出；操作员放弃时在退出后返回 [`ClientError::TeachAborted`]。
    pub fn teach_point<K: KeySource>(
        &mut self,
        robot_id: &str,
        keys: &mut K,
        config: &TeachConfig,
    ) -> Result<Transform, ClientError> {
        let entered = self
            .servicer_mut()
            .enter_teach_mode(&EnterTeachModeRequest {
                robot_id: robot_id.to_string(),
            })?;
        if !entered.result.success {
            return Err(ClientError::TeachModeFailed(entered.result));
        }
        info!(robot_id, "Entered teach mode");

        let jogged = self.jog_loop(robot_id, keys, config);

        let exited = self.servicer_mut().exit_teach_mode(&ExitTeachModeRequest {
            robot_id: robot_id.to_string(),
        });
        info!(robot_id, "Exited teach mode");

        match (jogged, exited) {
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(exit_err)) => {
                warn!("Failed to exit teach mode: {}", exit_err);
                Err(e)
            },
            (Ok(()), Err(exit_err)) => Err(exit_err.into()),
            (Ok(()), Ok(response)) if !response.result.success => {
                Err(ClientError::TeachModeFailed(response.result))
            },
            (Ok(()), Ok(response)) => Ok(response.transform),
        }
    }

    fn jog_loop<K: KeySource>(
        &mut self,
        robot_id: &str,
        keys: &mut K,
        config: &TeachConfig,
    ) -> Result<(), ClientError> {
        let last_joint = config.joint_count().saturating_sub(1);
        let mut state = JogState::default();

        loop {
            let key = keys
                .next_key()
                .map_err(|e| ClientError::KeySource(e.to_string()))?;
            match key {
                KeyEvent::Up => self.jog(robot_id, config, state, 1.0)?,
                KeyEvent::Down => self.jog(robot_id, config, state, -1.0)?,
                KeyEvent::Left => state.joint = state.joint.saturating_sub(1),
                KeyEvent::Right => state.joint = (state.joint + 1).min(last_joint),
                KeyEvent::Tab => state.coarse = !state.coarse,
                KeyEvent::Return | KeyEvent::Space => return Ok(()),
                KeyEvent::Esc => return Err(ClientError::TeachAborted),
                KeyEvent::Backspace | KeyEvent::Char(_) => {},
            }
            debug!(joint = state.joint, coarse = state.coarse, "Jog state");
        }
    }

    /// 调度一次相对关节移动并等待执行完毕
    ///
    /// servicer 拒绝的移动（如超出关节限位）只记录警告，循环继续。
    fn jog(
        &mut self,
        robot_id: &str,
        config: &TeachConfig,
        state: JogState,
        direction: f64,
    ) -> Result<(), ClientError> {
        if config.joint_count() == 0 {
            return Ok(());
        }
        let command: TCode = MoveToJointPose {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            joint_positions: config
                .jog_offsets(state, direction)
                .into_iter()
                .map(rad)
                .collect(),
            relative: true,
        }
        .into();

        let report = self.schedule_command(&command)?;
        if !report.result.success {
            warn!(result = %report.result, "Jog rejected");
            return Ok(());
        }

        self.start()?;
        match self.execute_run_loop()? {
            RunOutcome::Completed => Ok(()),
            RunOutcome::Failed(result) => Err(ClientError::TeachModeFailed(result)),
            RunOutcome::Cancelled => Err(ClientError::TeachAborted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jog_offsets() {
        let config = TeachConfig {
            joint_steps: vec![0.01, 0.02, 0.03],
            coarse_multiplier: 10.0,
        };

        let fine = config.jog_offsets(JogState { joint: 1, coarse: false }, 1.0);
        assert_eq!(fine, vec![0.0, 0.02, 0.0]);

        let coarse = config.jog_offsets(JogState { joint: 2, coarse: true }, -1.0);
        assert_eq!(coarse[2], -0.3);
        assert_eq!(coarse[0], 0.0);
    }

    #[test]
    fn test_config_from_settings() {
        let config = TeachConfig::default();
        assert_eq!(config.joint_count(), 6);
        assert_eq!(config.coarse_multiplier, 10.0);
    }

    #[test]
    fn test_scripted_keys_exhaust() {
        let mut keys = ScriptedKeys::new([KeyEvent::Tab]);
        assert_eq!(keys.next_key().unwrap(), KeyEvent::Tab);
        let err = keys.next_key().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
