//! servicer 请求/响应结构

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tcode_protocol::{ResultCode, TCode, Transform};

/// 统一的成功/失败结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TCodeResult {
    pub success: bool,
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Map<String, Value>>,
}

impl TCodeResult {
    pub fn success() -> Self {
        Self {
            success: true,
            code: ResultCode::Success.as_str().to_string(),
            message: None,
            details: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: Some(message.into()),
            details: None,
        }
    }

    /// 把 `code` 归类到子系统
    pub fn result_code(&self) -> ResultCode {
        ResultCode::parse(&self.code)
    }
}

impl std::fmt::Display for TCodeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.code, message),
            None => f.write_str(&self.code),
        }
    }
}

/// `DELETE /schedule` 的响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearScheduleResponse {
    #[serde(default)]
    pub cleared_commands: Vec<TCode>,
}

/// `GET /status` 的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetStatusResponse {
    /// 当前（或最近）执行的命令
    pub command_id: Option<String>,
    /// 尚未执行完的命令数
    pub operation_count: u64,
    pub run_state: bool,
    pub result: TCodeResult,
}

impl GetStatusResponse {
    /// 空闲：无待执行命令、暂停、结果成功
    pub fn idle() -> Self {
        Self {
            command_id: None,
            operation_count: 0,
            run_state: false,
            result: TCodeResult::success(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCommandRequest {
    pub command_id: String,
    pub command: TCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCommandResponse {
    /// 序列化的 fleet 状态快照，客户端不解析
    #[serde(default)]
    pub state: Map<String, Value>,
    pub result: TCodeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterTeachModeRequest {
    pub robot_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterTeachModeResponse {
    pub result: TCodeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitTeachModeRequest {
    pub robot_id: String,
}

/// 退出示教模式的响应
///
/// `transform` 为工具控制点相对机器人基座的位姿。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitTeachModeResponse {
    pub result: TCodeResult,
    pub transform: Transform,
}

/// 单条命令的调度记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TCodeCommandSchedulingReport {
    pub command_id: String,
    pub command: TCode,
    pub result: TCodeResult,
    /// 调度耗时（秒）
    pub duration: f64,
}

/// 一次脚本调度的完整记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TCodeSchedulingReport {
    pub command_reports: Vec<TCodeCommandSchedulingReport>,
    pub start_time: String,
    pub end_time: String,
}

impl TCodeSchedulingReport {
    /// 所有命令都调度成功
    pub fn all_succeeded(&self) -> bool {
        self.command_reports.iter().all(|r| r.result.success)
    }

    /// 失败的命令记录
    pub fn failures(&self) -> impl Iterator<Item = &TCodeCommandSchedulingReport> {
        self.command_reports.iter().filter(|r| !r.result.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tcode_protocol::ResolverCode;

    #[test]
    fn test_status_parse() {
        let status: GetStatusResponse = serde_json::from_value(json!({
            "command_id": "q8sYy3G2T8a6Qk9mM3nP0A",
            "operation_count": 3,
            "run_state": true,
            "result": {"success": true, "code": "success", "message": null, "details": null},
        }))
        .unwrap();
        assert_eq!(status.operation_count, 3);
        assert!(status.result.success);
        assert!(status.result.result_code().is_success());
    }

    #[test]
    fn test_result_classification() {
        let result: TCodeResult = serde_json::from_value(json!({
            "success": false,
            "code": "labware_holder_occupied",
            "message": "DeckSlot_3 is occupied",
            "details": {"holder": "DeckSlot_3"},
        }))
        .unwrap();
        assert_eq!(
            result.result_code(),
            ResultCode::Resolver(ResolverCode::LabwareHolderNotEmpty)
        );
        assert_eq!(result.to_string(), "labware_holder_occupied: DeckSlot_3 is occupied");
    }

    #[test]
    fn test_exit_teach_mode_parse() {
        let response: ExitTeachModeResponse = serde_json::from_value(json!({
            "result": {"success": true, "code": "success"},
            "transform": [
                [1.0, 0.0, 0.0, 0.1],
                [0.0, 1.0, 0.0, 0.2],
                [0.0, 0.0, 1.0, 0.3],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }))
        .unwrap();
        assert_eq!(response.transform.translation(), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_report_failures() {
        let command: TCode = tcode_protocol::Pause::default().into();
        let report = TCodeSchedulingReport {
            command_reports: vec![
                TCodeCommandSchedulingReport {
                    command_id: "a".into(),
                    command: command.clone(),
                    result: TCodeResult::success(),
                    duration: 0.01,
                },
                TCodeCommandSchedulingReport {
                    command_id: "b".into(),
                    command,
                    result: TCodeResult::failure("id_not_found", "robot r9"),
                    duration: 0.02,
                },
            ],
            start_time: "2024-06-01T12:00:00+00:00".into(),
            end_time: "2024-06-01T12:00:01+00:00".into(),
        };
        assert!(!report.all_succeeded());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.failures().next().unwrap().command_id, "b");
    }
}
