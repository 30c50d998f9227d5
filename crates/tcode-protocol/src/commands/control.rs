//! 流程控制命令与 webhook 请求体

use crate::units::ValueWithUnits;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

/// `SEND_WEBHOOK` 负载上限（字节）
pub const MAX_WEBHOOK_PAYLOAD_BYTES: usize = 32 * 1024;

/// integrator 根路径返回的版本标识前缀
pub const WEBHOOK_MAGIC_STRING: &str = "TCode integrator v1";

/// integrator 恢复执行时连接的 servicer 端口
pub const WEBHOOK_RESUME_PORT: u16 = 8002;

/// 暂停整个 fleet，直到手动恢复
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pause {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
}

/// 仅让目标机器人等待
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wait {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub duration: ValueWithUnits,
}

/// 注释，不执行任何动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub text: String,
}

/// 发送 HTTP webhook
///
/// `pause_execution` 为真时，servicer 在发送后暂停，直到外部 integrator 调用
/// `PUT /run_state?state=true` 恢复。`ignore_external_error` 为真时，目标服务器的错误
/// 不视为命令失败。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendWebhook {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub pause_execution: bool,
    #[serde(default)]
    pub ignore_external_error: bool,
    pub url: String,
    /// 可选 JSON 负载（最大 32 KiB）
    #[serde(default)]
    pub payload: Option<String>,
}

/// servicer 执行 `SEND_WEBHOOK` 时 POST 给 integrator 的请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookBody {
    /// UNIX 时间戳（秒）
    pub timestamp: f64,
    /// 触发请求的 fleet 控制器名称
    pub fleet_name: String,
    /// 命令中指定的目标 URL（integrator 在反向代理后面时有用）
    pub destination_url: String,
    pub is_execution_paused: bool,
    pub payload: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_webhook_defaults() {
        let cmd: SendWebhook = serde_json::from_value(json!({
            "pause_execution": true,
            "url": "http://integrator.local:8092/",
        }))
        .unwrap();
        assert!(!cmd.ignore_external_error);
        assert!(cmd.payload.is_none());
    }

    #[test]
    fn test_webhook_body_parse() {
        let body: WebhookBody = serde_json::from_value(json!({
            "timestamp": 1718000000.25,
            "fleet_name": "fleet-06",
            "destination_url": "http://10.0.0.2:8092/",
            "is_execution_paused": true,
            "payload": null,
        }))
        .unwrap();
        assert_eq!(body.fleet_name, "fleet-06");
        assert!(body.is_execution_paused);
        assert!(body.payload.is_none());
    }
}
