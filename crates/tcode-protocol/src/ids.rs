//! 唯一 ID 生成

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

/// 生成 URL 安全的唯一 ID
///
/// UUID v4 的 16 字节经无填充 URL-safe base64 编码，固定 22 个字符。
/// 客户端调度时为每条命令生成 `command_id`。
pub fn generate_id() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}
