//! 传输层错误类型定义

use crate::endpoint::Endpoint;
use thiserror::Error;

/// 传输层错误类型
#[derive(Error, Debug)]
pub enum ServicerError {
    /// HTTP 请求失败（连接、超时、TLS 等）
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// servicer 返回非 2xx 状态码
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    /// 响应体无法解析
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    /// servicer URL 格式错误
    #[error("Invalid servicer URL '{0}': must start with 'http://' or 'https://'")]
    InvalidUrl(String),
}

impl ServicerError {
    /// 出错的端点（HTTP 层错误和 URL 错误没有端点）
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ServicerError::Status { endpoint, .. } | ServicerError::Decode { endpoint, .. } => {
                Some(*endpoint)
            },
            _ => None,
        }
    }
}
