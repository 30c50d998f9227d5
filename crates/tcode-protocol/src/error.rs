//! 协议层错误类型定义

use crate::migration::MigrationError;
use crate::units::UnitsError;
use std::path::PathBuf;
use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// 单位换算错误
    #[error("Units error: {0}")]
    Units(#[from] UnitsError),

    /// schema 迁移错误
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    /// JSON 解析/序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 文件读写错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 目标文件已存在且未指定覆盖
    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// `SEND_WEBHOOK` 负载超出上限
    #[error("Webhook payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// 物理量的量纲与字段要求不符
    #[error("Field '{field}' of {command} expects {expected} units, got '{units}'")]
    WrongDimension {
        command: &'static str,
        field: &'static str,
        expected: &'static str,
        units: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试 ProtocolError 的 Display 实现
    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::PayloadTooLarge {
            size: 40000,
            max: 32768,
        };
        assert_eq!(
            err.to_string(),
            "Webhook payload too large: 40000 bytes (max: 32768)"
        );

        let err = ProtocolError::WrongDimension {
            command: "WAIT",
            field: "duration",
            expected: "time",
            units: "mm".into(),
        };
        assert!(err.to_string().contains("expects time units"));

        let err = ProtocolError::FileExists(PathBuf::from("/tmp/a.json"));
        assert!(err.to_string().contains("/tmp/a.json"));

        // 测试 #[from] 转换
        let err: ProtocolError = UnitsError::UnknownUnit("furlong".into()).into();
        assert!(err.to_string().starts_with("Units error"));
    }
}
