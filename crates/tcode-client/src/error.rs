//! 客户端错误类型
//!
//! 两层错误互不混用：
//! - [`BuilderError`]：编写脚本时的本地错误，不会发往 servicer
//! - [`ClientError`]：调度与执行期间的错误

use tcode_protocol::{IdKind, ProtocolError, UnitsError};
use tcode_servicer::{ServicerError, TCodeResult};
use tcode_tools::CatalogError;
use thiserror::Error;

/// 脚本编写错误
#[derive(Error, Debug)]
pub enum BuilderError {
    /// ID 已经绑定
    #[error("{kind} id '{id}' is already registered")]
    IdExists { kind: IdKind, id: String },

    /// 引用了未绑定的 ID
    #[error("{kind} id '{id}' is not registered")]
    IdNotFound { kind: IdKind, id: String },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl BuilderError {
    pub(crate) fn exists(kind: IdKind, id: &str) -> Self {
        BuilderError::IdExists {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn not_found(kind: IdKind, id: &str) -> Self {
        BuilderError::IdNotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<UnitsError> for BuilderError {
    fn from(err: UnitsError) -> Self {
        BuilderError::Protocol(ProtocolError::Units(err))
    }
}

/// 执行期错误
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Servicer error: {0}")]
    Servicer(#[from] ServicerError),

    /// 调度第 `index` 条命令时 servicer 返回失败
    #[error("Scheduling failed at command {index} ({command_id}): {result}")]
    SchedulingFailed {
        index: usize,
        command_id: String,
        result: TCodeResult,
    },

    /// 批量调度的响应数量与请求不一致
    #[error("Batch response size mismatch: sent {sent}, received {received}")]
    BatchSizeMismatch { sent: usize, received: usize },

    #[error("Teach mode failed: {0}")]
    TeachModeFailed(TCodeResult),

    #[error("Teach mode aborted by operator")]
    TeachAborted,

    #[error("Key source error: {0}")]
    KeySource(String),

    #[error("Units error: {0}")]
    Units(#[from] UnitsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试 BuilderError 的 Display 实现
    #[test]
    fn test_builder_error_display() {
        let err = BuilderError::exists(IdKind::Robot, "r0");
        assert_eq!(err.to_string(), "robot id 'r0' is already registered");

        let err = BuilderError::not_found(IdKind::PipetteTipGroup, "g1");
        assert_eq!(err.to_string(), "pipette tip group id 'g1' is not registered");

        let err = BuilderError::from(CatalogError::NotFound("plate".into()));
        assert_eq!(err.to_string(), "Catalog error: Labware not found: plate");
    }

    /// 测试 ClientError 的 Display 实现
    #[test]
    fn test_client_error_display() {
        let err = ClientError::SchedulingFailed {
            index: 3,
            command_id: "abc".into(),
            result: TCodeResult::failure("id_not_found", "labware l9"),
        };
        assert_eq!(
            err.to_string(),
            "Scheduling failed at command 3 (abc): id_not_found: labware l9"
        );

        let err = ClientError::BatchSizeMismatch {
            sent: 4,
            received: 2,
        };
        assert_eq!(
            err.to_string(),
            "Batch response size mismatch: sent 4, received 2"
        );

        assert_eq!(
            ClientError::TeachAborted.to_string(),
            "Teach mode aborted by operator"
        );
    }
}
