//! schema 迁移注册表
//!
//! 以 `(type, from_version)` 为键注册纯函数 `fn(Value) -> Result<Value, MigrationError>`，
//! 每一步把负载从 `from_version` 升级到下一个版本。
//! [`MigrationRegistry::migrate_to_latest`] 依次应用迁移直到该类型的最新版本。
//!
//! - 缺少 `schema_version` 的负载按版本 1 处理
//! - 没有注册最新版本的类型原样返回
//! - 版本高于最新版本、或中间某一步未注册，都会返回错误
//!
//! 最新 schema 中不包含任何迁移逻辑；新增版本时在此注册迁移函数。

use crate::schema::PipetteTipLayout;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

/// 迁移错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    /// 迁移函数收到了错误的源版本
    #[error("Cannot migrate {schema_type} from schema_version {version}")]
    UnknownSourceVersion { schema_type: String, version: u32 },

    /// 负载版本比当前支持的最新版本更新
    #[error("{schema_type} schema_version {version} is newer than the latest supported ({latest})")]
    NewerThanSupported {
        schema_type: String,
        version: u32,
        latest: u32,
    },

    /// 缺少中间迁移步骤
    #[error("No migration registered for {schema_type} from schema_version {version}")]
    MissingStep { schema_type: String, version: u32 },

    /// 负载缺少必要字段
    #[error("Payload is missing field '{field}'")]
    MissingField { field: &'static str },

    /// 负载格式错误
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// 单步迁移函数
pub type MigrationFn = fn(Value) -> Result<Value, MigrationError>;

/// 迁移注册表
#[derive(Debug, Clone, Default)]
pub struct MigrationRegistry {
    steps: HashMap<(String, u32), MigrationFn>,
    latest: HashMap<String, u32>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 带有所有内置迁移的注册表
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.set_latest("PipetteTipBox", 2);
        registry.register("PipetteTipBox", 1, pipette_tip_box_v1_to_v2);
        registry
    }

    /// 声明某类型的最新版本
    pub fn set_latest(&mut self, schema_type: &str, version: u32) {
        self.latest.insert(schema_type.to_string(), version);
    }

    /// 注册 `from_version → from_version + 1` 的迁移
    pub fn register(&mut self, schema_type: &str, from_version: u32, step: MigrationFn) {
        self.steps
            .insert((schema_type.to_string(), from_version), step);
    }

    /// 某类型的最新版本（未注册返回 `None`）
    pub fn latest_version(&self, schema_type: &str) -> Option<u32> {
        self.latest.get(schema_type).copied()
    }

    /// 把负载迁移到最新版本
    pub fn migrate_to_latest(&self, value: Value) -> Result<Value, MigrationError> {
        let schema_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(MigrationError::MissingField { field: "type" })?
            .to_string();

        let Some(latest) = self.latest_version(&schema_type) else {
            return Ok(value);
        };

        let mut version = schema_version(&value)?;
        if version > latest {
            return Err(MigrationError::NewerThanSupported {
                schema_type,
                version,
                latest,
            });
        }

        let mut value = value;
        while version < latest {
            let step = self
                .steps
                .get(&(schema_type.clone(), version))
                .ok_or_else(|| MigrationError::MissingStep {
                    schema_type: schema_type.clone(),
                    version,
                })?;
            value = step(value)?;

            let next = schema_version(&value)?;
            if next <= version {
                return Err(MigrationError::InvalidPayload(format!(
                    "migration of {} from schema_version {} did not advance the version",
                    schema_type, version
                )));
            }
            tracing::debug!(
                schema_type = %schema_type,
                from = version,
                to = next,
                "Migrated schema"
            );
            version = next;
        }
        Ok(value)
    }
}

/// 读取 `schema_version`，缺失视为 1
fn schema_version(value: &Value) -> Result<u32, MigrationError> {
    match value.get("schema_version") {
        None | Some(Value::Null) => Ok(1),
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| MigrationError::InvalidPayload(format!("schema_version {}", v))),
    }
}

static DEFAULT_REGISTRY: LazyLock<MigrationRegistry> =
    LazyLock::new(MigrationRegistry::with_builtin);

/// 进程内默认注册表（只读）
pub fn default_registry() -> &'static MigrationRegistry {
    &DEFAULT_REGISTRY
}

/// PipetteTipBox v1 → v2：`full` 替换为 `pipette_tip_layout`
///
/// - `full = true` → 8×12 满盒
/// - `full = false` → 8×12 空盒
/// - `full` 为 null 或缺失 → `pipette_tip_layout = null`
///
/// 适用于 Description 与 Descriptor。其余字段原样保留。
pub fn pipette_tip_box_v1_to_v2(value: Value) -> Result<Value, MigrationError> {
    let version = schema_version(&value)?;
    if version != 1 {
        return Err(MigrationError::UnknownSourceVersion {
            schema_type: "PipetteTipBox".to_string(),
            version,
        });
    }

    let Value::Object(mut fields) = value else {
        return Err(MigrationError::InvalidPayload(
            "PipetteTipBox payload is not an object".to_string(),
        ));
    };

    let layout = match fields.remove("full") {
        None | Some(Value::Null) => Value::Null,
        Some(Value::Bool(full)) => {
            let (rows, columns) = (
                PipetteTipLayout::DEFAULT_ROWS,
                PipetteTipLayout::DEFAULT_COLUMNS,
            );
            let layout = if full {
                PipetteTipLayout::full(rows, columns)
            } else {
                PipetteTipLayout::empty(rows, columns)
            };
            serde_json::to_value(layout)
                .map_err(|e| MigrationError::InvalidPayload(e.to_string()))?
        },
        Some(other) => {
            return Err(MigrationError::InvalidPayload(format!(
                "PipetteTipBox.full must be a boolean, got {}",
                other
            )));
        },
    };

    let mut migrated = Map::new();
    migrated.insert("type".to_string(), Value::from("PipetteTipBox"));
    migrated.insert("schema_version".to_string(), Value::from(2));
    fields.remove("type");
    fields.remove("schema_version");
    migrated.extend(fields);
    migrated.insert("pipette_tip_layout".to_string(), layout);
    Ok(Value::Object(migrated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_v1_full_true_becomes_full_layout() {
        let migrated = default_registry()
            .migrate_to_latest(json!({"type": "PipetteTipBox", "schema_version": 1, "full": true}))
            .unwrap();
        assert_eq!(migrated["schema_version"], 2);
        assert!(migrated.get("full").is_none());
        assert_eq!(migrated["pipette_tip_layout"]["layout"][7][11], 1);
    }

    #[test]
    fn test_missing_version_treated_as_v1() {
        let migrated = default_registry()
            .migrate_to_latest(json!({"type": "PipetteTipBox", "full": false, "tags": ["a"]}))
            .unwrap();
        assert_eq!(migrated["pipette_tip_layout"]["layout"][0][0], 0);
        assert_eq!(migrated["tags"], json!(["a"]));
    }

    #[test]
    fn test_null_full_gives_null_layout() {
        let migrated = default_registry()
            .migrate_to_latest(json!({"type": "PipetteTipBox", "schema_version": 1, "full": null}))
            .unwrap();
        assert!(migrated["pipette_tip_layout"].is_null());
    }

    #[test]
    fn test_latest_version_untouched() {
        let value = json!({"type": "PipetteTipBox", "schema_version": 2, "pipette_tip_layout": null});
        assert_eq!(default_registry().migrate_to_latest(value.clone()).unwrap(), value);
    }

    #[test]
    fn test_unversioned_type_passes_through() {
        let value = json!({"type": "WellPlate", "schema_version": 1});
        assert_eq!(default_registry().migrate_to_latest(value.clone()).unwrap(), value);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = default_registry()
            .migrate_to_latest(json!({"type": "PipetteTipBox", "schema_version": 9}))
            .unwrap_err();
        assert!(matches!(
            err,
            MigrationError::NewerThanSupported {
                version: 9,
                latest: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_intermediate_step() {
        let mut registry = MigrationRegistry::with_builtin();
        registry.set_latest("PipetteTipBox", 3);
        let err = registry
            .migrate_to_latest(json!({"type": "PipetteTipBox", "schema_version": 1, "full": true}))
            .unwrap_err();
        assert_eq!(
            err,
            MigrationError::MissingStep {
                schema_type: "PipetteTipBox".into(),
                version: 2
            }
        );
    }

    #[test]
    fn test_step_rejects_wrong_source_version() {
        let err = pipette_tip_box_v1_to_v2(json!({"type": "PipetteTipBox", "schema_version": 0}))
            .unwrap_err();
        assert!(err.to_string().contains("schema_version 0"));
    }

    #[test]
    fn test_missing_type() {
        let err = default_registry().migrate_to_latest(json!({"schema_version": 1})).unwrap_err();
        assert_eq!(err, MigrationError::MissingField { field: "type" });
    }
}
