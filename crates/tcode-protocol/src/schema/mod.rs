//! 实体 schema
//!
//! 每类实体有两种形式：
//!
//! - **Description**：完整描述，所有字段必填，用于 `CREATE_LABWARE` 等创建实体的命令
//! - **Descriptor**：稀疏描述，除 `type` 外字段均可选，用于 `ADD_*` 命令匹配已有实体
//!
//! 所有 schema 都带 `type` 与 `schema_version` 字段。耗材 schema 的反序列化会先经过
//! [`crate::migration`] 中的迁移注册表，因此旧版本的耗材描述可以直接加载。

pub mod container;
pub mod geometry;
pub mod labware;
pub mod robot;
pub mod tool;

pub use container::*;
pub use geometry::*;
pub use labware::*;
pub use robot::*;
pub use tool::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 具名标签的值（字符串、整数、浮点数或布尔值）
///
/// 反序列化按 bool → int → float → string 的顺序尝试，保证 `1` 不会被解析成 `1.0`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(v) => write!(f, "{}", v),
            TagValue::Int(v) => write!(f, "{}", v),
            TagValue::Float(v) => write!(f, "{}", v),
            TagValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Str(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

/// 无名标签列表
pub type Tags = Vec<String>;

/// 具名标签（有序，保证序列化结果稳定）
pub type NamedTags = BTreeMap<String, TagValue>;
