//! 机器人与枪头组 schema（仅 Descriptor 形式）

use super::tool::ToolDescriptor;
use super::{NamedTags, Tags};
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 可以放置工具的位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "ToolHolder")]
pub struct ToolHolderDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
}

/// 可以放置耗材的位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "LabwareHolder")]
pub struct LabwareHolderDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
}

/// fleet 中的机器人
///
/// `tools`/`tool_holders`/`labware_holders` 以名称（或序列号）为键。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Robot")]
pub struct RobotDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub serial_number: Option<String>,
    #[serde(default)]
    pub tools: BTreeMap<String, ToolDescriptor>,
    #[serde(default)]
    pub tool_holders: BTreeMap<String, ToolHolderDescriptor>,
    #[serde(default)]
    pub labware_holders: BTreeMap<String, LabwareHolderDescriptor>,
}

impl RobotDescriptor {
    /// 按序列号匹配的机器人
    pub fn with_serial_number(serial_number: impl Into<String>) -> Self {
        Self {
            serial_number: Some(serial_number.into()),
            ..Default::default()
        }
    }
}

/// 枪头组：移液器一次拾取的一组枪头
///
/// 行列数相对枪头组自身坐标系，而非耗材坐标系。
/// 匹配时，组内每个枪头都必须带有全部 `pipette_tip_tags` 与 `pipette_tip_named_tags`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "PipetteTipGroup")]
pub struct PipetteTipGroupDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub row_count: u32,
    pub column_count: u32,
    #[serde(default)]
    pub pipette_tip_tags: Tags,
    #[serde(default)]
    pub pipette_tip_named_tags: NamedTags,
}

impl PipetteTipGroupDescriptor {
    pub fn new(row_count: u32, column_count: u32) -> Self {
        Self {
            schema_version: SchemaVersion,
            row_count,
            column_count,
            pipette_tip_tags: Tags::new(),
            pipette_tip_named_tags: NamedTags::new(),
        }
    }
}
