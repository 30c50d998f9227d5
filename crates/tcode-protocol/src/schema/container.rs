//! 容器 schema：孔、试管、枪头与枪头布局

use super::geometry::{
    WellBottomDescription, WellBottomDescriptor, WellShapeDescription, WellShapeDescriptor,
};
use super::{NamedTags, Tags};
use crate::units::ValueWithUnits;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

/// 孔（所有孔共用同一描述）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Well")]
pub struct WellDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    /// 孔口到孔内底部的距离
    pub depth: ValueWithUnits,
    pub shape: WellShapeDescription,
    pub bottom_shape: WellBottomDescription,
    pub min_volume: ValueWithUnits,
    pub max_volume: ValueWithUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Well")]
pub struct WellDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub depth: Option<ValueWithUnits>,
    pub shape: Option<WellShapeDescriptor>,
    pub bottom_shape: Option<WellBottomDescriptor>,
    pub min_volume: Option<ValueWithUnits>,
    pub max_volume: Option<ValueWithUnits>,
}

/// 试管；`top_height` 为试管口高出试管架顶面的距离
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Tube")]
pub struct TubeDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub depth: ValueWithUnits,
    pub shape: WellShapeDescription,
    pub bottom_shape: WellBottomDescription,
    pub min_volume: ValueWithUnits,
    pub max_volume: ValueWithUnits,
    pub top_height: ValueWithUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Tube")]
pub struct TubeDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub depth: Option<ValueWithUnits>,
    pub shape: Option<WellShapeDescriptor>,
    pub bottom_shape: Option<WellBottomDescriptor>,
    pub min_volume: Option<ValueWithUnits>,
    pub max_volume: Option<ValueWithUnits>,
    pub top_height: Option<ValueWithUnits>,
}

/// 枪头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "PipetteTip")]
pub struct PipetteTipDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub has_filter: bool,
    pub height: ValueWithUnits,
    /// 法兰（与移液器连接部分）的高度
    pub flange_height: ValueWithUnits,
    pub max_volume: ValueWithUnits,
    pub min_volume: ValueWithUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "PipetteTip")]
pub struct PipetteTipDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub has_filter: Option<bool>,
    pub height: Option<ValueWithUnits>,
    pub flange_height: Option<ValueWithUnits>,
    pub max_volume: Option<ValueWithUnits>,
    pub min_volume: Option<ValueWithUnits>,
}

/// 枪头盒中哪些槽位有枪头（1 = 有，0 = 空）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "PipetteTipLayout")]
pub struct PipetteTipLayout {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub layout: Vec<Vec<u8>>,
}

impl PipetteTipLayout {
    pub const DEFAULT_ROWS: usize = 8;
    pub const DEFAULT_COLUMNS: usize = 12;

    fn filled(row_count: usize, column_count: usize, value: u8) -> Self {
        Self {
            schema_version: SchemaVersion,
            layout: vec![vec![value; column_count]; row_count],
        }
    }

    /// 所有槽位都有枪头
    pub fn full(row_count: usize, column_count: usize) -> Self {
        Self::filled(row_count, column_count, 1)
    }

    /// 所有槽位为空
    pub fn empty(row_count: usize, column_count: usize) -> Self {
        Self::filled(row_count, column_count, 0)
    }

    /// 剩余枪头数
    pub fn tip_count(&self) -> usize {
        self.layout
            .iter()
            .flatten()
            .filter(|slot| **slot != 0)
            .count()
    }
}

impl Default for PipetteTipLayout {
    /// 8×12 满盒
    fn default() -> Self {
        Self::full(Self::DEFAULT_ROWS, Self::DEFAULT_COLUMNS)
    }
}
