//! 耗材 schema
//!
//! 耗材共有字段：`tags`、`named_tags`、`x_length`、`y_length`、`z_length`。
//!
//! [`LabwareDescription`] 与 [`LabwareDescriptor`] 的反序列化会先把原始 JSON 交给
//! 默认迁移注册表升级到最新版本，再按 `type` 分派到具体结构体。
//! 例如 v1 的 `PipetteTipBox`（`full: bool`）会被加载为 v2（`pipette_tip_layout`）。

use super::container::{
    PipetteTipDescription, PipetteTipDescriptor, PipetteTipLayout, TubeDescription,
    TubeDescriptor, WellDescription, WellDescriptor,
};
use super::geometry::{GridDescription, GridDescriptor};
use super::{NamedTags, Tags};
use crate::migration;
use crate::units::ValueWithUnits;
use crate::version::SchemaVersion;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 所有耗材类型名
pub const LABWARE_TYPES: &[&str] = &["Lid", "PipetteTipBox", "Trash", "TubeHolder", "WellPlate"];

/// 盖子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Lid")]
pub struct LidDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: ValueWithUnits,
    pub y_length: ValueWithUnits,
    pub z_length: ValueWithUnits,
    /// 是否可以堆叠在其他盖子上
    pub stackable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Lid")]
pub struct LidDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: Option<ValueWithUnits>,
    pub y_length: Option<ValueWithUnits>,
    pub z_length: Option<ValueWithUnits>,
    pub stackable: Option<bool>,
}

fn full_layout_if_null<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<PipetteTipLayout, D::Error> {
    Ok(Option::<PipetteTipLayout>::deserialize(deserializer)?.unwrap_or_default())
}

/// 枪头盒（v2）
///
/// `pipette_tip_layout` 缺失或为 null 时视为 8×12 满盒。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "PipetteTipBox")]
pub struct PipetteTipBoxDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<2>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: ValueWithUnits,
    pub y_length: ValueWithUnits,
    pub z_length: ValueWithUnits,
    pub grid: GridDescription,
    pub pipette_tip: PipetteTipDescription,
    #[serde(default, deserialize_with = "full_layout_if_null")]
    pub pipette_tip_layout: PipetteTipLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "PipetteTipBox")]
pub struct PipetteTipBoxDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<2>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: Option<ValueWithUnits>,
    pub y_length: Option<ValueWithUnits>,
    pub z_length: Option<ValueWithUnits>,
    pub grid: Option<GridDescriptor>,
    pub pipette_tip: Option<PipetteTipDescriptor>,
    pub pipette_tip_layout: Option<PipetteTipLayout>,
}

/// 废液/废枪头槽（单个大孔）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Trash")]
pub struct TrashDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: ValueWithUnits,
    pub y_length: ValueWithUnits,
    pub z_length: ValueWithUnits,
    pub well: WellDescription,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Trash")]
pub struct TrashDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: Option<ValueWithUnits>,
    pub y_length: Option<ValueWithUnits>,
    pub z_length: Option<ValueWithUnits>,
    pub well: Option<WellDescriptor>,
}

/// 试管架
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "TubeHolder")]
pub struct TubeHolderDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: ValueWithUnits,
    pub y_length: ValueWithUnits,
    pub z_length: ValueWithUnits,
    pub grid: GridDescription,
    pub tube: TubeDescription,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "TubeHolder")]
pub struct TubeHolderDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: Option<ValueWithUnits>,
    pub y_length: Option<ValueWithUnits>,
    pub z_length: Option<ValueWithUnits>,
    pub grid: Option<GridDescriptor>,
    pub tube: Option<TubeDescriptor>,
}

/// 孔板
///
/// `lid_offset` 与 `lid` 在完整描述中也是可选的：缺省表示孔板没有盖子。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "WellPlate")]
pub struct WellPlateDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: ValueWithUnits,
    pub y_length: ValueWithUnits,
    pub z_length: ValueWithUnits,
    pub grid: GridDescription,
    pub well: WellDescription,
    /// 孔板顶面到盖子底面的距离
    pub lid_offset: Option<ValueWithUnits>,
    pub lid: Option<LidDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "WellPlate")]
pub struct WellPlateDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub named_tags: NamedTags,
    pub x_length: Option<ValueWithUnits>,
    pub y_length: Option<ValueWithUnits>,
    pub z_length: Option<ValueWithUnits>,
    pub grid: Option<GridDescriptor>,
    pub well: Option<WellDescriptor>,
    pub lid_offset: Option<ValueWithUnits>,
    pub lid: Option<LidDescriptor>,
}

/// 耗材完整描述
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LabwareDescription {
    Lid(LidDescription),
    PipetteTipBox(PipetteTipBoxDescription),
    Trash(TrashDescription),
    TubeHolder(TubeHolderDescription),
    WellPlate(WellPlateDescription),
}

/// 耗材稀疏描述
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LabwareDescriptor {
    Lid(LidDescriptor),
    PipetteTipBox(PipetteTipBoxDescriptor),
    Trash(TrashDescriptor),
    TubeHolder(TubeHolderDescriptor),
    WellPlate(WellPlateDescriptor),
}

/// 读取原始 JSON 并迁移到最新版本，返回 `(type, value)`
fn migrated<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(String, Value), D::Error> {
    let value = Value::deserialize(deserializer)?;
    let value = migration::default_registry()
        .migrate_to_latest(value)
        .map_err(de::Error::custom)?;
    let type_name = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| de::Error::missing_field("type"))?
        .to_string();
    Ok((type_name, value))
}

impl<'de> Deserialize<'de> for LabwareDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (type_name, value) = migrated(deserializer)?;
        let parsed = match type_name.as_str() {
            "Lid" => serde_json::from_value(value).map(Self::Lid),
            "PipetteTipBox" => serde_json::from_value(value).map(Self::PipetteTipBox),
            "Trash" => serde_json::from_value(value).map(Self::Trash),
            "TubeHolder" => serde_json::from_value(value).map(Self::TubeHolder),
            "WellPlate" => serde_json::from_value(value).map(Self::WellPlate),
            other => return Err(de::Error::unknown_variant(other, LABWARE_TYPES)),
        };
        parsed.map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for LabwareDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (type_name, value) = migrated(deserializer)?;
        let parsed = match type_name.as_str() {
            "Lid" => serde_json::from_value(value).map(Self::Lid),
            "PipetteTipBox" => serde_json::from_value(value).map(Self::PipetteTipBox),
            "Trash" => serde_json::from_value(value).map(Self::Trash),
            "TubeHolder" => serde_json::from_value(value).map(Self::TubeHolder),
            "WellPlate" => serde_json::from_value(value).map(Self::WellPlate),
            other => return Err(de::Error::unknown_variant(other, LABWARE_TYPES)),
        };
        parsed.map_err(de::Error::custom)
    }
}

impl LabwareDescription {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Lid(_) => "Lid",
            Self::PipetteTipBox(_) => "PipetteTipBox",
            Self::Trash(_) => "Trash",
            Self::TubeHolder(_) => "TubeHolder",
            Self::WellPlate(_) => "WellPlate",
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            Self::Lid(l) => &l.tags,
            Self::PipetteTipBox(l) => &l.tags,
            Self::Trash(l) => &l.tags,
            Self::TubeHolder(l) => &l.tags,
            Self::WellPlate(l) => &l.tags,
        }
    }

    pub fn named_tags(&self) -> &NamedTags {
        match self {
            Self::Lid(l) => &l.named_tags,
            Self::PipetteTipBox(l) => &l.named_tags,
            Self::Trash(l) => &l.named_tags,
            Self::TubeHolder(l) => &l.named_tags,
            Self::WellPlate(l) => &l.named_tags,
        }
    }

    /// 外形尺寸 `[x, y, z]`
    pub fn extents(&self) -> [&ValueWithUnits; 3] {
        match self {
            Self::Lid(l) => [&l.x_length, &l.y_length, &l.z_length],
            Self::PipetteTipBox(l) => [&l.x_length, &l.y_length, &l.z_length],
            Self::Trash(l) => [&l.x_length, &l.y_length, &l.z_length],
            Self::TubeHolder(l) => [&l.x_length, &l.y_length, &l.z_length],
            Self::WellPlate(l) => [&l.x_length, &l.y_length, &l.z_length],
        }
    }

    /// 网格（单孔耗材返回 `None`）
    pub fn grid(&self) -> Option<&GridDescription> {
        match self {
            Self::PipetteTipBox(l) => Some(&l.grid),
            Self::TubeHolder(l) => Some(&l.grid),
            Self::WellPlate(l) => Some(&l.grid),
            Self::Lid(_) | Self::Trash(_) => None,
        }
    }
}

impl LabwareDescriptor {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Lid(_) => "Lid",
            Self::PipetteTipBox(_) => "PipetteTipBox",
            Self::Trash(_) => "Trash",
            Self::TubeHolder(_) => "TubeHolder",
            Self::WellPlate(_) => "WellPlate",
        }
    }
}

macro_rules! impl_labware_from {
    ($($variant:ident => $description:ty, $descriptor:ty;)*) => {
        $(
            impl From<$description> for LabwareDescription {
                fn from(value: $description) -> Self {
                    LabwareDescription::$variant(value)
                }
            }

            impl From<$descriptor> for LabwareDescriptor {
                fn from(value: $descriptor) -> Self {
                    LabwareDescriptor::$variant(value)
                }
            }
        )*
    };
}

impl_labware_from! {
    Lid => LidDescription, LidDescriptor;
    PipetteTipBox => PipetteTipBoxDescription, PipetteTipBoxDescriptor;
    Trash => TrashDescription, TrashDescriptor;
    TubeHolder => TubeHolderDescription, TubeHolderDescriptor;
    WellPlate => WellPlateDescription, WellPlateDescriptor;
}
