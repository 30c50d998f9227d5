//! 位置与耗材 holder
//!
//! [`Location`] 描述 fleet 坐标空间中的一个点；[`LabwareHolder`] 描述可以放置耗材的位置。
//! 两者都是以 `type` 字段区分的标签联合体。

use crate::enums::WellPartType;
use crate::transform::Transform;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

/// 以 fleet 内部 TransformTree 节点 ID 指定位置（调试用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAsNodeId {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub node_id: String,
}

/// 以机器人上的具名 holder 指定位置（通常是 `"DeckSlot_#"`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAsLabwareHolder {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub labware_holder_name: String,
}

/// 以耗材网格索引指定位置
///
/// 索引为行优先：96 孔板中 A1=0、A12=11、H1=84、H12=95。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAsLabwareIndex {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub labware_id: String,
    pub location_index: u32,
    pub well_part: WellPartType,
}

/// 相对耗材根节点的变换（用于琼脂平板等连续表面耗材）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRelativeToLabware {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub labware_id: String,
    pub matrix: Transform,
}

/// 相对机器人根节点的变换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRelativeToRobot {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub matrix: Transform,
}

/// 相对 fleet 根节点的变换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRelativeToWorld {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub matrix: Transform,
}

/// 相对机器人当前控制点的变换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRelativeToCurrentPosition {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub matrix: Transform,
}

/// 位置（标签联合体）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Location {
    LocationAsNodeId(LocationAsNodeId),
    LocationAsLabwareHolder(LocationAsLabwareHolder),
    LocationAsLabwareIndex(LocationAsLabwareIndex),
    LocationRelativeToLabware(LocationRelativeToLabware),
    LocationRelativeToRobot(LocationRelativeToRobot),
    LocationRelativeToWorld(LocationRelativeToWorld),
    LocationRelativeToCurrentPosition(LocationRelativeToCurrentPosition),
}

impl Location {
    pub fn node_id(node_id: impl Into<String>) -> Self {
        Location::LocationAsNodeId(LocationAsNodeId {
            schema_version: SchemaVersion,
            node_id: node_id.into(),
        })
    }

    pub fn labware_holder(robot_id: impl Into<String>, name: impl Into<String>) -> Self {
        Location::LocationAsLabwareHolder(LocationAsLabwareHolder {
            schema_version: SchemaVersion,
            robot_id: robot_id.into(),
            labware_holder_name: name.into(),
        })
    }

    pub fn labware_index(
        labware_id: impl Into<String>,
        location_index: u32,
        well_part: WellPartType,
    ) -> Self {
        Location::LocationAsLabwareIndex(LocationAsLabwareIndex {
            schema_version: SchemaVersion,
            labware_id: labware_id.into(),
            location_index,
            well_part,
        })
    }

    pub fn relative_to_labware(labware_id: impl Into<String>, matrix: Transform) -> Self {
        Location::LocationRelativeToLabware(LocationRelativeToLabware {
            schema_version: SchemaVersion,
            labware_id: labware_id.into(),
            matrix,
        })
    }

    pub fn relative_to_robot(robot_id: impl Into<String>, matrix: Transform) -> Self {
        Location::LocationRelativeToRobot(LocationRelativeToRobot {
            schema_version: SchemaVersion,
            robot_id: robot_id.into(),
            matrix,
        })
    }

    pub fn relative_to_world(matrix: Transform) -> Self {
        Location::LocationRelativeToWorld(LocationRelativeToWorld {
            schema_version: SchemaVersion,
            matrix,
        })
    }

    pub fn relative_to_current_position(matrix: Transform) -> Self {
        Location::LocationRelativeToCurrentPosition(LocationRelativeToCurrentPosition {
            schema_version: SchemaVersion,
            matrix,
        })
    }

    /// 位置引用的耗材 ID
    pub fn labware_id(&self) -> Option<&str> {
        match self {
            Location::LocationAsLabwareIndex(l) => Some(&l.labware_id),
            Location::LocationRelativeToLabware(l) => Some(&l.labware_id),
            _ => None,
        }
    }

    /// 位置引用的机器人 ID
    pub fn robot_id(&self) -> Option<&str> {
        match self {
            Location::LocationAsLabwareHolder(l) => Some(&l.robot_id),
            Location::LocationRelativeToRobot(l) => Some(&l.robot_id),
            _ => None,
        }
    }
}

/// 校准命令可接受的位置子集（耗材索引或相对耗材）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LabwareLocation {
    LocationAsLabwareIndex(LocationAsLabwareIndex),
    LocationRelativeToLabware(LocationRelativeToLabware),
}

impl LabwareLocation {
    pub fn labware_id(&self) -> &str {
        match self {
            LabwareLocation::LocationAsLabwareIndex(l) => &l.labware_id,
            LabwareLocation::LocationRelativeToLabware(l) => &l.labware_id,
        }
    }
}

impl From<LabwareLocation> for Location {
    fn from(location: LabwareLocation) -> Self {
        match location {
            LabwareLocation::LocationAsLabwareIndex(l) => Location::LocationAsLabwareIndex(l),
            LabwareLocation::LocationRelativeToLabware(l) => {
                Location::LocationRelativeToLabware(l)
            },
        }
    }
}

/// 以机器人 ID + 名称指定的 holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabwareHolderName {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub name: String,
}

/// 以耗材 ID 指定的 holder（堆叠到另一个耗材上）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabwareId {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub id: String,
}

/// 耗材 holder（标签联合体）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LabwareHolder {
    LabwareHolderName(LabwareHolderName),
    LabwareId(LabwareId),
}

impl LabwareHolder {
    pub fn name(robot_id: impl Into<String>, name: impl Into<String>) -> Self {
        LabwareHolder::LabwareHolderName(LabwareHolderName {
            schema_version: SchemaVersion,
            robot_id: robot_id.into(),
            name: name.into(),
        })
    }

    pub fn labware(id: impl Into<String>) -> Self {
        LabwareHolder::LabwareId(LabwareId {
            schema_version: SchemaVersion,
            id: id.into(),
        })
    }
}
