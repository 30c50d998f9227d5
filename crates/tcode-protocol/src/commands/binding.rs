//! ID 绑定与耗材增删命令

use crate::location::LabwareHolder;
use crate::schema::{
    LabwareDescription, LabwareDescriptor, PipetteTipGroupDescriptor, RobotDescriptor,
    ToolDescriptor,
};
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

/// 在 fleet 中匹配一台机器人并绑定到 `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRobot {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub id: String,
    pub descriptor: RobotDescriptor,
}

/// 在目标机器人上匹配一个工具并绑定到 `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddTool {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub id: String,
    pub descriptor: ToolDescriptor,
}

/// 在 fleet 中匹配一个耗材并绑定到 `id`
///
/// 提供 `lid_id` 时同时绑定耗材上的盖子，此时 descriptor 必须表明耗材有盖子。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddLabware {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub id: String,
    pub descriptor: LabwareDescriptor,
    #[serde(default)]
    pub lid_id: Option<String>,
}

/// 在 fleet 中匹配一组枪头并绑定到 `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPipetteTipGroup {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub id: String,
    pub descriptor: PipetteTipGroupDescriptor,
}

/// 在目标机器人的台面上登记一个新的实体耗材
///
/// 完整描述不会被解析匹配；之后 servicer 视 `holder` 为已占用。
/// 本命令不绑定 ID，需要再用 `ADD_LABWARE` 引用它。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLabware {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub description: LabwareDescription,
    pub holder: LabwareHolder,
}

/// 从目标机器人台面上移除耗材；之后该耗材不再参与 `ADD_LABWARE` 匹配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteLabware {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub labware_id: String,
}

/// 取下耗材的盖子，可选放到 `storage_holder`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveLabwareLid {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub labware_id: String,
    #[serde(default)]
    pub storage_holder: Option<LabwareHolder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceLabwareLid {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub labware_id: String,
    pub lid_id: String,
}
