//! 运动、液体处理、耗材搬运与校准命令

use crate::enums::{GraspType, GripperStateType, PathType, TrajectoryType};
use crate::location::{LabwareHolder, LabwareLocation, Location};
use crate::transform::Transform;
use crate::units::ValueWithUnits;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

/// 用夹爪拿起耗材
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickUpLabware {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub labware_id: String,
    #[serde(default)]
    pub grasp_type: GraspType,
    #[serde(default)]
    pub offset_transform: Transform,
}

/// 把夹爪中的耗材放到 holder 上
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutDownLabware {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub holder: LabwareHolder,
    #[serde(default)]
    pub offset_transform: Transform,
}

/// 吸液：`volume` 为体积，`speed` 为体积/时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspirate {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub volume: ValueWithUnits,
    pub speed: ValueWithUnits,
}

/// 排液：`volume` 为体积，`speed` 为体积/时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispense {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub volume: ValueWithUnits,
    pub speed: ValueWithUnits,
}

/// 把控制点移动到目标位置
///
/// - `location_offset`：作用于目标位置的偏移，servicer 会拒绝平移分量超过安全上限的偏移
/// - `flange`：可选的替代控制点，`flange_offset` 为其偏移
/// - `path_type`/`trajectory_type`：路径与轨迹提示，缺省由 servicer 决定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToLocation {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub location: Location,
    #[serde(default)]
    pub location_offset: Transform,
    #[serde(default)]
    pub flange: Option<Location>,
    #[serde(default)]
    pub flange_offset: Transform,
    #[serde(default)]
    pub path_type: Option<PathType>,
    #[serde(default)]
    pub trajectory_type: Option<TrajectoryType>,
}

/// 关节空间移动；`relative = true` 时为相对当前关节位置的增量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToJointPose {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub joint_positions: Vec<ValueWithUnits>,
    pub relative: bool,
}

/// 夹爪开合；`WIDTH` 时使用 `finger_separation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveGripper {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub gripper_state_type: GripperStateType,
    #[serde(default)]
    pub finger_separation: Option<ValueWithUnits>,
}

/// 校准当前工具的探测偏移
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateToolForProbing {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    /// 只校准 z 方向
    pub z_only: bool,
    /// 是否把结果持久化到机器人配置
    #[serde(default)]
    pub persistent: bool,
}

/// 探测耗材高度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateLabwareHeight {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub location: LabwareLocation,
    pub persistent: bool,
}

/// 探测孔深；`modify_all_wells` 为真时把结果应用到耗材的所有孔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateLabwareWellDepth {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub location: LabwareLocation,
    pub persistent: bool,
    #[serde(default = "default_modify_all_wells")]
    pub modify_all_wells: bool,
}

fn default_modify_all_wells() -> bool {
    true
}
