//! 协议枚举值
//!
//! 整数枚举（`PathType`、`TrajectoryType`、`GripperStateType`）在线路上是整数，
//! 字符串枚举（`GraspType`、`WellPartType`）在线路上是大写字符串。
//! 修改枚举时，必须同时提升所有引用它的 schema 的 `schema_version`。

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// 移动到目标位置的路径类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(into = "u8", try_from = "u8")]
pub enum PathType {
    /// 关节空间直接移动
    Direct = 1,
    /// 经安全路径移动
    Safe = 2,
    /// 距离较近时 DIRECT，否则 SAFE
    Shortcut = 3,
}

/// 关节运动曲线类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(into = "u8", try_from = "u8")]
pub enum TrajectoryType {
    /// 关节空间方波曲线
    JointSquare = 1,
    /// 关节空间梯形曲线
    JointTrapezoidal = 2,
    /// 笛卡尔空间直线
    JointLinear = 3,
}

/// 夹爪状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(into = "u8", try_from = "u8")]
pub enum GripperStateType {
    Open = 1,
    Close = 2,
    /// 指定手指间距（配合 `finger_separation`）
    Width = 3,
}

/// 夹爪抓取耗材的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GraspType {
    /// 由 servicer 决定（当前等同 LIFT）
    #[default]
    Unspecified,
    /// 从底部托起，仅适用于支持该动作的 holder（如 DeckSlot）
    Lift,
    /// 从侧面夹持，稳定性较差
    Pinch,
}

/// 孔位的可寻址部位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WellPartType {
    /// 孔中心，与耗材顶面共面
    Top,
    /// 孔最深处（以孔口中心为准）
    #[default]
    Bottom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_enums_on_wire() {
        assert_eq!(serde_json::to_string(&PathType::Safe).unwrap(), "2");
        assert_eq!(
            serde_json::from_str::<TrajectoryType>("3").unwrap(),
            TrajectoryType::JointLinear
        );
        assert_eq!(
            serde_json::to_string(&GripperStateType::Width).unwrap(),
            "3"
        );
        assert!(serde_json::from_str::<PathType>("7").is_err());
    }

    #[test]
    fn test_string_enums_on_wire() {
        assert_eq!(
            serde_json::to_string(&GraspType::Unspecified).unwrap(),
            "\"UNSPECIFIED\""
        );
        assert_eq!(
            serde_json::from_str::<WellPartType>("\"TOP\"").unwrap(),
            WellPartType::Top
        );
        assert_eq!(GraspType::default(), GraspType::Unspecified);
        assert_eq!(WellPartType::default(), WellPartType::Bottom);
    }

    #[test]
    fn test_try_from_primitive() {
        assert_eq!(GripperStateType::try_from(1u8).unwrap(), GripperStateType::Open);
        assert!(GripperStateType::try_from(0u8).is_err());
        let raw: u8 = PathType::Shortcut.into();
        assert_eq!(raw, 3);
    }
}
