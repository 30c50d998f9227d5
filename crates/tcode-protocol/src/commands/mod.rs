//! TCode 命令
//!
//! [`TCode`] 是以 `type` 字段区分的命令联合体，共 30 种命令，每种都带 `schema_version: 1`。
//! 机器人相关的命令另带 `robot_id`，指定目标机器人。
//!
//! | 类别 | 命令 |
//! |---|---|
//! | 绑定 | `ADD_ROBOT`, `ADD_TOOL`, `ADD_LABWARE`, `ADD_PIPETTE_TIP_GROUP` |
//! | 耗材增删 | `CREATE_LABWARE`, `DELETE_LABWARE`, `REMOVE_LABWARE_LID`, `REPLACE_LABWARE_LID` |
//! | 工具 | `RETRIEVE_TOOL`, `RETURN_TOOL`, `SWAP_TO_TOOL` |
//! | 枪头 | `RETRIEVE_PIPETTE_TIP_GROUP`, `RETURN_PIPETTE_TIP_GROUP`, `DISCARD_PIPETTE_TIP_GROUP`, `PICK_UP_PIPETTE_TIP`, `PUT_DOWN_PIPETTE_TIP` |
//! | 耗材搬运 | `PICK_UP_LABWARE`, `PUT_DOWN_LABWARE` |
//! | 液体 | `ASPIRATE`, `DISPENSE` |
//! | 运动 | `MOVE_TO_LOCATION`, `MOVE_TO_JOINT_POSE`, `MOVE_GRIPPER` |
//! | 校准 | `CALIBRATE_TOOL_FOR_PROBING`, `CALIBRATE_LABWARE_HEIGHT`, `CALIBRATE_LABWARE_WELL_DEPTH` |
//! | 控制 | `PAUSE`, `WAIT`, `COMMENT`, `SEND_WEBHOOK` |

pub mod binding;
pub mod control;
pub mod equipment;
pub mod motion;

pub use binding::*;
pub use control::*;
pub use equipment::*;
pub use motion::*;

use crate::error::ProtocolError;
use crate::location::{LabwareHolder, Location};
use crate::units::{Dimension, ValueWithUnits};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 命令联合体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TCode {
    AddRobot(AddRobot),
    AddTool(AddTool),
    AddLabware(AddLabware),
    AddPipetteTipGroup(AddPipetteTipGroup),
    CreateLabware(CreateLabware),
    DeleteLabware(DeleteLabware),
    RemoveLabwareLid(RemoveLabwareLid),
    ReplaceLabwareLid(ReplaceLabwareLid),
    RetrieveTool(RetrieveTool),
    ReturnTool(ReturnTool),
    SwapToTool(SwapToTool),
    RetrievePipetteTipGroup(RetrievePipetteTipGroup),
    ReturnPipetteTipGroup(ReturnPipetteTipGroup),
    DiscardPipetteTipGroup(DiscardPipetteTipGroup),
    PickUpPipetteTip(PickUpPipetteTip),
    PutDownPipetteTip(PutDownPipetteTip),
    PickUpLabware(PickUpLabware),
    PutDownLabware(PutDownLabware),
    Aspirate(Aspirate),
    Dispense(Dispense),
    MoveToLocation(MoveToLocation),
    MoveToJointPose(MoveToJointPose),
    MoveGripper(MoveGripper),
    CalibrateToolForProbing(CalibrateToolForProbing),
    CalibrateLabwareHeight(CalibrateLabwareHeight),
    CalibrateLabwareWellDepth(CalibrateLabwareWellDepth),
    Pause(Pause),
    Wait(Wait),
    Comment(Comment),
    SendWebhook(SendWebhook),
}

/// symbolic ID 的实体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdKind {
    Robot,
    Tool,
    Labware,
    PipetteTipGroup,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdKind::Robot => "robot",
            IdKind::Tool => "tool",
            IdKind::Labware => "labware",
            IdKind::PipetteTipGroup => "pipette tip group",
        };
        f.write_str(name)
    }
}

impl TCode {
    /// 线路上的 `type` 值
    pub fn type_name(&self) -> &'static str {
        match self {
            TCode::AddRobot(_) => "ADD_ROBOT",
            TCode::AddTool(_) => "ADD_TOOL",
            TCode::AddLabware(_) => "ADD_LABWARE",
            TCode::AddPipetteTipGroup(_) => "ADD_PIPETTE_TIP_GROUP",
            TCode::CreateLabware(_) => "CREATE_LABWARE",
            TCode::DeleteLabware(_) => "DELETE_LABWARE",
            TCode::RemoveLabwareLid(_) => "REMOVE_LABWARE_LID",
            TCode::ReplaceLabwareLid(_) => "REPLACE_LABWARE_LID",
            TCode::RetrieveTool(_) => "RETRIEVE_TOOL",
            TCode::ReturnTool(_) => "RETURN_TOOL",
            TCode::SwapToTool(_) => "SWAP_TO_TOOL",
            TCode::RetrievePipetteTipGroup(_) => "RETRIEVE_PIPETTE_TIP_GROUP",
            TCode::ReturnPipetteTipGroup(_) => "RETURN_PIPETTE_TIP_GROUP",
            TCode::DiscardPipetteTipGroup(_) => "DISCARD_PIPETTE_TIP_GROUP",
            TCode::PickUpPipetteTip(_) => "PICK_UP_PIPETTE_TIP",
            TCode::PutDownPipetteTip(_) => "PUT_DOWN_PIPETTE_TIP",
            TCode::PickUpLabware(_) => "PICK_UP_LABWARE",
            TCode::PutDownLabware(_) => "PUT_DOWN_LABWARE",
            TCode::Aspirate(_) => "ASPIRATE",
            TCode::Dispense(_) => "DISPENSE",
            TCode::MoveToLocation(_) => "MOVE_TO_LOCATION",
            TCode::MoveToJointPose(_) => "MOVE_TO_JOINT_POSE",
            TCode::MoveGripper(_) => "MOVE_GRIPPER",
            TCode::CalibrateToolForProbing(_) => "CALIBRATE_TOOL_FOR_PROBING",
            TCode::CalibrateLabwareHeight(_) => "CALIBRATE_LABWARE_HEIGHT",
            TCode::CalibrateLabwareWellDepth(_) => "CALIBRATE_LABWARE_WELL_DEPTH",
            TCode::Pause(_) => "PAUSE",
            TCode::Wait(_) => "WAIT",
            TCode::Comment(_) => "COMMENT",
            TCode::SendWebhook(_) => "SEND_WEBHOOK",
        }
    }

    /// 目标机器人（fleet 级命令返回 `None`）
    pub fn robot_id(&self) -> Option<&str> {
        let robot_id = match self {
            TCode::AddRobot(_)
            | TCode::AddLabware(_)
            | TCode::AddPipetteTipGroup(_)
            | TCode::Pause(_)
            | TCode::Comment(_)
            | TCode::SendWebhook(_) => return None,
            TCode::AddTool(c) => &c.robot_id,
            TCode::CreateLabware(c) => &c.robot_id,
            TCode::DeleteLabware(c) => &c.robot_id,
            TCode::RemoveLabwareLid(c) => &c.robot_id,
            TCode::ReplaceLabwareLid(c) => &c.robot_id,
            TCode::RetrieveTool(c) => &c.robot_id,
            TCode::ReturnTool(c) => &c.robot_id,
            TCode::SwapToTool(c) => &c.robot_id,
            TCode::RetrievePipetteTipGroup(c) => &c.robot_id,
            TCode::ReturnPipetteTipGroup(c) => &c.robot_id,
            TCode::DiscardPipetteTipGroup(c) => &c.robot_id,
            TCode::PickUpPipetteTip(c) => &c.robot_id,
            TCode::PutDownPipetteTip(c) => &c.robot_id,
            TCode::PickUpLabware(c) => &c.robot_id,
            TCode::PutDownLabware(c) => &c.robot_id,
            TCode::Aspirate(c) => &c.robot_id,
            TCode::Dispense(c) => &c.robot_id,
            TCode::MoveToLocation(c) => &c.robot_id,
            TCode::MoveToJointPose(c) => &c.robot_id,
            TCode::MoveGripper(c) => &c.robot_id,
            TCode::CalibrateToolForProbing(c) => &c.robot_id,
            TCode::CalibrateLabwareHeight(c) => &c.robot_id,
            TCode::CalibrateLabwareWellDepth(c) => &c.robot_id,
            TCode::Wait(c) => &c.robot_id,
        };
        Some(robot_id.as_str())
    }

    pub fn is_robot_specific(&self) -> bool {
        self.robot_id().is_some()
    }

    /// `ADD_*` 命令绑定的主 ID
    pub fn bound_id(&self) -> Option<(IdKind, &str)> {
        match self {
            TCode::AddRobot(c) => Some((IdKind::Robot, c.id.as_str())),
            TCode::AddTool(c) => Some((IdKind::Tool, c.id.as_str())),
            TCode::AddLabware(c) => Some((IdKind::Labware, c.id.as_str())),
            TCode::AddPipetteTipGroup(c) => Some((IdKind::PipetteTipGroup, c.id.as_str())),
            _ => None,
        }
    }

    /// 命令绑定的所有 ID（`ADD_LABWARE` 的 `lid_id` 也是耗材 ID）
    pub fn bound_ids(&self) -> Vec<(IdKind, &str)> {
        let mut ids: Vec<_> = self.bound_id().into_iter().collect();
        if let TCode::AddLabware(AddLabware {
            lid_id: Some(lid_id),
            ..
        }) = self
        {
            ids.push((IdKind::Labware, lid_id.as_str()));
        }
        ids
    }

    /// 命令引用（而非绑定）的所有 ID，按出现顺序
    ///
    /// 机器人相关命令的 `robot_id` 总是第一个。
    pub fn referenced_ids(&self) -> Vec<(IdKind, &str)> {
        let mut ids: Vec<(IdKind, &str)> = Vec::new();
        if let Some(robot_id) = self.robot_id() {
            ids.push((IdKind::Robot, robot_id));
        }

        match self {
            TCode::CreateLabware(c) => holder_ids(&c.holder, &mut ids),
            TCode::DeleteLabware(c) => ids.push((IdKind::Labware, c.labware_id.as_str())),
            TCode::RemoveLabwareLid(c) => {
                ids.push((IdKind::Labware, c.labware_id.as_str()));
                if let Some(holder) = &c.storage_holder {
                    holder_ids(holder, &mut ids);
                }
            },
            TCode::ReplaceLabwareLid(c) => {
                ids.push((IdKind::Labware, c.labware_id.as_str()));
                ids.push((IdKind::Labware, c.lid_id.as_str()));
            },
            TCode::RetrieveTool(c) => ids.push((IdKind::Tool, c.id.as_str())),
            TCode::SwapToTool(c) => {
                if let Some(id) = &c.id {
                    ids.push((IdKind::Tool, id.as_str()));
                }
            },
            TCode::RetrievePipetteTipGroup(c) => ids.push((IdKind::PipetteTipGroup, c.id.as_str())),
            TCode::PickUpPipetteTip(c) => location_ids(&c.location, &mut ids),
            TCode::PutDownPipetteTip(c) => location_ids(&c.location, &mut ids),
            TCode::PickUpLabware(c) => ids.push((IdKind::Labware, c.labware_id.as_str())),
            TCode::PutDownLabware(c) => holder_ids(&c.holder, &mut ids),
            TCode::MoveToLocation(c) => {
                location_ids(&c.location, &mut ids);
                if let Some(flange) = &c.flange {
                    location_ids(flange, &mut ids);
                }
            },
            TCode::CalibrateLabwareHeight(c) => {
                ids.push((IdKind::Labware, c.location.labware_id()));
            },
            TCode::CalibrateLabwareWellDepth(c) => {
                ids.push((IdKind::Labware, c.location.labware_id()));
            },
            _ => {},
        }
        ids
    }

    /// 本地可做的负载检查
    ///
    /// - `SEND_WEBHOOK` 负载不超过 32 KiB
    /// - `ASPIRATE`/`DISPENSE` 的 `volume` 为体积、`speed` 为体积/时间
    /// - `WAIT` 的 `duration` 为时间
    /// - `MOVE_GRIPPER` 的 `finger_separation` 为长度
    ///
    /// 检查是建议性的，servicer 仍会做权威校验。
    pub fn check_payload(&self) -> Result<(), ProtocolError> {
        match self {
            TCode::SendWebhook(c) => {
                let size = c.payload.as_ref().map_or(0, String::len);
                if size > MAX_WEBHOOK_PAYLOAD_BYTES {
                    return Err(ProtocolError::PayloadTooLarge {
                        size,
                        max: MAX_WEBHOOK_PAYLOAD_BYTES,
                    });
                }
            },
            TCode::Aspirate(Aspirate { volume, speed, .. })
            | TCode::Dispense(Dispense { volume, speed, .. }) => {
                let command = self.type_name();
                expect_dimension(command, "volume", volume, Dimension::VOLUME, "volume")?;
                expect_dimension(
                    command,
                    "speed",
                    speed,
                    Dimension::FLOW_RATE,
                    "volume/time",
                )?;
            },
            TCode::Wait(c) => {
                expect_dimension("WAIT", "duration", &c.duration, Dimension::TIME, "time")?;
            },
            TCode::MoveGripper(MoveGripper {
                finger_separation: Some(separation),
                ..
            }) => {
                expect_dimension(
                    "MOVE_GRIPPER",
                    "finger_separation",
                    separation,
                    Dimension::LENGTH,
                    "length",
                )?;
            },
            _ => {},
        }
        Ok(())
    }
}

fn expect_dimension(
    command: &'static str,
    field: &'static str,
    value: &ValueWithUnits,
    expected: Dimension,
    expected_name: &'static str,
) -> Result<(), ProtocolError> {
    if value.dimension()? != expected {
        return Err(ProtocolError::WrongDimension {
            command,
            field,
            expected: expected_name,
            units: value.units.clone(),
        });
    }
    Ok(())
}

fn location_ids<'a>(location: &'a Location, ids: &mut Vec<(IdKind, &'a str)>) {
    if let Some(labware_id) = location.labware_id() {
        ids.push((IdKind::Labware, labware_id));
    }
    if let Some(robot_id) = location.robot_id() {
        ids.push((IdKind::Robot, robot_id));
    }
}

fn holder_ids<'a>(holder: &'a LabwareHolder, ids: &mut Vec<(IdKind, &'a str)>) {
    match holder {
        LabwareHolder::LabwareHolderName(h) => ids.push((IdKind::Robot, h.robot_id.as_str())),
        LabwareHolder::LabwareId(h) => ids.push((IdKind::Labware, h.id.as_str())),
    }
}

macro_rules! impl_from_command {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for TCode {
                fn from(command: $variant) -> Self {
                    TCode::$variant(command)
                }
            }
        )*
    };
}

impl_from_command!(
    AddRobot,
    AddTool,
    AddLabware,
    AddPipetteTipGroup,
    CreateLabware,
    DeleteLabware,
    RemoveLabwareLid,
    ReplaceLabwareLid,
    RetrieveTool,
    ReturnTool,
    SwapToTool,
    RetrievePipetteTipGroup,
    ReturnPipetteTipGroup,
    DiscardPipetteTipGroup,
    PickUpPipetteTip,
    PutDownPipetteTip,
    PickUpLabware,
    PutDownLabware,
    Aspirate,
    Dispense,
    MoveToLocation,
    MoveToJointPose,
    MoveGripper,
    CalibrateToolForProbing,
    CalibrateLabwareHeight,
    CalibrateLabwareWellDepth,
    Pause,
    Wait,
    Comment,
    SendWebhook,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::WellPartType;
    use crate::schema::{PipetteTipGroupDescriptor, RobotDescriptor, ToolDescriptor};
    use crate::transform::Transform;
    use crate::units::{mm, s, ul, ul_per_s};
    use crate::version::SchemaVersion;
    use serde_json::json;

    fn aspirate(volume: ValueWithUnits, speed: ValueWithUnits) -> TCode {
        Aspirate {
            schema_version: SchemaVersion,
            robot_id: "r0".into(),
            volume,
            speed,
        }
        .into()
    }

    #[test]
    fn test_wire_tag_matches_type_name() {
        let commands: Vec<TCode> = vec![
            Pause::default().into(),
            AddRobot {
                schema_version: SchemaVersion,
                id: "r0".into(),
                descriptor: RobotDescriptor::default(),
            }
            .into(),
            ReturnPipetteTipGroup {
                schema_version: SchemaVersion,
                robot_id: "r0".into(),
            }
            .into(),
            CalibrateToolForProbing {
                schema_version: SchemaVersion,
                robot_id: "r0".into(),
                z_only: true,
                persistent: false,
            }
            .into(),
            aspirate(ul(10.0), ul_per_s(5.0)),
        ];
        for command in commands {
            let json = serde_json::to_value(&command).unwrap();
            assert_eq!(json["type"], command.type_name());
            assert_eq!(json["schema_version"], 1);
        }
    }

    #[test]
    fn test_parse_with_defaults() {
        let command: TCode = serde_json::from_value(json!({
            "type": "PICK_UP_LABWARE",
            "robot_id": "r0",
            "labware_id": "plate",
        }))
        .unwrap();
        let TCode::PickUpLabware(c) = &command else {
            panic!("expected PICK_UP_LABWARE");
        };
        assert_eq!(c.grasp_type, crate::enums::GraspType::Unspecified);
        assert!(c.offset_transform.is_identity());

        let command: TCode = serde_json::from_value(json!({
            "type": "CALIBRATE_LABWARE_WELL_DEPTH",
            "robot_id": "r0",
            "location": {"type": "LocationAsLabwareIndex", "labware_id": "plate",
                         "location_index": 0, "well_part": "BOTTOM"},
            "persistent": false,
        }))
        .unwrap();
        let TCode::CalibrateLabwareWellDepth(c) = command else {
            panic!("expected CALIBRATE_LABWARE_WELL_DEPTH");
        };
        assert!(c.modify_all_wells);
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_value::<TCode>(json!({"type": "LAUNCH"})).is_err());
    }

    #[test]
    fn test_robot_specific() {
        assert!(!TCode::from(Pause::default()).is_robot_specific());
        let comment = TCode::from(Comment {
            schema_version: SchemaVersion,
            text: "hello".into(),
        });
        assert_eq!(comment.robot_id(), None);
        assert_eq!(aspirate(ul(1.0), ul_per_s(1.0)).robot_id(), Some("r0"));
    }

    #[test]
    fn test_bound_ids() {
        let command = TCode::from(AddTool {
            schema_version: SchemaVersion,
            robot_id: "r0".into(),
            id: "pipette".into(),
            descriptor: ToolDescriptor::single_channel_pipette(),
        });
        assert_eq!(command.bound_id(), Some((IdKind::Tool, "pipette")));
        assert_eq!(command.referenced_ids(), vec![(IdKind::Robot, "r0")]);

        let command = TCode::from(AddPipetteTipGroup {
            schema_version: SchemaVersion,
            id: "tips".into(),
            descriptor: PipetteTipGroupDescriptor::new(1, 1),
        });
        assert_eq!(command.bound_ids(), vec![(IdKind::PipetteTipGroup, "tips")]);
        assert!(command.referenced_ids().is_empty());
    }

    #[test]
    fn test_referenced_ids_from_locations() {
        let command = TCode::from(MoveToLocation {
            schema_version: SchemaVersion,
            robot_id: "r0".into(),
            location: Location::labware_index("plate", 3, WellPartType::Top),
            location_offset: Transform::IDENTITY,
            flange: Some(Location::relative_to_robot("r1", Transform::IDENTITY)),
            flange_offset: Transform::IDENTITY,
            path_type: None,
            trajectory_type: None,
        });
        assert_eq!(
            command.referenced_ids(),
            vec![
                (IdKind::Robot, "r0"),
                (IdKind::Labware, "plate"),
                (IdKind::Robot, "r1"),
            ]
        );
    }

    #[test]
    fn test_check_payload_dimensions() {
        assert!(aspirate(ul(10.0), ul_per_s(5.0)).check_payload().is_ok());
        assert!(aspirate(ValueWithUnits::new(0.01, "mL"), ValueWithUnits::new(1.0, "mL/min"))
            .check_payload()
            .is_ok());

        let err = aspirate(mm(10.0), ul_per_s(5.0)).check_payload().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::WrongDimension { field: "volume", .. }
        ));

        let wait = TCode::from(Wait {
            schema_version: SchemaVersion,
            robot_id: "r0".into(),
            duration: s(2.0),
        });
        assert!(wait.check_payload().is_ok());

        let bad_units = aspirate(ValueWithUnits::new(1.0, "parsecs"), ul_per_s(1.0));
        assert!(matches!(
            bad_units.check_payload(),
            Err(ProtocolError::Units(_))
        ));
    }

    #[test]
    fn test_webhook_payload_limit() {
        let webhook = |size: usize| {
            TCode::from(SendWebhook {
                schema_version: SchemaVersion,
                pause_execution: false,
                ignore_external_error: false,
                url: "http://localhost:8092/".into(),
                payload: Some("x".repeat(size)),
            })
        };
        assert!(webhook(MAX_WEBHOOK_PAYLOAD_BYTES).check_payload().is_ok());
        assert!(matches!(
            webhook(MAX_WEBHOOK_PAYLOAD_BYTES + 1).check_payload(),
            Err(ProtocolError::PayloadTooLarge { .. })
        ));
    }
}
