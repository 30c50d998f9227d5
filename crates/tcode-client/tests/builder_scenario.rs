//! 脚本构建与读写的端到端场景
//!
//! 一台机器人 `r0`、一支单通道移液器 `t0`、一块孔板 `l0`：
//! 取工具 → 移到 A1 孔底 → 吸液 → 放回工具，写出后再读回。

use tcode_client::{BuilderError, ScriptBuilder};
use tcode_protocol::units::{ul, ul_per_s};
use tcode_protocol::{
    IdKind, LabwareDescriptor, Location, RobotDescriptor, TCode, TCodeScript, ToolDescriptor,
    WellPartType, WellPlateDescriptor,
};
use tcode_tools::{GridLayout, describe_well_plate};

fn scenario() -> ScriptBuilder {
    let mut builder = ScriptBuilder::new("aspirate_once", Some("scenario".into()));
    builder.add_robot("r0", RobotDescriptor::default()).unwrap();
    builder
        .add_tool("r0", "t0", ToolDescriptor::single_channel_pipette())
        .unwrap();
    builder
        .add_labware(
            "l0",
            describe_well_plate(Vec::new(), Default::default(), &GridLayout::default(), false),
            None,
        )
        .unwrap();

    builder.retrieve_tool("r0", "t0").unwrap();
    let well = builder
        .location_at_labware_index("l0", 0, WellPartType::Bottom)
        .unwrap();
    builder.move_to_location("r0", well).unwrap();
    builder.aspirate("r0", ul(100.0), ul_per_s(25.0)).unwrap();
    builder.return_tool("r0").unwrap();
    builder
}

#[test]
fn test_scenario_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aspirate_once.json");

    let builder = scenario();
    builder.write(&path, false).unwrap();

    let restored = ScriptBuilder::read(&path).unwrap();
    assert_eq!(restored.commands(), builder.commands());
    assert!(restored.script().equals_ignoring_timestamp(builder.script()));

    // l0 的绑定在读回后仍然存在
    match restored.find_labware_by_id("l0").unwrap() {
        LabwareDescriptor::WellPlate(plate) => {
            assert_eq!(plate.grid.as_ref().unwrap().row_count, Some(8));
        },
        other => panic!("expected well plate, got {:?}", other),
    }
    assert!(
        restored
            .location_at_labware_index("l0", 95, WellPartType::Top)
            .is_ok()
    );
}

#[test]
fn test_scenario_command_order() {
    let script = scenario().build();
    let types: Vec<_> = script.commands.iter().map(TCode::type_name).collect();
    assert_eq!(
        types,
        vec![
            "ADD_ROBOT",
            "ADD_TOOL",
            "ADD_LABWARE",
            "RETRIEVE_TOOL",
            "MOVE_TO_LOCATION",
            "ASPIRATE",
            "RETURN_TOOL",
        ]
    );

    match &script.commands[4] {
        TCode::MoveToLocation(c) => {
            assert_eq!(c.location, Location::labware_index("l0", 0, WellPartType::Bottom));
            assert!(c.location_offset.is_identity());
        },
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_json_round_trip_in_memory() {
    let script = scenario().build();
    let mut buffer = Vec::new();
    script.write(&mut buffer).unwrap();

    let restored = TCodeScript::read(buffer.as_slice()).unwrap();
    assert_eq!(restored, script);

    let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    assert_eq!(json["commands"][5]["type"], "ASPIRATE");
    assert_eq!(json["commands"][5]["volume"]["units"], "uL");
}

#[test]
fn test_binding_twice_fails_for_every_kind() {
    let mut builder = scenario();

    let err = builder.add_robot("r0", RobotDescriptor::default()).unwrap_err();
    assert!(matches!(err, BuilderError::IdExists { kind: IdKind::Robot, .. }));

    let err = builder
        .add_tool("r0", "t0", ToolDescriptor::eight_channel_pipette())
        .unwrap_err();
    assert!(matches!(err, BuilderError::IdExists { kind: IdKind::Tool, .. }));

    let err = builder
        .add_labware("l0", WellPlateDescriptor::default(), None)
        .unwrap_err();
    assert!(matches!(err, BuilderError::IdExists { kind: IdKind::Labware, .. }));
}

#[test]
fn test_unregistered_labware_index_fails() {
    let builder = scenario();
    for index in [0, 11, 84, 95, 1_000] {
        let err = builder
            .location_at_labware_index("l1", index, WellPartType::Bottom)
            .unwrap_err();
        assert!(matches!(err, BuilderError::IdNotFound { kind: IdKind::Labware, .. }));
    }
}
