//! 脚本构建器
//!
//! [`ScriptBuilder`] 在本地镜像 symbolic ID 的绑定关系，在脚本发往 servicer 之前拦截：
//! - 重复绑定（[`BuilderError::IdExists`]）
//! - 引用未绑定的 ID（[`BuilderError::IdNotFound`]）
//!
//! 构建器只是绑定关系的镜像，不跟踪工具装载、液量或校准状态，这些由 servicer 负责。
//!
//! # 使用示例
//!
//! ```rust
//! use tcode_client::ScriptBuilder;
//! use tcode_protocol::units::{ul, ul_per_s};
//! use tcode_protocol::{RobotDescriptor, ToolDescriptor, WellPartType, WellPlateDescriptor};
//!
//! # fn main() -> Result<(), tcode_client::BuilderError> {
//! let mut builder = ScriptBuilder::new("demo", None);
//! builder.add_robot("r0", RobotDescriptor::default())?;
//! builder.add_tool("r0", "t0", ToolDescriptor::single_channel_pipette())?;
//! builder.add_labware("l0", WellPlateDescriptor::default(), None)?;
//!
//! builder.retrieve_tool("r0", "t0")?;
//! let well = builder.location_at_labware_index("l0", 0, WellPartType::Bottom)?;
//! builder.move_to_location("r0", well)?;
//! builder.aspirate("r0", ul(100.0), ul_per_s(25.0))?;
//! builder.return_tool("r0")?;
//!
//! let script = builder.build();
//! assert_eq!(script.commands.len(), 7);
//! # Ok(())
//! # }
//! ```

use crate::error::BuilderError;
use std::collections::BTreeMap;
use std::path::Path;
use tcode_protocol::{
    AddLabware, AddPipetteTipGroup, AddRobot, AddTool, Aspirate, Comment, CreateLabware,
    DiscardPipetteTipGroup, Dispense, GraspType, GripperStateType, IdKind, LabwareDescription,
    LabwareDescriptor, LabwareHolder, LidDescriptor, Location, MoveGripper, MoveToJointPose,
    MoveToLocation, Pause, PickUpLabware, PipetteTipGroupDescriptor, PutDownLabware,
    RetrievePipetteTipGroup, RetrieveTool, ReturnPipetteTipGroup, ReturnTool, RobotDescriptor,
    SchemaVersion, SendWebhook, SwapToTool, TCode, TCodeScript, ToolDescriptor, Transform,
    ValueWithUnits, Wait, WellPartType,
};
use tcode_tools::LabwareCatalog;
use tracing::debug;

/// 带本地 ID 校验的脚本构建器
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    script: TCodeScript,
    robots: BTreeMap<String, RobotDescriptor>,
    /// 工具按所属机器人登记：robot_id -> tool_id -> descriptor
    tools: BTreeMap<String, BTreeMap<String, ToolDescriptor>>,
    labware: BTreeMap<String, LabwareDescriptor>,
    pipette_tip_groups: BTreeMap<String, PipetteTipGroupDescriptor>,
}

impl ScriptBuilder {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            script: TCodeScript::new(name, description),
            robots: BTreeMap::new(),
            tools: BTreeMap::new(),
            labware: BTreeMap::new(),
            pipette_tip_groups: BTreeMap::new(),
        }
    }

    /// 从已有脚本恢复构建器，按顺序重放并检查每条命令
    pub fn from_script(script: TCodeScript) -> Result<Self, BuilderError> {
        let TCodeScript {
            schema_version,
            metadata,
            commands,
        } = script;

        let mut builder = Self {
            script: TCodeScript {
                schema_version,
                metadata,
                commands: Vec::with_capacity(commands.len()),
            },
            ..Self::new("", None)
        };
        for command in commands {
            builder.add_command(command)?;
        }
        Ok(builder)
    }

    /// 丢弃所有命令与绑定，重新开始
    pub fn reset(&mut self, name: impl Into<String>, description: Option<String>) {
        *self = Self::new(name, description);
    }

    pub fn script(&self) -> &TCodeScript {
        &self.script
    }

    pub fn commands(&self) -> &[TCode] {
        &self.script.commands
    }

    pub fn len(&self) -> usize {
        self.script.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.commands.is_empty()
    }

    pub fn build(self) -> TCodeScript {
        self.script
    }

    /// 写出脚本；`overwrite` 为假且文件已存在时返回错误
    pub fn write(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<(), BuilderError> {
        self.script.save(path, overwrite)?;
        Ok(())
    }

    /// 读取脚本并重建 ID 登记表
    pub fn read(path: impl AsRef<Path>) -> Result<Self, BuilderError> {
        let script = TCodeScript::load(path)?;
        Self::from_script(script)
    }

    // ==================== 命令追加 ====================

    /// 检查并追加一条命令
    ///
    /// - 命令绑定的 ID 不能已被绑定
    /// - 命令引用的 ID 必须已绑定；工具 ID 必须属于命令的目标机器人
    /// - 负载满足 [`TCode::check_payload`]
    pub fn add_command(&mut self, command: impl Into<TCode>) -> Result<(), BuilderError> {
        let command = command.into();
        self.check(&command)?;
        self.register(&command);
        self.script.commands.push(command);
        Ok(())
    }

    /// 不做任何检查直接追加
    pub fn add_command_unchecked(&mut self, command: impl Into<TCode>) {
        let command = command.into();
        self.register(&command);
        self.script.commands.push(command);
    }

    fn check(&self, command: &TCode) -> Result<(), BuilderError> {
        let mut binding: Vec<(IdKind, &str)> = Vec::new();
        for (kind, id) in command.bound_ids() {
            if self.is_bound(kind, id) || binding.contains(&(kind, id)) {
                return Err(BuilderError::exists(kind, id));
            }
            binding.push((kind, id));
        }

        for (kind, id) in command.referenced_ids() {
            match kind {
                IdKind::Tool => match command.robot_id() {
                    Some(robot_id) => {
                        self.find_tool_by_id(robot_id, id)?;
                    },
                    None => return Err(BuilderError::not_found(kind, id)),
                },
                _ if !self.is_bound(kind, id) => return Err(BuilderError::not_found(kind, id)),
                _ => {},
            }
        }

        command.check_payload()?;
        Ok(())
    }

    fn register(&mut self, command: &TCode) {
        match command {
            TCode::AddRobot(c) => {
                self.robots.insert(c.id.clone(), c.descriptor.clone());
            },
            TCode::AddTool(c) => {
                self.tools
                    .entry(c.robot_id.clone())
                    .or_default()
                    .insert(c.id.clone(), c.descriptor.clone());
            },
            TCode::AddLabware(c) => {
                self.labware.insert(c.id.clone(), c.descriptor.clone());
                if let Some(lid_id) = &c.lid_id {
                    self.labware
                        .insert(lid_id.clone(), LabwareDescriptor::Lid(lid_of(&c.descriptor)));
                }
            },
            TCode::AddPipetteTipGroup(c) => {
                self.pipette_tip_groups
                    .insert(c.id.clone(), c.descriptor.clone());
            },
            _ => return,
        }
        debug!(command = command.type_name(), "Registered binding");
    }

    fn is_bound(&self, kind: IdKind, id: &str) -> bool {
        match kind {
            IdKind::Robot => self.robots.contains_key(id),
            IdKind::Tool => self.tools.values().any(|tools| tools.contains_key(id)),
            IdKind::Labware => self.labware.contains_key(id),
            IdKind::PipetteTipGroup => self.pipette_tip_groups.contains_key(id),
        }
    }

    // ==================== 绑定 ====================

    pub fn add_robot(&mut self, id: &str, descriptor: RobotDescriptor) -> Result<(), BuilderError> {
        self.add_command(AddRobot {
            schema_version: SchemaVersion,
            id: id.to_string(),
            descriptor,
        })
    }

    /// 绑定工具；`robot_id` 必须已绑定，工具 ID 在所有机器人之间唯一
    pub fn add_tool(
        &mut self,
        robot_id: &str,
        id: &str,
        descriptor: ToolDescriptor,
    ) -> Result<(), BuilderError> {
        self.add_command(AddTool {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            id: id.to_string(),
            descriptor,
        })
    }

    /// 绑定耗材；`lid_id` 同时把耗材的盖子绑定为一个耗材 ID
    pub fn add_labware(
        &mut self,
        id: &str,
        descriptor: impl Into<LabwareDescriptor>,
        lid_id: Option<&str>,
    ) -> Result<(), BuilderError> {
        self.add_command(AddLabware {
            schema_version: SchemaVersion,
            id: id.to_string(),
            descriptor: descriptor.into(),
            lid_id: lid_id.map(str::to_string),
        })
    }

    pub fn add_pipette_tip_group(
        &mut self,
        id: &str,
        descriptor: PipetteTipGroupDescriptor,
    ) -> Result<(), BuilderError> {
        self.add_command(AddPipetteTipGroup {
            schema_version: SchemaVersion,
            id: id.to_string(),
            descriptor,
        })
    }

    /// 在 holder 上创建耗材
    ///
    /// 不绑定 ID；需要引用新耗材时，随后用匹配的 descriptor 调用 [`add_labware`](Self::add_labware)。
    pub fn create_labware(
        &mut self,
        robot_id: &str,
        description: impl Into<LabwareDescription>,
        holder: LabwareHolder,
    ) -> Result<(), BuilderError> {
        self.add_command(CreateLabware {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            description: description.into(),
            holder,
        })
    }

    /// 从耗材目录按名称取描述并创建
    pub fn create_labware_from_catalog<C: LabwareCatalog + ?Sized>(
        &mut self,
        robot_id: &str,
        catalog: &C,
        name: &str,
        holder: LabwareHolder,
    ) -> Result<(), BuilderError> {
        let description = catalog.load(name)?;
        self.create_labware(robot_id, description, holder)
    }

    // ==================== 查询 ====================

    pub fn find_robot_by_id(&self, id: &str) -> Result<&RobotDescriptor, BuilderError> {
        self.robots
            .get(id)
            .ok_or_else(|| BuilderError::not_found(IdKind::Robot, id))
    }

    /// 查找属于 `robot_id` 的工具
    pub fn find_tool_by_id(&self, robot_id: &str, id: &str) -> Result<&ToolDescriptor, BuilderError> {
        self.find_robot_by_id(robot_id)?;
        self.tools
            .get(robot_id)
            .and_then(|tools| tools.get(id))
            .ok_or_else(|| BuilderError::not_found(IdKind::Tool, id))
    }

    pub fn find_labware_by_id(&self, id: &str) -> Result<&LabwareDescriptor, BuilderError> {
        self.labware
            .get(id)
            .ok_or_else(|| BuilderError::not_found(IdKind::Labware, id))
    }

    pub fn find_pipette_tip_group_by_id(
        &self,
        id: &str,
    ) -> Result<&PipetteTipGroupDescriptor, BuilderError> {
        self.pipette_tip_groups
            .get(id)
            .ok_or_else(|| BuilderError::not_found(IdKind::PipetteTipGroup, id))
    }

    pub fn robot_ids(&self) -> impl Iterator<Item = &str> {
        self.robots.keys().map(String::as_str)
    }

    pub fn labware_ids(&self) -> impl Iterator<Item = &str> {
        self.labware.keys().map(String::as_str)
    }

    // ==================== 位置 ====================

    /// 耗材网格中的位置；不检查索引范围
    pub fn location_at_labware_index(
        &self,
        labware_id: &str,
        index: u32,
        well_part: WellPartType,
    ) -> Result<Location, BuilderError> {
        self.find_labware_by_id(labware_id)?;
        Ok(Location::labware_index(labware_id, index, well_part))
    }

    pub fn location_relative_to_labware(
        &self,
        labware_id: &str,
        matrix: Transform,
    ) -> Result<Location, BuilderError> {
        self.find_labware_by_id(labware_id)?;
        Ok(Location::relative_to_labware(labware_id, matrix))
    }

    pub fn location_at_labware_holder(
        &self,
        robot_id: &str,
        holder_name: &str,
    ) -> Result<Location, BuilderError> {
        self.find_robot_by_id(robot_id)?;
        Ok(Location::labware_holder(robot_id, holder_name))
    }

    /// 机器人上的具名 holder（如 `"DeckSlot_1"`）
    pub fn labware_holder_name(
        &self,
        robot_id: &str,
        name: &str,
    ) -> Result<LabwareHolder, BuilderError> {
        self.find_robot_by_id(robot_id)?;
        Ok(LabwareHolder::name(robot_id, name))
    }

    /// 以耗材为 holder（叠放）
    pub fn labware_id_holder(&self, labware_id: &str) -> Result<LabwareHolder, BuilderError> {
        self.find_labware_by_id(labware_id)?;
        Ok(LabwareHolder::labware(labware_id))
    }

    // ==================== 工具与枪头 ====================

    pub fn retrieve_tool(&mut self, robot_id: &str, tool_id: &str) -> Result<(), BuilderError> {
        self.add_command(RetrieveTool {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            id: tool_id.to_string(),
        })
    }

    pub fn return_tool(&mut self, robot_id: &str) -> Result<(), BuilderError> {
        self.add_command(ReturnTool {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
        })
    }

    /// `tool_id` 为 `None` 时只放回当前工具
    pub fn swap_to_tool(
        &mut self,
        robot_id: &str,
        tool_id: Option<&str>,
    ) -> Result<(), BuilderError> {
        self.add_command(SwapToTool {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            id: tool_id.map(str::to_string),
        })
    }

    pub fn retrieve_pipette_tip_group(
        &mut self,
        robot_id: &str,
        group_id: &str,
    ) -> Result<(), BuilderError> {
        self.add_command(RetrievePipetteTipGroup {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            id: group_id.to_string(),
        })
    }

    pub fn return_pipette_tip_group(&mut self, robot_id: &str) -> Result<(), BuilderError> {
        self.add_command(ReturnPipetteTipGroup {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
        })
    }

    pub fn discard_pipette_tip_group(&mut self, robot_id: &str) -> Result<(), BuilderError> {
        self.add_command(DiscardPipetteTipGroup {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
        })
    }

    // ==================== 液体与运动 ====================

    pub fn aspirate(
        &mut self,
        robot_id: &str,
        volume: ValueWithUnits,
        speed: ValueWithUnits,
    ) -> Result<(), BuilderError> {
        self.add_command(Aspirate {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            volume,
            speed,
        })
    }

    pub fn dispense(
        &mut self,
        robot_id: &str,
        volume: ValueWithUnits,
        speed: ValueWithUnits,
    ) -> Result<(), BuilderError> {
        self.add_command(Dispense {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            volume,
            speed,
        })
    }

    /// 不带偏移和路径提示的 `MOVE_TO_LOCATION`，完整形式用 [`add_command`](Self::add_command)
    pub fn move_to_location(&mut self, robot_id: &str, location: Location) -> Result<(), BuilderError> {
        self.add_command(MoveToLocation {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            location,
            location_offset: Transform::IDENTITY,
            flange: None,
            flange_offset: Transform::IDENTITY,
            path_type: None,
            trajectory_type: None,
        })
    }

    pub fn move_to_joint_pose(
        &mut self,
        robot_id: &str,
        joint_positions: Vec<ValueWithUnits>,
        relative: bool,
    ) -> Result<(), BuilderError> {
        self.add_command(MoveToJointPose {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            joint_positions,
            relative,
        })
    }

    pub fn move_gripper(
        &mut self,
        robot_id: &str,
        gripper_state_type: GripperStateType,
        finger_separation: Option<ValueWithUnits>,
    ) -> Result<(), BuilderError> {
        self.add_command(MoveGripper {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            gripper_state_type,
            finger_separation,
        })
    }

    pub fn pick_up_labware(
        &mut self,
        robot_id: &str,
        labware_id: &str,
        grasp_type: GraspType,
    ) -> Result<(), BuilderError> {
        self.add_command(PickUpLabware {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            labware_id: labware_id.to_string(),
            grasp_type,
            offset_transform: Transform::IDENTITY,
        })
    }

    pub fn put_down_labware(
        &mut self,
        robot_id: &str,
        holder: LabwareHolder,
    ) -> Result<(), BuilderError> {
        self.add_command(PutDownLabware {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            holder,
            offset_transform: Transform::IDENTITY,
        })
    }

    // ==================== 流程控制 ====================

    pub fn wait(&mut self, robot_id: &str, duration: ValueWithUnits) -> Result<(), BuilderError> {
        self.add_command(Wait {
            schema_version: SchemaVersion,
            robot_id: robot_id.to_string(),
            duration,
        })
    }

    pub fn pause(&mut self) -> Result<(), BuilderError> {
        self.add_command(Pause::default())
    }

    pub fn comment(&mut self, text: impl Into<String>) -> Result<(), BuilderError> {
        self.add_command(Comment {
            schema_version: SchemaVersion,
            text: text.into(),
        })
    }

    pub fn send_webhook(
        &mut self,
        url: impl Into<String>,
        payload: Option<String>,
        pause_execution: bool,
        ignore_external_error: bool,
    ) -> Result<(), BuilderError> {
        self.add_command(SendWebhook {
            schema_version: SchemaVersion,
            pause_execution,
            ignore_external_error,
            url: url.into(),
            payload,
        })
    }
}

/// `ADD_LABWARE` 中 `lid_id` 对应盖子的 descriptor
fn lid_of(descriptor: &LabwareDescriptor) -> LidDescriptor {
    match descriptor {
        LabwareDescriptor::WellPlate(plate) => plate.lid.clone().unwrap_or_default(),
        _ => LidDescriptor::default(),
    }
}
