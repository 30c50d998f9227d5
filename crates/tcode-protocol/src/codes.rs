//! servicer 返回的结果码
//!
//! servicer 的每个 `TCodeResult` 都带一个字符串 `code`，来源于四个子系统之一：
//! 校验器（validator）、调度器（scheduler）、解析器（resolver）、执行器（executor）。
//! [`ResultCode::parse`] 把字符串归类到对应的枚举。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 校验器错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorErrorCode {
    EmptyDeckSlotNotFound,
    EmptyPipetteTipGroup,
    EmptyToolHolderNotFound,
    IdExists,
    IdNotFound,
    InternalError,
    JointCountMismatch,
    LidNotFound,
    TransformSizeLimitExceeded,
    NoLidSupport,
    NotImplemented,
    PipetteTipGroupDiscarded,
    PipetteTipGroupNotFound,
    PipetteTipNotMounted,
    PipetteVolumeLimitExceeded,
    ToolNotMounted,
    TrashNotFound,
    UnexpectedLabware,
    UnexpectedLabwareType,
    UnexpectedLid,
    UnexpectedPipetteTip,
    UnexpectedPipetteTipGroup,
    UnexpectedTool,
    UnitsError,
    Unnecessary,
    WrongToolMounted,
}

impl ValidatorErrorCode {
    pub const ALL: [Self; 26] = [
        Self::EmptyDeckSlotNotFound,
        Self::EmptyPipetteTipGroup,
        Self::EmptyToolHolderNotFound,
        Self::IdExists,
        Self::IdNotFound,
        Self::InternalError,
        Self::JointCountMismatch,
        Self::LidNotFound,
        Self::TransformSizeLimitExceeded,
        Self::NoLidSupport,
        Self::NotImplemented,
        Self::PipetteTipGroupDiscarded,
        Self::PipetteTipGroupNotFound,
        Self::PipetteTipNotMounted,
        Self::PipetteVolumeLimitExceeded,
        Self::ToolNotMounted,
        Self::TrashNotFound,
        Self::UnexpectedLabware,
        Self::UnexpectedLabwareType,
        Self::UnexpectedLid,
        Self::UnexpectedPipetteTip,
        Self::UnexpectedPipetteTipGroup,
        Self::UnexpectedTool,
        Self::UnitsError,
        Self::Unnecessary,
        Self::WrongToolMounted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyDeckSlotNotFound => "empty_deck_slot_not_found",
            Self::EmptyPipetteTipGroup => "empty_pipette_tip_group",
            Self::EmptyToolHolderNotFound => "empty_tool_holder_not_found",
            Self::IdExists => "id_exists",
            Self::IdNotFound => "id_not_found",
            Self::InternalError => "internal_error",
            Self::JointCountMismatch => "joint_count_mismatch",
            Self::LidNotFound => "lid_not_found",
            Self::TransformSizeLimitExceeded => "transform_size_limit_exceeded",
            Self::NoLidSupport => "no_lid_support",
            Self::NotImplemented => "not_implemented",
            Self::PipetteTipGroupDiscarded => "pipette_tip_group_discarded",
            Self::PipetteTipGroupNotFound => "pipette_tip_group_not_found",
            Self::PipetteTipNotMounted => "pipette_tip_not_mounted",
            Self::PipetteVolumeLimitExceeded => "pipette_volume_limit_exceeded",
            Self::ToolNotMounted => "tool_not_mounted",
            Self::TrashNotFound => "trash_not_found",
            Self::UnexpectedLabware => "unexpected_labware",
            Self::UnexpectedLabwareType => "unexpected_labware_type",
            Self::UnexpectedLid => "unexpected_lid",
            Self::UnexpectedPipetteTip => "unexpected_pipette_tip",
            Self::UnexpectedPipetteTipGroup => "unexpected_pipette_tip_group",
            Self::UnexpectedTool => "unexpected_tool",
            Self::UnitsError => "units_error",
            Self::Unnecessary => "unnecessary",
            Self::WrongToolMounted => "wrong_tool_mounted",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

/// 调度器结果码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerCode {
    Success,
    NotImplemented,
}

impl SchedulerCode {
    pub const ALL: [Self; 2] = [Self::Success, Self::NotImplemented];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotImplemented => "not_implemented",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

/// 解析器（symbolic ID → 实体）结果码
///
/// 注意部分线路值与变体名不一致（如 `no_unresolved_entites`），以线路值为准。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolverCode {
    #[serde(rename = "id_exists")]
    IdExists,
    #[serde(rename = "holder_not_found")]
    HolderNotFound,
    #[serde(rename = "multiple_entities")]
    MultipleMatchingEntities,
    #[serde(rename = "no_discovered_entities")]
    NoDiscoveredEntities,
    #[serde(rename = "no_matching_entities")]
    NoMatchingEntities,
    #[serde(rename = "no_unresolved_entites")]
    NoUnresolvedEntities,
    #[serde(rename = "not_implemented")]
    NotImplemented,
    #[serde(rename = "deck_slot_not_empty")]
    DeckSlotNotEmpty,
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "internal_error")]
    InternalError,
    #[serde(rename = "labware_holder_occupied")]
    LabwareHolderNotEmpty,
    #[serde(rename = "labware_holder_empty")]
    LabwareHolderEmpty,
    #[serde(rename = "plate_not_stackable")]
    PlateNotStackable,
}

impl ResolverCode {
    pub const ALL: [Self; 13] = [
        Self::IdExists,
        Self::HolderNotFound,
        Self::MultipleMatchingEntities,
        Self::NoDiscoveredEntities,
        Self::NoMatchingEntities,
        Self::NoUnresolvedEntities,
        Self::NotImplemented,
        Self::DeckSlotNotEmpty,
        Self::Success,
        Self::InternalError,
        Self::LabwareHolderNotEmpty,
        Self::LabwareHolderEmpty,
        Self::PlateNotStackable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdExists => "id_exists",
            Self::HolderNotFound => "holder_not_found",
            Self::MultipleMatchingEntities => "multiple_entities",
            Self::NoDiscoveredEntities => "no_discovered_entities",
            Self::NoMatchingEntities => "no_matching_entities",
            Self::NoUnresolvedEntities => "no_unresolved_entites",
            Self::NotImplemented => "not_implemented",
            Self::DeckSlotNotEmpty => "deck_slot_not_empty",
            Self::Success => "success",
            Self::InternalError => "internal_error",
            Self::LabwareHolderNotEmpty => "labware_holder_occupied",
            Self::LabwareHolderEmpty => "labware_holder_empty",
            Self::PlateNotStackable => "plate_not_stackable",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

/// 执行器结果码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionCode {
    Success,
    PipetteTipDropoffFailure,
    RobotBootStateFailure,
    RobotEstopped,
    InternalError,
}

impl ExecutionCode {
    pub const ALL: [Self; 5] = [
        Self::Success,
        Self::PipetteTipDropoffFailure,
        Self::RobotBootStateFailure,
        Self::RobotEstopped,
        Self::InternalError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PipetteTipDropoffFailure => "pipette_tip_dropoff_failure",
            Self::RobotBootStateFailure => "robot_boot_state_failure",
            Self::RobotEstopped => "robot_estopped",
            Self::InternalError => "internal_error",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

/// 归类后的结果码
///
/// 多个子系统共用的码（如 `internal_error`、`id_exists`）按
/// 校验器 → 解析器 → 执行器 → 调度器 的顺序归类到第一个匹配的子系统。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,
    Validator(ValidatorErrorCode),
    Resolver(ResolverCode),
    Execution(ExecutionCode),
    Scheduler(SchedulerCode),
    Unknown(String),
}

impl ResultCode {
    pub fn parse(code: &str) -> Self {
        if code == "success" {
            return ResultCode::Success;
        }
        if let Some(c) = ValidatorErrorCode::parse(code) {
            return ResultCode::Validator(c);
        }
        if let Some(c) = ResolverCode::parse(code) {
            return ResultCode::Resolver(c);
        }
        if let Some(c) = ExecutionCode::parse(code) {
            return ResultCode::Execution(c);
        }
        if let Some(c) = SchedulerCode::parse(code) {
            return ResultCode::Scheduler(c);
        }
        ResultCode::Unknown(code.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResultCode::Success => "success",
            ResultCode::Validator(c) => c.as_str(),
            ResultCode::Resolver(c) => c.as_str(),
            ResultCode::Execution(c) => c.as_str(),
            ResultCode::Scheduler(c) => c.as_str(),
            ResultCode::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
