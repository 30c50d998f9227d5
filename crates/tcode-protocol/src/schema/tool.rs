//! 工具 schema（仅 Descriptor 形式）

use crate::units::ValueWithUnits;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GripperDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub serial_number: Option<String>,
}

/// 移液器（单通道与八通道共用）
///
/// - `min_volume`/`max_volume`：体积单位
/// - `max_speed`：体积/时间单位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipetteDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub serial_number: Option<String>,
    pub min_volume: Option<ValueWithUnits>,
    pub max_volume: Option<ValueWithUnits>,
    pub max_speed: Option<ValueWithUnits>,
}

/// 工具描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolDescriptor {
    Gripper(GripperDescriptor),
    Probe(ProbeDescriptor),
    SingleChannelPipette(PipetteDescriptor),
    EightChannelPipette(PipetteDescriptor),
}

impl ToolDescriptor {
    pub fn type_name(&self) -> &'static str {
        match self {
            ToolDescriptor::Gripper(_) => "Gripper",
            ToolDescriptor::Probe(_) => "Probe",
            ToolDescriptor::SingleChannelPipette(_) => "SingleChannelPipette",
            ToolDescriptor::EightChannelPipette(_) => "EightChannelPipette",
        }
    }

    pub fn serial_number(&self) -> Option<&str> {
        match self {
            ToolDescriptor::Gripper(t) => t.serial_number.as_deref(),
            ToolDescriptor::Probe(t) => t.serial_number.as_deref(),
            ToolDescriptor::SingleChannelPipette(t) | ToolDescriptor::EightChannelPipette(t) => {
                t.serial_number.as_deref()
            },
        }
    }

    pub fn is_pipette(&self) -> bool {
        matches!(
            self,
            ToolDescriptor::SingleChannelPipette(_) | ToolDescriptor::EightChannelPipette(_)
        )
    }

    pub fn gripper() -> Self {
        ToolDescriptor::Gripper(GripperDescriptor::default())
    }

    pub fn probe() -> Self {
        ToolDescriptor::Probe(ProbeDescriptor::default())
    }

    pub fn single_channel_pipette() -> Self {
        ToolDescriptor::SingleChannelPipette(PipetteDescriptor::default())
    }

    pub fn eight_channel_pipette() -> Self {
        ToolDescriptor::EightChannelPipette(PipetteDescriptor::default())
    }
}
