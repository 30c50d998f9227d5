//! 工具与枪头生命周期命令
//!
//! 每台机器人的占用状态：`空 → 已装工具 → 已装工具+枪头`。
//! 非法转换（如未装枪头就吸液）由 servicer 拒绝，本地不做检查。

use crate::location::Location;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

/// 从工具架取工具：空 → 已装工具
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveTool {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub id: String,
}

/// 把当前工具放回工具架
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTool {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
}

/// 等价于 `RETURN_TOOL`（若持有工具）+ `RETRIEVE_TOOL`
///
/// `id` 为 `None` 时只放回当前工具。目标工具已在手上时 servicer 返回 `unnecessary`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapToTool {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// 拾取已绑定的枪头组：已装工具 → 已装工具+枪头（仅移液器）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievePipetteTipGroup {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub id: String,
}

/// 把枪头放回原来的位置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPipetteTipGroup {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
}

/// 把枪头丢进任一可达的废枪头槽
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardPipetteTipGroup {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
}

/// 在指定位置拾取枪头（不经过枪头组绑定）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickUpPipetteTip {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutDownPipetteTip {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub robot_id: String,
    pub location: Location,
}
