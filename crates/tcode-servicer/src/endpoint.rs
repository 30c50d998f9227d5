//! servicer HTTP 端点表

use std::fmt;

/// HTTP 方法（仅 servicer 用到的几种）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// servicer 端点
///
/// | 端点 | 方法与路径 |
/// |---|---|
/// | `ClearSchedule` | `DELETE /schedule` |
/// | `ClearTCodeResolution` | `DELETE /tcode_resolution` |
/// | `ClearLabware` | `DELETE /deck` |
/// | `DiscoverFleet` | `GET /discover_fleet` |
/// | `GetStatus` | `GET /status` |
/// | `ScheduleCommand` | `POST /schedule_command` |
/// | `ScheduleCommands` | `PUT /schedule_commands` |
/// | `SetRunState` | `PUT /run_state?state=bool` |
/// | `EnterTeachMode` | `POST /enter_teach_mode` |
/// | `ExitTeachMode` | `POST /exit_teach_mode` |
/// | `DumpTfTree` | `POST /dump_tf_tree` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ClearSchedule,
    ClearTCodeResolution,
    ClearLabware,
    DiscoverFleet,
    GetStatus,
    ScheduleCommand,
    ScheduleCommands,
    SetRunState,
    EnterTeachMode,
    ExitTeachMode,
    DumpTfTree,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ClearSchedule | Endpoint::ClearTCodeResolution | Endpoint::ClearLabware => {
                Method::Delete
            },
            Endpoint::DiscoverFleet | Endpoint::GetStatus => Method::Get,
            Endpoint::ScheduleCommand
            | Endpoint::EnterTeachMode
            | Endpoint::ExitTeachMode
            | Endpoint::DumpTfTree => Method::Post,
            Endpoint::ScheduleCommands | Endpoint::SetRunState => Method::Put,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ClearSchedule => "/schedule",
            Endpoint::ClearTCodeResolution => "/tcode_resolution",
            Endpoint::ClearLabware => "/deck",
            Endpoint::DiscoverFleet => "/discover_fleet",
            Endpoint::GetStatus => "/status",
            Endpoint::ScheduleCommand => "/schedule_command",
            Endpoint::ScheduleCommands => "/schedule_commands",
            Endpoint::SetRunState => "/run_state",
            Endpoint::EnterTeachMode => "/enter_teach_mode",
            Endpoint::ExitTeachMode => "/exit_teach_mode",
            Endpoint::DumpTfTree => "/dump_tf_tree",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method().as_str(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::ClearLabware.to_string(), "DELETE /deck");
        assert_eq!(Endpoint::ScheduleCommands.to_string(), "PUT /schedule_commands");
        assert_eq!(Endpoint::DumpTfTree.to_string(), "POST /dump_tf_tree");
    }
}
