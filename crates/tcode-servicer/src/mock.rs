//! 内存中的 servicer（`mock` feature）
//!
//! 记录每一次调用，并按预设队列返回状态与调度结果。队列耗尽后：
//! - `get_status` 返回 [`GetStatusResponse::idle`]
//! - 调度返回成功
//! - `exit_teach_mode` 返回预设位姿（默认单位矩阵）

use crate::api::{
    ClearScheduleResponse, EnterTeachModeRequest, EnterTeachModeResponse, ExitTeachModeRequest,
    ExitTeachModeResponse, GetStatusResponse, ScheduleCommandRequest, ScheduleCommandResponse,
    TCodeResult,
};
use crate::endpoint::Endpoint;
use crate::error::ServicerError;
use crate::servicer::ServicerApi;
use serde_json::Map;
use std::collections::{HashSet, VecDeque};
use tcode_protocol::{TCode, Transform};

/// 一次被记录的调用
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ClearSchedule,
    ClearTCodeResolution,
    ClearLabware,
    DiscoverFleet,
    GetStatus,
    ScheduleCommand { command_id: String, command: TCode },
    ScheduleCommands(Vec<(String, TCode)>),
    SetRunState(bool),
    EnterTeachMode { robot_id: String },
    ExitTeachMode { robot_id: String },
    DumpTfTree,
}

impl MockCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            MockCall::ClearSchedule => Endpoint::ClearSchedule,
            MockCall::ClearTCodeResolution => Endpoint::ClearTCodeResolution,
            MockCall::ClearLabware => Endpoint::ClearLabware,
            MockCall::DiscoverFleet => Endpoint::DiscoverFleet,
            MockCall::GetStatus => Endpoint::GetStatus,
            MockCall::ScheduleCommand { .. } => Endpoint::ScheduleCommand,
            MockCall::ScheduleCommands(_) => Endpoint::ScheduleCommands,
            MockCall::SetRunState(_) => Endpoint::SetRunState,
            MockCall::EnterTeachMode { .. } => Endpoint::EnterTeachMode,
            MockCall::ExitTeachMode { .. } => Endpoint::ExitTeachMode,
            MockCall::DumpTfTree => Endpoint::DumpTfTree,
        }
    }
}

/// 可编排的内存 servicer
#[derive(Debug, Default)]
pub struct MockServicer {
    calls: Vec<MockCall>,
    statuses: VecDeque<GetStatusResponse>,
    schedule_results: VecDeque<TCodeResult>,
    teach_results: VecDeque<TCodeResult>,
    teach_transform: Option<Transform>,
    failing: HashSet<Endpoint>,
}

impl MockServicer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条 `get_status` 响应
    pub fn push_status(&mut self, status: GetStatusResponse) -> &mut Self {
        self.statuses.push_back(status);
        self
    }

    /// 追加一条调度结果（单条与批量调度共用同一队列）
    pub fn push_schedule_result(&mut self, result: TCodeResult) -> &mut Self {
        self.schedule_results.push_back(result);
        self
    }

    /// 追加一条进入/退出示教模式的结果
    pub fn push_teach_result(&mut self, result: TCodeResult) -> &mut Self {
        self.teach_results.push_back(result);
        self
    }

    pub fn set_teach_transform(&mut self, transform: Transform) -> &mut Self {
        self.teach_transform = Some(transform);
        self
    }

    /// 让某个端点返回 HTTP 500
    pub fn fail_endpoint(&mut self, endpoint: Endpoint) -> &mut Self {
        self.failing.insert(endpoint);
        self
    }

    pub fn calls(&self) -> &[MockCall] {
        &self.calls
    }

    /// 调用过的端点，按调用顺序
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls.iter().map(MockCall::endpoint).collect()
    }

    /// 所有被调度的命令（单条与批量），按调度顺序
    pub fn scheduled_commands(&self) -> Vec<&TCode> {
        self.calls
            .iter()
            .flat_map(|call| match call {
                MockCall::ScheduleCommand { command, .. } => vec![command],
                MockCall::ScheduleCommands(batch) => batch.iter().map(|(_, c)| c).collect(),
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: MockCall) -> Result<(), ServicerError> {
        let endpoint = call.endpoint();
        self.calls.push(call);
        if self.failing.contains(&endpoint) {
            return Err(ServicerError::Status {
                endpoint,
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        Ok(())
    }

    fn next_schedule_response(&mut self) -> ScheduleCommandResponse {
        ScheduleCommandResponse {
            state: Map::new(),
            result: self
                .schedule_results
                .pop_front()
                .unwrap_or_else(TCodeResult::success),
        }
    }

    fn next_teach_result(&mut self) -> TCodeResult {
        self.teach_results
            .pop_front()
            .unwrap_or_else(TCodeResult::success)
    }
}

impl ServicerApi for MockServicer {
    fn clear_schedule(&mut self) -> Result<ClearScheduleResponse, ServicerError> {
        self.record(MockCall::ClearSchedule)?;
        Ok(ClearScheduleResponse::default())
    }

    fn clear_tcode_resolution(&mut self) -> Result<(), ServicerError> {
        self.record(MockCall::ClearTCodeResolution)
    }

    fn clear_labware(&mut self) -> Result<(), ServicerError> {
        self.record(MockCall::ClearLabware)
    }

    fn discover_fleet(&mut self) -> Result<(), ServicerError> {
        self.record(MockCall::DiscoverFleet)
    }

    fn get_status(&mut self) -> Result<GetStatusResponse, ServicerError> {
        self.record(MockCall::GetStatus)?;
        Ok(self
            .statuses
            .pop_front()
            .unwrap_or_else(GetStatusResponse::idle))
    }

    fn schedule_command(
        &mut self,
        request: &ScheduleCommandRequest,
    ) -> Result<ScheduleCommandResponse, ServicerError> {
        self.record(MockCall::ScheduleCommand {
            command_id: request.command_id.clone(),
            command: request.command.clone(),
        })?;
        Ok(self.next_schedule_response())
    }

    fn schedule_commands(
        &mut self,
        commands: &[(String, TCode)],
    ) -> Result<Vec<ScheduleCommandResponse>, ServicerError> {
        self.record(MockCall::ScheduleCommands(commands.to_vec()))?;
        Ok(commands
            .iter()
            .map(|_| self.next_schedule_response())
            .collect())
    }

    fn set_run_state(&mut self, state: bool) -> Result<(), ServicerError> {
        self.record(MockCall::SetRunState(state))
    }

    fn enter_teach_mode(
        &mut self,
        request: &EnterTeachModeRequest,
    ) -> Result<EnterTeachModeResponse, ServicerError> {
        self.record(MockCall::EnterTeachMode {
            robot_id: request.robot_id.clone(),
        })?;
        Ok(EnterTeachModeResponse {
            result: self.next_teach_result(),
        })
    }

    fn exit_teach_mode(
        &mut self,
        request: &ExitTeachModeRequest,
    ) -> Result<ExitTeachModeResponse, ServicerError> {
        self.record(MockCall::ExitTeachMode {
            robot_id: request.robot_id.clone(),
        })?;
        Ok(ExitTeachModeResponse {
            result: self.next_teach_result(),
            transform: self.teach_transform.unwrap_or_default(),
        })
    }

    fn dump_tf_tree(&mut self) -> Result<(), ServicerError> {
        self.record(MockCall::DumpTfTree)
    }
}
