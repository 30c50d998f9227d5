//! servicer 访问抽象

use crate::api::{
    ClearScheduleResponse, EnterTeachModeRequest, EnterTeachModeResponse, ExitTeachModeRequest,
    ExitTeachModeResponse, GetStatusResponse, ScheduleCommandRequest, ScheduleCommandResponse,
};
use crate::error::ServicerError;
use tcode_protocol::TCode;

/// servicer 的一次请求对应一个方法
///
/// 所有调用都是同步阻塞的，同一时刻只有一个请求在途。
/// 实现：[`HttpServicer`](crate::HttpServicer)（真实 HTTP）与 `MockServicer`（`mock` feature）。
pub trait ServicerApi {
    /// 清除已调度但尚未执行的命令
    fn clear_schedule(&mut self) -> Result<ClearScheduleResponse, ServicerError>;

    /// 清除所有符号 ID 绑定
    fn clear_tcode_resolution(&mut self) -> Result<(), ServicerError>;

    /// 清除台面上的耗材与枪头状态
    fn clear_labware(&mut self) -> Result<(), ServicerError>;

    /// 重新扫描 fleet
    fn discover_fleet(&mut self) -> Result<(), ServicerError>;

    fn get_status(&mut self) -> Result<GetStatusResponse, ServicerError>;

    fn schedule_command(
        &mut self,
        request: &ScheduleCommandRequest,
    ) -> Result<ScheduleCommandResponse, ServicerError>;

    /// 批量调度；响应与请求一一对应、顺序一致
    fn schedule_commands(
        &mut self,
        commands: &[(String, TCode)],
    ) -> Result<Vec<ScheduleCommandResponse>, ServicerError>;

    /// `true` 开始/恢复执行，`false` 暂停
    fn set_run_state(&mut self, state: bool) -> Result<(), ServicerError>;

    fn enter_teach_mode(
        &mut self,
        request: &EnterTeachModeRequest,
    ) -> Result<EnterTeachModeResponse, ServicerError>;

    fn exit_teach_mode(
        &mut self,
        request: &ExitTeachModeRequest,
    ) -> Result<ExitTeachModeResponse, ServicerError>;

    /// 让 servicer 输出坐标变换树（调试用）
    fn dump_tf_tree(&mut self) -> Result<(), ServicerError>;
}

impl<T: ServicerApi + ?Sized> ServicerApi for &mut T {
    fn clear_schedule(&mut self) -> Result<ClearScheduleResponse, ServicerError> {
        (**self).clear_schedule()
    }

    fn clear_tcode_resolution(&mut self) -> Result<(), ServicerError> {
        (**self).clear_tcode_resolution()
    }

    fn clear_labware(&mut self) -> Result<(), ServicerError> {
        (**self).clear_labware()
    }

    fn discover_fleet(&mut self) -> Result<(), ServicerError> {
        (**self).discover_fleet()
    }

    fn get_status(&mut self) -> Result<GetStatusResponse, ServicerError> {
        (**self).get_status()
    }

    fn schedule_command(
        &mut self,
        request: &ScheduleCommandRequest,
    ) -> Result<ScheduleCommandResponse, ServicerError> {
        (**self).schedule_command(request)
    }

    fn schedule_commands(
        &mut self,
        commands: &[(String, TCode)],
    ) -> Result<Vec<ScheduleCommandResponse>, ServicerError> {
        (**self).schedule_commands(commands)
    }

    fn set_run_state(&mut self, state: bool) -> Result<(), ServicerError> {
        (**self).set_run_state(state)
    }

    fn enter_teach_mode(
        &mut self,
        request: &EnterTeachModeRequest,
    ) -> Result<EnterTeachModeResponse, ServicerError> {
        (**self).enter_teach_mode(request)
    }

    fn exit_teach_mode(
        &mut self,
        request: &ExitTeachModeRequest,
    ) -> Result<ExitTeachModeResponse, ServicerError> {
        (**self).exit_teach_mode(request)
    }

    fn dump_tf_tree(&mut self) -> Result<(), ServicerError> {
        (**self).dump_tf_tree()
    }
}
