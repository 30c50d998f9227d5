//! 脚本调度与执行
//!
//! 一次运行的状态：`idle → scheduling → running → {completed | failed | cancelled}`。
//!
//! - **重置**：清空调度队列、台面耗材、ID 绑定，并重新发现 fleet
//! - **调度**：逐条（每条一次往返）或分批（每批一次往返）；遇到失败结果立即停止
//! - **运行**：`set_run_state(true)` 后按固定间隔轮询 `get_status`
//!
//! 客户端是单线程同步的，同一时刻只有一个请求在途。运行循环本身没有超时，
//! 依靠 [`CancelToken`] 终止。

use crate::error::ClientError;
use chrono::{Local, SecondsFormat};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tcode_protocol::{TCode, TCodeScript, generate_id};
use tcode_servicer::{
    GetStatusResponse, ScheduleCommandRequest, ServicerApi, TCodeCommandSchedulingReport,
    TCodeResult, TCodeSchedulingReport,
};
use tracing::{debug, info, warn};

/// 默认每批命令数
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 默认状态轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 取消标记
///
/// 可克隆到信号处理函数中；处理函数只置位，清理由运行循环完成。
/// 一次取消只作用于一次运行：清理完成后标记自动清除。
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// 清除取消标记，以便下一次运行
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 调度方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// 每条命令一次请求，立即得到结果
    Serial,
    /// 每批最多 n 条命令一次请求；已被接受的批次不会回滚
    Batched(usize),
}

impl Default for ScheduleMode {
    fn default() -> Self {
        ScheduleMode::Batched(DEFAULT_BATCH_SIZE)
    }
}

/// [`TCodeServicerClient::run_script`] 的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// 运行前重置 servicer 状态
    pub clean_environment: bool,
    pub schedule_mode: ScheduleMode,
    /// 调度失败后继续调度剩余命令
    pub continue_on_error: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            clean_environment: true,
            schedule_mode: ScheduleMode::default(),
            continue_on_error: false,
        }
    }
}

/// 运行结果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// 所有命令执行完毕
    Completed,
    /// servicer 报告失败，fleet 已暂停
    Failed(TCodeResult),
    /// 本地取消，fleet 已暂停且绑定已清除
    Cancelled,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// servicer 客户端
pub struct TCodeServicerClient<S: ServicerApi> {
    servicer: S,
    poll_interval: Duration,
    cancel: CancelToken,
}

impl<S: ServicerApi> TCodeServicerClient<S> {
    pub fn new(servicer: S) -> Self {
        Self {
            servicer,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// 使用外部创建的取消标记
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn servicer(&self) -> &S {
        &self.servicer
    }

    pub fn servicer_mut(&mut self) -> &mut S {
        &mut self.servicer
    }

    pub fn into_inner(self) -> S {
        self.servicer
    }

    // ==================== 环境 ====================

    /// 清空调度队列、台面耗材与 ID 绑定，并重新发现 fleet
    pub fn reset_environment(&mut self) -> Result<(), ClientError> {
        let cleared = self.servicer.clear_schedule()?;
        if !cleared.cleared_commands.is_empty() {
            info!(
                count = cleared.cleared_commands.len(),
                "Cleared unexecuted commands"
            );
        }
        self.servicer.clear_labware()?;
        self.servicer.clear_tcode_resolution()?;
        self.servicer.discover_fleet()?;
        debug!("Environment reset");
        Ok(())
    }

    pub fn get_status(&mut self) -> Result<GetStatusResponse, ClientError> {
        Ok(self.servicer.get_status()?)
    }

    pub fn dump_tf_tree(&mut self) -> Result<(), ClientError> {
        Ok(self.servicer.dump_tf_tree()?)
    }

    /// 开始或恢复执行
    pub fn start(&mut self) -> Result<(), ClientError> {
        Ok(self.servicer.set_run_state(true)?)
    }

    /// 暂停整个 fleet
    pub fn pause(&mut self) -> Result<(), ClientError> {
        Ok(self.servicer.set_run_state(false)?)
    }

    // ==================== 调度 ====================

    /// 调度单条命令，返回其调度记录
    pub fn schedule_command(
        &mut self,
        command: &TCode,
    ) -> Result<TCodeCommandSchedulingReport, ClientError> {
        let request = ScheduleCommandRequest {
            command_id: generate_id(),
            command: command.clone(),
        };
        let start = Instant::now();
        let response = self.servicer.schedule_command(&request)?;
        Ok(TCodeCommandSchedulingReport {
            command_id: request.command_id,
            command: request.command,
            result: response.result,
            duration: start.elapsed().as_secs_f64(),
        })
    }

    /// 调度整份脚本
    ///
    /// `continue_on_error` 为假时，第一条失败结果返回 [`ClientError::SchedulingFailed`]；
    /// 为真时继续调度，失败记录在报告中。两种调度方式得到相同顺序的结果。
    pub fn schedule_script(
        &mut self,
        script: &TCodeScript,
        mode: ScheduleMode,
        continue_on_error: bool,
    ) -> Result<TCodeSchedulingReport, ClientError> {
        let start_time = timestamp();
        let mut command_reports = Vec::with_capacity(script.commands.len());

        match mode {
            ScheduleMode::Serial => {
                for command in &script.commands {
                    let report = self.schedule_command(command)?;
                    debug!(
                        command_id = %report.command_id,
                        command = command.type_name(),
                        "Scheduled command"
                    );
                    command_reports.push(report);
                    check_last(&command_reports, continue_on_error)?;
                }
            },
            ScheduleMode::Batched(batch_size) => {
                for chunk in script.commands.chunks(batch_size.max(1)) {
                    let batch: Vec<(String, TCode)> = chunk
                        .iter()
                        .map(|command| (generate_id(), command.clone()))
                        .collect();

                    let start = Instant::now();
                    let responses = self.servicer.schedule_commands(&batch)?;
                    if responses.len() != batch.len() {
                        return Err(ClientError::BatchSizeMismatch {
                            sent: batch.len(),
                            received: responses.len(),
                        });
                    }
                    let duration = start.elapsed().as_secs_f64() / batch.len() as f64;
                    debug!(count = batch.len(), "Scheduled batch");

                    for ((command_id, command), response) in batch.into_iter().zip(responses) {
                        command_reports.push(TCodeCommandSchedulingReport {
                            command_id,
                            command,
                            result: response.result,
                            duration,
                        });
                        check_last(&command_reports, continue_on_error)?;
                    }
                }
            },
        }

        let report = TCodeSchedulingReport {
            command_reports,
            start_time,
            end_time: timestamp(),
        };
        info!(
            commands = report.command_reports.len(),
            failures = report.failures().count(),
            "Scheduling finished"
        );
        Ok(report)
    }

    // ==================== 运行 ====================

    /// 轮询直到命令执行完、失败或被取消
    ///
    /// - `operation_count == 0`：[`RunOutcome::Completed`]
    /// - `result.success == false`：暂停 fleet 后返回 [`RunOutcome::Failed`]
    /// - 取消标记置位：暂停 fleet、清除绑定与耗材后返回 [`RunOutcome::Cancelled`]
    /// - 查询状态出错：尽力暂停 fleet 后返回该错误
    pub fn execute_run_loop(&mut self) -> Result<RunOutcome, ClientError> {
        loop {
            if self.cancel.is_cancelled() {
                self.abandon_run();
                return Ok(RunOutcome::Cancelled);
            }

            let status = match self.servicer.get_status() {
                Ok(status) => status,
                Err(e) => {
                    warn!("Status poll failed, pausing fleet: {}", e);
                    if let Err(pause_err) = self.servicer.set_run_state(false) {
                        warn!("Failed to pause fleet: {}", pause_err);
                    }
                    return Err(e.into());
                },
            };
            if !status.result.success {
                warn!(
                    command_id = status.command_id.as_deref().unwrap_or("-"),
                    result = %status.result,
                    "Execution failed, pausing fleet"
                );
                self.servicer.set_run_state(false)?;
                return Ok(RunOutcome::Failed(status.result));
            }
            if status.operation_count == 0 {
                return Ok(RunOutcome::Completed);
            }

            thread::sleep(self.poll_interval);
        }
    }

    /// 重置（可选）→ 调度 → 开始 → 轮询
    pub fn run_script(
        &mut self,
        script: &TCodeScript,
        options: &RunOptions,
    ) -> Result<RunOutcome, ClientError> {
        info!(
            name = %script.metadata.name,
            commands = script.commands.len(),
            "Running script"
        );
        if options.clean_environment {
            self.reset_environment()?;
        }

        let report =
            self.schedule_script(script, options.schedule_mode, options.continue_on_error)?;
        for failure in report.failures() {
            warn!(
                command_id = %failure.command_id,
                command = failure.command.type_name(),
                result = %failure.result,
                "Command rejected during scheduling"
            );
        }

        if self.cancel.is_cancelled() {
            self.abandon_run();
            return Ok(RunOutcome::Cancelled);
        }
        self.start()?;

        let outcome = self.execute_run_loop()?;
        match &outcome {
            RunOutcome::Completed => info!("Script completed"),
            RunOutcome::Failed(result) => warn!(result = %result, "Script failed"),
            RunOutcome::Cancelled => warn!("Script cancelled"),
        }
        Ok(outcome)
    }

    /// 取消时的清理：尽力而为，失败只记录警告
    ///
    /// 清理后清除取消标记，同一个客户端可以继续下一次运行。
    fn abandon_run(&mut self) {
        if let Err(e) = self.servicer.set_run_state(false) {
            warn!("Failed to pause fleet: {}", e);
        }
        if let Err(e) = self.servicer.clear_tcode_resolution() {
            warn!("Failed to clear id bindings: {}", e);
        }
        if let Err(e) = self.servicer.clear_labware() {
            warn!("Failed to clear labware: {}", e);
        }
        self.cancel.reset();
    }
}

/// 最新一条记录失败且不继续时返回错误
fn check_last(
    reports: &[TCodeCommandSchedulingReport],
    continue_on_error: bool,
) -> Result<(), ClientError> {
    let index = reports.len().saturating_sub(1);
    match reports.last() {
        Some(report) if !report.result.success => {
            warn!(
                index,
                command_id = %report.command_id,
                result = %report.result,
                "Command rejected"
            );
            if continue_on_error {
                Ok(())
            } else {
                Err(ClientError::SchedulingFailed {
                    index,
                    command_id: report.command_id.clone(),
                    result: report.result.clone(),
                })
            }
        },
        _ => Ok(()),
    }
}

fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcode_protocol::{Comment, SchemaVersion};
    use tcode_servicer::{Endpoint, MockServicer};

    fn comment(text: &str) -> TCode {
        Comment {
            schema_version: SchemaVersion,
            text: text.into(),
        }
        .into()
    }

    fn script(n: usize) -> TCodeScript {
        let mut script = TCodeScript::new("test", None);
        script.commands = (0..n).map(|i| comment(&format!("c{}", i))).collect();
        script
    }

    fn client() -> TCodeServicerClient<MockServicer> {
        TCodeServicerClient::new(MockServicer::new()).with_poll_interval(Duration::from_millis(1))
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let handler = token.clone();
        assert!(!token.is_cancelled());
        handler.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!handler.is_cancelled());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ScheduleMode::default(), ScheduleMode::Batched(100));
        let options = RunOptions::default();
        assert!(options.clean_environment);
        assert!(!options.continue_on_error);
    }

    #[test]
    fn test_reset_environment_order() {
        let mut client = client();
        client.reset_environment().unwrap();
        assert_eq!(
            client.servicer().endpoints(),
            vec![
                Endpoint::ClearSchedule,
                Endpoint::ClearLabware,
                Endpoint::ClearTCodeResolution,
                Endpoint::DiscoverFleet,
            ]
        );
    }

    #[test]
    fn test_batches_split_by_size() {
        let mut client = client();
        let report = client
            .schedule_script(&script(5), ScheduleMode::Batched(2), false)
            .unwrap();

        assert_eq!(report.command_reports.len(), 5);
        assert!(report.all_succeeded());
        let batches = client
            .servicer()
            .endpoints()
            .into_iter()
            .filter(|e| *e == Endpoint::ScheduleCommands)
            .count();
        assert_eq!(batches, 3);
    }

    #[test]
    fn test_serial_fail_fast() {
        let mut client = client();
        client
            .servicer_mut()
            .push_schedule_result(TCodeResult::success())
            .push_schedule_result(TCodeResult::failure("id_not_found", "l9"));

        let err = client
            .schedule_script(&script(4), ScheduleMode::Serial, false)
            .unwrap_err();
        assert!(matches!(err, ClientError::SchedulingFailed { index: 1, .. }));
        // 失败后不再发送
        assert_eq!(client.servicer().scheduled_commands().len(), 2);
    }

    #[test]
    fn test_continue_on_error_records_failures() {
        let mut client = client();
        client
            .servicer_mut()
            .push_schedule_result(TCodeResult::failure("unnecessary", "already held"));

        let report = client
            .schedule_script(&script(3), ScheduleMode::Serial, true)
            .unwrap();
        assert_eq!(report.command_reports.len(), 3);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_command_ids_unique() {
        let mut client = client();
        let report = client
            .schedule_script(&script(10), ScheduleMode::Batched(3), false)
            .unwrap();
        let mut ids: Vec<_> = report.command_reports.iter().map(|r| &r.command_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_run_script_sequence() {
        let mut client = client();
        let outcome = client.run_script(&script(2), &RunOptions::default()).unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(
            client.servicer().endpoints(),
            vec![
                Endpoint::ClearSchedule,
                Endpoint::ClearLabware,
                Endpoint::ClearTCodeResolution,
                Endpoint::DiscoverFleet,
                Endpoint::ScheduleCommands,
                Endpoint::SetRunState,
                Endpoint::GetStatus,
            ]
        );
    }

    #[test]
    fn test_servicer_error_propagates() {
        let mut client = client();
        client.servicer_mut().fail_endpoint(Endpoint::DiscoverFleet);
        let err = client.reset_environment().unwrap_err();
        assert!(matches!(err, ClientError::Servicer(_)));
    }
}
