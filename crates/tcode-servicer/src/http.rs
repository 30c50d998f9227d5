//! 基于 `reqwest::blocking` 的 servicer 客户端

use crate::api::{
    ClearScheduleResponse, EnterTeachModeRequest, EnterTeachModeResponse, ExitTeachModeRequest,
    ExitTeachModeResponse, GetStatusResponse, ScheduleCommandRequest, ScheduleCommandResponse,
};
use crate::endpoint::{Endpoint, Method};
use crate::error::ServicerError;
use crate::servicer::ServicerApi;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tcode_protocol::TCode;
use tracing::{debug, trace};

/// 默认 servicer 地址
pub const DEFAULT_SERVICER_URL: &str = "http://localhost:8002";

/// 单次请求超时（发现机器人可能较慢，略长于常规值）
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// 校验 servicer URL
///
/// 只接受 `http://` 或 `https://` 开头的地址；返回去掉末尾 `/` 的 URL。
pub fn validate_servicer_url(url: &str) -> Result<String, ServicerError> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ServicerError::InvalidUrl(url.to_string()));
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// HTTP servicer 客户端
///
/// # Example
///
/// ```no_run
/// use tcode_servicer::{HttpServicer, ServicerApi};
///
/// let mut servicer = HttpServicer::new("http://localhost:8002").unwrap();
/// let status = servicer.get_status().unwrap();
/// println!("pending operations: {}", status.operation_count);
/// ```
#[derive(Debug, Clone)]
pub struct HttpServicer {
    base_url: String,
    client: Client,
}

impl HttpServicer {
    /// 使用默认超时创建
    pub fn new(url: &str) -> Result<Self, ServicerError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, ServicerError> {
        let base_url = validate_servicer_url(url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint.path());
        match endpoint.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        }
    }

    /// 发送请求，检查状态码，返回响应体文本
    fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<String, ServicerError> {
        debug!(%endpoint, "Sending servicer request");
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            debug!(%endpoint, status = status.as_u16(), body = %body, "Servicer request failed");
            return Err(ServicerError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        trace!(%endpoint, body = %body, "Servicer response");
        Ok(body)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T, ServicerError> {
        let body = self.send(endpoint, request)?;
        serde_json::from_str(&body).map_err(|source| ServicerError::Decode { endpoint, source })
    }

    fn send_empty(&self, endpoint: Endpoint) -> Result<(), ServicerError> {
        self.send(endpoint, self.request(endpoint)).map(|_| ())
    }
}

impl ServicerApi for HttpServicer {
    fn clear_schedule(&mut self) -> Result<ClearScheduleResponse, ServicerError> {
        let endpoint = Endpoint::ClearSchedule;
        let body = self.send(endpoint, self.request(endpoint))?;
        // 旧版 servicer 返回空响应体
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(ClearScheduleResponse::default());
        }
        serde_json::from_str(&body).map_err(|source| ServicerError::Decode { endpoint, source })
    }

    fn clear_tcode_resolution(&mut self) -> Result<(), ServicerError> {
        self.send_empty(Endpoint::ClearTCodeResolution)
    }

    fn clear_labware(&mut self) -> Result<(), ServicerError> {
        self.send_empty(Endpoint::ClearLabware)
    }

    fn discover_fleet(&mut self) -> Result<(), ServicerError> {
        self.send_empty(Endpoint::DiscoverFleet)
    }

    fn get_status(&mut self) -> Result<GetStatusResponse, ServicerError> {
        let endpoint = Endpoint::GetStatus;
        self.send_json(endpoint, self.request(endpoint))
    }

    fn schedule_command(
        &mut self,
        request: &ScheduleCommandRequest,
    ) -> Result<ScheduleCommandResponse, ServicerError> {
        let endpoint = Endpoint::ScheduleCommand;
        debug!(
            command_id = %request.command_id,
            command = request.command.type_name(),
            "Scheduling command"
        );
        self.send_json(endpoint, self.request(endpoint).json(request))
    }

    fn schedule_commands(
        &mut self,
        commands: &[(String, TCode)],
    ) -> Result<Vec<ScheduleCommandResponse>, ServicerError> {
        let endpoint = Endpoint::ScheduleCommands;
        debug!(count = commands.len(), "Scheduling command batch");
        self.send_json(endpoint, self.request(endpoint).json(commands))
    }

    fn set_run_state(&mut self, state: bool) -> Result<(), ServicerError> {
        let endpoint = Endpoint::SetRunState;
        let request = self.request(endpoint).query(&[("state", state)]);
        self.send(endpoint, request).map(|_| ())
    }

    fn enter_teach_mode(
        &mut self,
        request: &EnterTeachModeRequest,
    ) -> Result<EnterTeachModeResponse, ServicerError> {
        let endpoint = Endpoint::EnterTeachMode;
        self.send_json(endpoint, self.request(endpoint).json(request))
    }

    fn exit_teach_mode(
        &mut self,
        request: &ExitTeachModeRequest,
    ) -> Result<ExitTeachModeResponse, ServicerError> {
        let endpoint = Endpoint::ExitTeachMode;
        self.send_json(endpoint, self.request(endpoint).json(request))
    }

    fn dump_tf_tree(&mut self) -> Result<(), ServicerError> {
        self.send_empty(Endpoint::DumpTfTree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_servicer_url() {
        assert_eq!(
            validate_servicer_url("http://localhost:8002/").unwrap(),
            "http://localhost:8002"
        );
        assert_eq!(
            validate_servicer_url("https://fleet.lab.internal").unwrap(),
            "https://fleet.lab.internal"
        );
        assert!(matches!(
            validate_servicer_url("localhost:8002"),
            Err(ServicerError::InvalidUrl(_))
        ));
        assert!(validate_servicer_url("ftp://localhost").is_err());
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = HttpServicer::new("tcp://127.0.0.1:8002").unwrap_err();
        assert!(matches!(err, ServicerError::InvalidUrl(_)));
    }

    #[test]
    fn test_base_url_normalized() {
        let servicer = HttpServicer::new("http://127.0.0.1:8002/").unwrap();
        assert_eq!(servicer.base_url(), "http://127.0.0.1:8002");
    }
}
