//! # TCode Servicer
//!
//! TCode servicer 的传输层：
//! - `api`: 请求/响应结构与调度报告
//! - `endpoint`: HTTP 端点表
//! - [`ServicerApi`]: 每个端点一个方法的同步接口
//! - [`HttpServicer`]: 基于 `reqwest::blocking` 的实现（每个请求 15 秒超时）
//! - `mock`: 内存中的可编排 servicer（需要 `mock` feature）
//!
//! 大多数用户应该使用 `tcode-client` 提供的 `TCodeServicerClient`。

pub mod api;
pub mod endpoint;
mod error;
mod http;
#[cfg(feature = "mock")]
pub mod mock;
mod servicer;

pub use api::*;
pub use endpoint::{Endpoint, Method};
pub use error::ServicerError;
pub use http::{DEFAULT_SERVICER_URL, DEFAULT_TIMEOUT, HttpServicer, validate_servicer_url};
#[cfg(feature = "mock")]
pub use mock::{MockCall, MockServicer};
pub use servicer::ServicerApi;
