//! TCode 客户端
//!
//! - [`ScriptBuilder`]：编写脚本，在本地拦截重复绑定与悬空引用
//! - [`TCodeServicerClient`]：调度脚本、驱动运行循环、处理取消与示教模式
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use tcode_client::{RunOptions, ScriptBuilder, TCodeServicerClient};
//! use tcode_protocol::RobotDescriptor;
//! use tcode_servicer::HttpServicer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = ScriptBuilder::new("hello", None);
//! builder.add_robot("r0", RobotDescriptor::default())?;
//! builder.comment("ready")?;
//!
//! let servicer = HttpServicer::new("http://localhost:8002")?;
//! let mut client = TCodeServicerClient::new(servicer);
//! let outcome = client.run_script(builder.script(), &RunOptions::default())?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod builder;
mod error;
pub mod runner;
pub mod teach;

pub use builder::ScriptBuilder;
pub use error::{BuilderError, ClientError};
pub use runner::{
    CancelToken, DEFAULT_BATCH_SIZE, DEFAULT_POLL_INTERVAL, RunOptions, RunOutcome, ScheduleMode,
    TCodeServicerClient,
};
pub use teach::{KeyEvent, KeySource, ScriptedKeys, TeachConfig};
