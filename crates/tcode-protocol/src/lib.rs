//! # TCode Protocol
//!
//! TCode 命令协议定义（无网络依赖）
//!
//! ## 模块
//!
//! - `units`: 带单位数值与量纲检查
//! - `transform`: 4x4 齐次变换
//! - `location`: 位置与 holder 的标签联合体
//! - `schema`: 机器人、工具、耗材的 description/descriptor
//! - `migration`: schema 版本迁移
//! - `commands`: 30 条 TCode 命令
//! - `codes`: 验证器/解析器/执行器/调度器结果码
//! - `script`: 脚本文件读写
//!
//! ## JSON 约定
//!
//! 每个对象带 `"type"` 判别字段和 `"schema_version"` 整数字段。
//! `"type"` 用于在标签联合体中选择变体；独立对象序列化时也会写出。

pub mod codes;
pub mod commands;
pub mod enums;
pub mod error;
pub mod ids;
pub mod location;
pub mod migration;
pub mod schema;
pub mod script;
pub mod transform;
pub mod units;
pub mod version;

// 重新导出常用类型
pub use codes::*;
pub use commands::*;
pub use enums::*;
pub use error::ProtocolError;
pub use ids::generate_id;
pub use location::*;
pub use migration::{MigrationError, MigrationRegistry, default_registry};
pub use schema::*;
pub use script::{Metadata, TCodeScript};
pub use transform::{Transform, create_transform};
pub use units::{Dimension, Unit, UnitsError, ValueWithUnits};
pub use version::{SchemaVersion, TCODE_API_VERSION, check_api_version};
