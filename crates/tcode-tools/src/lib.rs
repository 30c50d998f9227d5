//! # TCode Tools - 共享工具
//!
//! **依赖原则**: 只依赖 `tcode-protocol`，不访问网络
//!
//! ## 包含模块
//!
//! - `catalog` - 耗材目录（目录/内存实现）
//! - `describe` - 常用 descriptor 的构造函数
//! - `config` - 客户端配置（TOML）

pub mod catalog;
pub mod config;
pub mod describe;

// 重新导出常用类型
pub use catalog::{CatalogError, DirectoryCatalog, InMemoryCatalog, LabwareCatalog};
pub use config::{ClientConfig, ConfigError, TeachSettings};
pub use describe::{
    GridLayout, describe_pipette_tip_1x1, describe_pipette_tip_1x8, describe_pipette_tip_box,
    describe_pipette_tip_group, describe_well_plate,
};
