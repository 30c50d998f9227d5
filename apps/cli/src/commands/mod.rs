//! 命令定义和实现

pub mod config;
pub mod labware;
pub mod run;
pub mod servicer;
pub mod teach;
pub mod validate;

pub use config::ConfigCommand;
pub use labware::LabwareCommand;
pub use run::RunCommand;
pub use servicer::{DumpTfTreeCommand, ResetCommand, StatusCommand};
pub use teach::TeachCommand;
pub use validate::ValidateCommand;
