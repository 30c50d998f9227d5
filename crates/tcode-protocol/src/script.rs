//! TCode 脚本文件
//!
//! 脚本是一个 JSON 文档：元数据 + 按执行顺序排列的命令列表。
//!
//! ```json
//! {
//!   "type": "TCodeScript",
//!   "schema_version": 1,
//!   "metadata": {"type": "Metadata", "schema_version": 1, "name": "demo",
//!                "timestamp": "2024-06-01T12:00:00.000000+08:00",
//!                "tcode_api_version": "0.4.2", "description": null},
//!   "commands": [{"type": "PAUSE", "schema_version": 1}]
//! }
//! ```

use crate::commands::TCode;
use crate::error::ProtocolError;
use crate::version::{SchemaVersion, TCODE_API_VERSION, check_api_version};
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// 脚本元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Metadata")]
pub struct Metadata {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub name: String,
    /// 生成时间（ISO 8601，本地时区）
    pub timestamp: String,
    /// 生成脚本时的协议库版本
    pub tcode_api_version: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// TCode 脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "TCodeScript")]
pub struct TCodeScript {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub metadata: Metadata,
    #[serde(default)]
    pub commands: Vec<TCode>,
}

impl TCodeScript {
    /// 创建空脚本，记录当前时间与协议库版本
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            schema_version: SchemaVersion,
            metadata: Metadata {
                schema_version: SchemaVersion,
                name: name.into(),
                timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
                tcode_api_version: TCODE_API_VERSION.to_string(),
                description,
            },
            commands: Vec::new(),
        }
    }

    /// 从 JSON 读取脚本
    ///
    /// 脚本的 `tcode_api_version` 与当前版本不同时记录警告，但仍然加载。
    pub fn read(reader: impl Read) -> Result<Self, ProtocolError> {
        let script: Self = serde_json::from_reader(reader)?;
        check_api_version(&script.metadata.tcode_api_version);
        Ok(script)
    }

    /// 以带缩进的 JSON 写出
    pub fn write(&self, mut writer: impl Write) -> Result<(), ProtocolError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let file = File::open(path.as_ref())?;
        Self::read(BufReader::new(file))
    }

    /// 保存到文件
    ///
    /// `overwrite` 为 `false` 且文件已存在时返回 [`ProtocolError::FileExists`]。
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<(), ProtocolError> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let file = options.open(path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ProtocolError::FileExists(path.to_path_buf()),
            _ => ProtocolError::Io(e),
        })?;
        self.write(BufWriter::new(file))?;
        tracing::debug!(path = %path.display(), commands = self.commands.len(), "Saved TCode script");
        Ok(())
    }

    /// 返回去掉 `ADD_LABWARE` 与 `CREATE_LABWARE` 的副本
    ///
    /// 用于在已经初始化过耗材的 fleet 上串联执行多个脚本。
    pub fn remove_add_create_labware_commands(&self) -> Self {
        let mut script = self.clone();
        script.strip_labware_instantiation();
        script
    }

    /// 原地去掉 `ADD_LABWARE` 与 `CREATE_LABWARE`
    pub fn strip_labware_instantiation(&mut self) {
        self.commands
            .retain(|c| !matches!(c, TCode::AddLabware(_) | TCode::CreateLabware(_)));
    }

    /// 比较两个脚本，忽略 `metadata.timestamp`
    pub fn equals_ignoring_timestamp(&self, other: &Self) -> bool {
        let metadata_equal = self.metadata.name == other.metadata.name
            && self.metadata.description == other.metadata.description
            && self.metadata.tcode_api_version == other.metadata.tcode_api_version;
        metadata_equal && self.commands == other.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Comment, CreateLabware, Pause};
    use serde_json::json;

    fn sample() -> TCodeScript {
        let mut script = TCodeScript::new("sample", Some("unit test".into()));
        script.commands.push(Pause::default().into());
        script.commands.push(
            Comment {
                schema_version: SchemaVersion,
                text: "hello".into(),
            }
            .into(),
        );
        script
    }

    #[test]
    fn test_new_stamps_metadata() {
        let script = TCodeScript::new("demo", None);
        assert_eq!(script.metadata.tcode_api_version, TCODE_API_VERSION);
        assert!(chrono::DateTime::parse_from_rfc3339(&script.metadata.timestamp).is_ok());
        assert!(script.commands.is_empty());
    }

    #[test]
    fn test_write_read_in_memory() {
        let script = sample();
        let mut buffer = Vec::new();
        script.write(&mut buffer).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["type"], "TCodeScript");
        assert_eq!(json["metadata"]["type"], "Metadata");
        assert_eq!(json["commands"][0]["type"], "PAUSE");

        let loaded = TCodeScript::read(buffer.as_slice()).unwrap();
        assert_eq!(loaded, script);
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        let script = sample();

        script.save(&path, false).unwrap();
        let err = script.save(&path, false).unwrap_err();
        assert!(matches!(err, ProtocolError::FileExists(_)));

        // 显式覆盖
        script.save(&path, true).unwrap();
        assert_eq!(TCodeScript::load(&path).unwrap(), script);
    }

    #[test]
    fn test_read_foreign_version_still_loads() {
        let json = json!({
            "type": "TCodeScript",
            "metadata": {"type": "Metadata", "name": "old", "timestamp": "2020-01-01T00:00:00",
                         "tcode_api_version": "0.0.1"},
            "commands": [],
        });
        let script = TCodeScript::read(json.to_string().as_bytes()).unwrap();
        assert_eq!(script.metadata.tcode_api_version, "0.0.1");
        assert!(script.metadata.description.is_none());
    }

    #[test]
    fn test_strip_labware_instantiation() {
        let mut script = sample();
        let create: TCode = serde_json::from_value::<CreateLabware>(json!({
            "robot_id": "r0",
            "description": {
                "type": "Lid", "stackable": false,
                "x_length": {"magnitude": 1.0, "units": "mm"},
                "y_length": {"magnitude": 1.0, "units": "mm"},
                "z_length": {"magnitude": 1.0, "units": "mm"},
            },
            "holder": {"type": "LabwareHolderName", "robot_id": "r0", "name": "DeckSlot_1"},
        }))
        .unwrap()
        .into();
        script.commands.insert(1, create);
        assert_eq!(script.commands.len(), 3);

        let stripped = script.remove_add_create_labware_commands();
        assert_eq!(stripped.commands.len(), 2);
        assert_eq!(script.commands.len(), 3);
    }

    #[test]
    fn test_equals_ignoring_timestamp() {
        let a = sample();
        let mut b = a.clone();
        b.metadata.timestamp = "1999-12-31T23:59:59".into();
        assert!(a.equals_ignoring_timestamp(&b));
        assert_ne!(a, b);

        b.commands.pop();
        assert!(!a.equals_ignoring_timestamp(&b));
    }
}
