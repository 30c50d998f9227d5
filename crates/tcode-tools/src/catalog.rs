//! # 耗材目录
//!
//! 按名称查找耗材完整描述（`LabwareDescription`）。
//!
//! - [`DirectoryCatalog`]：目录中的 `<name>.json` 文件
//! - [`InMemoryCatalog`]：测试与嵌入场景
//!
//! 读取时会经过迁移表，旧版本文件（如 v1 枪头盒）加载为最新版本。

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tcode_protocol::LabwareDescription;
use thiserror::Error;

/// 耗材目录环境变量（覆盖默认目录）
pub const LABWARE_DIR_ENV: &str = "TCODE_LABWARE_DIR";

/// 耗材目录错误
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Labware not found: {0}")]
    NotFound(String),

    #[error("Labware file already exists: {}", .0.display())]
    Exists(PathBuf),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid labware file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 耗材目录
pub trait LabwareCatalog {
    /// 按名称加载
    fn load(&self, name: &str) -> Result<LabwareDescription, CatalogError>;

    /// 所有可用名称（排序）
    fn names(&self) -> Result<Vec<String>, CatalogError>;
}

/// 基于目录的耗材目录
///
/// 名称 `name` 先解析为 `<dir>/<name>.json`；该文件不存在时，把 `name` 当作文件路径。
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 默认目录：`$TCODE_LABWARE_DIR`，否则 `<data_dir>/tcode/labware`
    pub fn default_dir() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(LABWARE_DIR_ENV) {
            return Some(PathBuf::from(dir));
        }
        dirs::data_dir().map(|dir| dir.join("tcode").join("labware"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 把名称或路径解析为文件路径（不检查是否存在）
    pub fn resolve(&self, identifier: &str) -> PathBuf {
        let candidate = self.dir.join(format!("{}.json", identifier));
        if candidate.exists() {
            candidate
        } else {
            PathBuf::from(identifier)
        }
    }

    /// 写入 `<dir>/<name>.json`；文件已存在时返回 [`CatalogError::Exists`]
    pub fn write(
        &self,
        name: &str,
        labware: &LabwareDescription,
    ) -> Result<PathBuf, CatalogError> {
        let path = self.dir.join(format!("{}.json", name));
        if path.exists() {
            return Err(CatalogError::Exists(path));
        }
        fs::create_dir_all(&self.dir).map_err(|source| CatalogError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = to_pretty_json(labware).map_err(|source| CatalogError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Wrote labware description");
        Ok(path)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

impl LabwareCatalog for DirectoryCatalog {
    fn load(&self, name: &str) -> Result<LabwareDescription, CatalogError> {
        let path = self.resolve(name);
        if !path.is_file() {
            return Err(CatalogError::NotFound(name.to_string()));
        }

        let text = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CatalogError::Json { path, source })
    }

    fn names(&self) -> Result<Vec<String>, CatalogError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| CatalogError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| CatalogError::Io {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// 内存中的耗材目录
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: BTreeMap<String, LabwareDescription>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入（同名覆盖）
    pub fn insert(&mut self, name: impl Into<String>, labware: impl Into<LabwareDescription>) {
        self.entries.insert(name.into(), labware.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LabwareCatalog for InMemoryCatalog {
    fn load(&self, name: &str) -> Result<LabwareDescription, CatalogError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tcode_protocol::units::mm;
    use tcode_protocol::{LidDescription, NamedTags, SchemaVersion, Tags};

    fn lid() -> LidDescription {
        LidDescription {
            schema_version: SchemaVersion,
            tags: Tags::from(["lid".to_string()]),
            named_tags: NamedTags::new(),
            x_length: mm(127.8),
            y_length: mm(85.5),
            z_length: mm(8.0),
            stackable: true,
        }
    }

    #[test]
    fn test_directory_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirectoryCatalog::new(dir.path());

        let path = catalog.write("plate_lid", &lid().into()).unwrap();
        assert!(path.ends_with("plate_lid.json"));

        let loaded = catalog.load("plate_lid").unwrap();
        assert_eq!(loaded, LabwareDescription::Lid(lid()));
        assert_eq!(catalog.names().unwrap(), vec!["plate_lid".to_string()]);
    }

    #[test]
    fn test_directory_write_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirectoryCatalog::new(dir.path());
        catalog.write("plate_lid", &lid().into()).unwrap();

        let err = catalog.write("plate_lid", &lid().into()).unwrap_err();
        assert!(matches!(err, CatalogError::Exists(_)));
    }

    #[test]
    fn test_directory_falls_back_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let file = elsewhere.path().join("custom.json");
        fs::write(&file, serde_json::to_string(&lid()).unwrap()).unwrap();

        let catalog = DirectoryCatalog::new(dir.path());
        let loaded = catalog.load(file.to_str().unwrap()).unwrap();
        assert_eq!(loaded.type_name(), "Lid");
    }

    #[test]
    fn test_directory_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirectoryCatalog::new(dir.path());
        let err = catalog.load("missing_plate").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(name) if name == "missing_plate"));
    }

    #[test]
    fn test_directory_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("broken.json"),
            json!({"type": "Spaceship"}).to_string(),
        )
        .unwrap();

        let catalog = DirectoryCatalog::new(dir.path());
        let err = catalog.load("broken").unwrap_err();
        assert!(matches!(err, CatalogError::Json { .. }));
    }

    #[test]
    fn test_in_memory_catalog() {
        let mut catalog = InMemoryCatalog::new();
        assert!(catalog.is_empty());
        catalog.insert("lid_b", lid());
        catalog.insert("lid_a", lid());

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().unwrap(), vec!["lid_a", "lid_b"]);
        assert!(catalog.load("lid_a").is_ok());
        assert!(matches!(catalog.load("lid_c"), Err(CatalogError::NotFound(_))));
    }
}
