//! 版本信息
//!
//! - [`SchemaVersion`]：每个带版本的 schema 上的 `schema_version` 字段
//! - [`TCODE_API_VERSION`]：写入脚本 metadata 的协议库版本
//! - [`check_api_version`]：读取脚本时的版本兼容性检查（semver）

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 当前协议库版本（写入 `metadata.tcode_api_version`）
pub const TCODE_API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 固定取值的 `schema_version` 字段
///
/// 零大小类型：序列化为整数 `N`，反序列化时只接受 `N`。
/// 字段缺失时（配合 `#[serde(default)]`）视为 `N`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SchemaVersion<const N: u32>;

impl<const N: u32> SchemaVersion<N> {
    pub const VALUE: u32 = N;

    pub const fn get(self) -> u32 {
        N
    }
}

impl<const N: u32> Serialize for SchemaVersion<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(N)
    }
}

impl<'de, const N: u32> Deserialize<'de> for SchemaVersion<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor<const M: u32>;

        impl<const M: u32> Visitor<'_> for VersionVisitor<M> {
            type Value = SchemaVersion<M>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "schema_version {}", M)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                if v == u64::from(M) {
                    Ok(SchemaVersion)
                } else {
                    Err(E::custom(format!(
                        "unsupported schema_version {} (expected {})",
                        v, M
                    )))
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::custom(format!("invalid schema_version {}", v))),
                }
            }
        }

        deserializer.deserialize_u64(VersionVisitor::<N>)
    }
}

/// 比较脚本的 `tcode_api_version` 与当前版本
///
/// 返回 `true` 表示版本一致。版本不同（或无法解析）时记录警告并返回 `false`，
/// 但不会拒绝脚本。
pub fn check_api_version(file_version: &str) -> bool {
    let current = semver::Version::parse(TCODE_API_VERSION);
    let found = semver::Version::parse(file_version);

    match (current, found) {
        (Ok(current), Ok(found)) if current == found => true,
        (Ok(current), Ok(found)) => {
            tracing::warn!(
                file_version = %found,
                current_version = %current,
                "Loaded TCode script was created with a different API version"
            );
            false
        },
        _ => {
            tracing::warn!(
                file_version,
                current_version = TCODE_API_VERSION,
                "Loaded TCode script has an unparseable API version"
            );
            false
        },
    }
}
