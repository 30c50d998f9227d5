//! 几何 schema：网格、孔口截面、孔底形状

use crate::units::ValueWithUnits;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};

/// 规则网格布局（孔板、枪头盒、试管架）
///
/// `row_offset`/`column_offset` 为耗材原点到第一个网格中心的距离。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Grid")]
pub struct GridDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub row_count: u32,
    pub column_count: u32,
    pub row_pitch: ValueWithUnits,
    pub column_pitch: ValueWithUnits,
    pub row_offset: ValueWithUnits,
    pub column_offset: ValueWithUnits,
}

impl GridDescription {
    /// 网格位置总数
    pub fn len(&self) -> u32 {
        self.row_count * self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 行优先索引 → (行, 列)
    pub fn row_column(&self, index: u32) -> Option<(u32, u32)> {
        if self.column_count == 0 || index >= self.len() {
            return None;
        }
        Some((index / self.column_count, index % self.column_count))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Grid")]
pub struct GridDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub row_count: Option<u32>,
    pub column_count: Option<u32>,
    pub row_pitch: Option<ValueWithUnits>,
    pub column_pitch: Option<ValueWithUnits>,
    pub row_offset: Option<ValueWithUnits>,
    pub column_offset: Option<ValueWithUnits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub diameter: ValueWithUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircleDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub diameter: Option<ValueWithUnits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisAlignedRectangleDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub x_length: ValueWithUnits,
    pub y_length: ValueWithUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisAlignedRectangleDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub x_length: Option<ValueWithUnits>,
    pub y_length: Option<ValueWithUnits>,
}

/// 孔口截面形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WellShapeDescription {
    Circle(CircleDescription),
    AxisAlignedRectangle(AxisAlignedRectangleDescription),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WellShapeDescriptor {
    Circle(CircleDescriptor),
    AxisAlignedRectangle(AxisAlignedRectangleDescriptor),
}

/// V 形底的脊线方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VBottomDirection {
    #[serde(rename = "x-axis")]
    XAxis,
    #[serde(rename = "y-axis")]
    YAxis,
}

/// 锥形底；`offset` 为锥体部分的高度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConicalBottomDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub offset: ValueWithUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConicalBottomDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub offset: Option<ValueWithUnits>,
}

/// 平底与圆底没有参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainBottom {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
}

/// V 形底（如试剂槽）；`offset` 为三角部分的高度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VBottomDescription {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub direction: VBottomDirection,
    pub offset: ValueWithUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VBottomDescriptor {
    #[serde(default)]
    pub schema_version: SchemaVersion<1>,
    pub direction: Option<VBottomDirection>,
    pub offset: Option<ValueWithUnits>,
}

/// 孔底形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WellBottomDescription {
    Conical(ConicalBottomDescription),
    Flat(PlainBottom),
    Round(PlainBottom),
    #[serde(rename = "V-Shape")]
    VShape(VBottomDescription),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WellBottomDescriptor {
    Conical(ConicalBottomDescriptor),
    Flat(PlainBottom),
    Round(PlainBottom),
    #[serde(rename = "V-Shape")]
    VShape(VBottomDescriptor),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::mm;
    use serde_json::json;

    fn grid_96() -> GridDescription {
        GridDescription {
            schema_version: SchemaVersion,
            row_count: 8,
            column_count: 12,
            row_pitch: mm(9.0),
            column_pitch: mm(9.0),
            row_offset: mm(11.24),
            column_offset: mm(14.38),
        }
    }

    #[test]
    fn test_grid_carries_type_tag() {
        let json = serde_json::to_value(grid_96()).unwrap();
        assert_eq!(json["type"], "Grid");
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["row_pitch"]["type"], "ValueWithUnits");
    }

    #[test]
    fn test_grid_row_major_index() {
        let grid = grid_96();
        assert_eq!(grid.len(), 96);
        assert_eq!(grid.row_column(0), Some((0, 0)));
        assert_eq!(grid.row_column(11), Some((0, 11)));
        assert_eq!(grid.row_column(84), Some((7, 0)));
        assert_eq!(grid.row_column(95), Some((7, 11)));
        assert_eq!(grid.row_column(96), None);
    }

    #[test]
    fn test_v_shape_wire_name() {
        let bottom = WellBottomDescription::VShape(VBottomDescription {
            schema_version: SchemaVersion,
            direction: VBottomDirection::YAxis,
            offset: mm(2.0),
        });
        let json = serde_json::to_value(&bottom).unwrap();
        assert_eq!(json["type"], "V-Shape");
        assert_eq!(json["direction"], "y-axis");
    }

    #[test]
    fn test_flat_bottom_parses_without_fields() {
        let bottom: WellBottomDescription = serde_json::from_value(json!({"type": "Flat"})).unwrap();
        assert!(matches!(bottom, WellBottomDescription::Flat(_)));
    }

    #[test]
    fn test_descriptor_fields_optional() {
        let grid: GridDescriptor =
            serde_json::from_value(json!({"type": "Grid", "row_count": 8})).unwrap();
        assert_eq!(grid.row_count, Some(8));
        assert!(grid.row_pitch.is_none());

        let shape: WellShapeDescriptor =
            serde_json::from_value(json!({"type": "Circle"})).unwrap();
        assert_eq!(shape, WellShapeDescriptor::Circle(CircleDescriptor::default()));
    }
}
