//! 常用 descriptor 的构造函数
//!
//! 默认值对应标准 SBS 96 孔布局：8 行 × 12 列，行列间距 9 mm。

use tcode_protocol::units::m;
use tcode_protocol::{
    GridDescriptor, LidDescriptor, NamedTags, PipetteTipBoxDescriptor, PipetteTipGroupDescriptor,
    PipetteTipLayout, SchemaVersion, Tags, ValueWithUnits, WellPlateDescriptor,
};

/// 网格参数
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub row_count: u32,
    pub column_count: u32,
    pub row_pitch: ValueWithUnits,
    pub column_pitch: ValueWithUnits,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            row_count: 8,
            column_count: 12,
            row_pitch: m(0.009),
            column_pitch: m(0.009),
        }
    }
}

impl GridLayout {
    pub fn new(row_count: u32, column_count: u32) -> Self {
        Self {
            row_count,
            column_count,
            ..Self::default()
        }
    }

    pub fn descriptor(&self) -> GridDescriptor {
        GridDescriptor {
            schema_version: SchemaVersion,
            row_count: Some(self.row_count),
            column_count: Some(self.column_count),
            row_pitch: Some(self.row_pitch.clone()),
            column_pitch: Some(self.column_pitch.clone()),
            row_offset: None,
            column_offset: None,
        }
    }
}

/// 孔板；`has_lid` 时要求带盖
pub fn describe_well_plate(
    tags: Tags,
    named_tags: NamedTags,
    grid: &GridLayout,
    has_lid: bool,
) -> WellPlateDescriptor {
    WellPlateDescriptor {
        tags,
        named_tags,
        grid: Some(grid.descriptor()),
        lid: has_lid.then(LidDescriptor::default),
        ..WellPlateDescriptor::default()
    }
}

/// 枪头盒；`full` 决定布局为满盒或空盒
pub fn describe_pipette_tip_box(
    tags: Tags,
    named_tags: NamedTags,
    grid: &GridLayout,
    full: bool,
) -> PipetteTipBoxDescriptor {
    let (rows, columns) = (grid.row_count as usize, grid.column_count as usize);
    let layout = if full {
        PipetteTipLayout::full(rows, columns)
    } else {
        PipetteTipLayout::empty(rows, columns)
    };

    PipetteTipBoxDescriptor {
        tags,
        named_tags,
        grid: Some(grid.descriptor()),
        pipette_tip_layout: Some(layout),
        ..PipetteTipBoxDescriptor::default()
    }
}

/// 枪头组；组内每个枪头都要带有 `tags` 与 `named_tags`
pub fn describe_pipette_tip_group(
    row_count: u32,
    column_count: u32,
    tags: Tags,
    named_tags: NamedTags,
) -> PipetteTipGroupDescriptor {
    PipetteTipGroupDescriptor {
        pipette_tip_tags: tags,
        pipette_tip_named_tags: named_tags,
        ..PipetteTipGroupDescriptor::new(row_count, column_count)
    }
}

/// 单个枪头
pub fn describe_pipette_tip_1x1(tags: Tags, named_tags: NamedTags) -> PipetteTipGroupDescriptor {
    describe_pipette_tip_group(1, 1, tags, named_tags)
}

/// 八通道移液器用的一排枪头
pub fn describe_pipette_tip_1x8(tags: Tags, named_tags: NamedTags) -> PipetteTipGroupDescriptor {
    describe_pipette_tip_group(1, 8, tags, named_tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcode_protocol::{LabwareDescriptor, TagValue};

    #[test]
    fn test_default_grid() {
        let grid = GridLayout::default().descriptor();
        assert_eq!(grid.row_count, Some(8));
        assert_eq!(grid.column_count, Some(12));
        assert_eq!(grid.row_pitch, Some(m(0.009)));
        assert!(grid.row_offset.is_none());
    }

    #[test]
    fn test_well_plate_with_lid() {
        let plate = describe_well_plate(
            vec!["pcr".into()],
            NamedTags::new(),
            &GridLayout::default(),
            true,
        );
        assert!(plate.lid.is_some());
        assert_eq!(plate.tags, vec!["pcr".to_string()]);

        let plate = describe_well_plate(Tags::new(), NamedTags::new(), &GridLayout::new(4, 6), false);
        assert!(plate.lid.is_none());
        assert_eq!(plate.grid.unwrap().column_count, Some(6));
    }

    #[test]
    fn test_pipette_tip_box_layout() {
        let full = describe_pipette_tip_box(Tags::new(), NamedTags::new(), &GridLayout::default(), true);
        assert_eq!(full.pipette_tip_layout.as_ref().unwrap().tip_count(), 96);

        let empty =
            describe_pipette_tip_box(Tags::new(), NamedTags::new(), &GridLayout::new(2, 3), false);
        assert_eq!(empty.pipette_tip_layout.as_ref().unwrap().tip_count(), 0);

        // 以最新版本写出
        let json = serde_json::to_value(LabwareDescriptor::from(full)).unwrap();
        assert_eq!(json["type"], "PipetteTipBox");
        assert_eq!(json["schema_version"], 2);
    }

    #[test]
    fn test_pipette_tip_groups() {
        let mut named = NamedTags::new();
        named.insert("volume_ul".into(), TagValue::Int(200));

        let single = describe_pipette_tip_1x1(Tags::new(), named.clone());
        assert_eq!((single.row_count, single.column_count), (1, 1));
        assert_eq!(single.pipette_tip_named_tags, named);

        let row = describe_pipette_tip_1x8(vec!["filtered".into()], NamedTags::new());
        assert_eq!((row.row_count, row.column_count), (1, 8));
        assert_eq!(row.pipette_tip_tags, vec!["filtered".to_string()]);
    }
}
