//! 4×4 齐次变换矩阵
//!
//! 线路格式为行优先的嵌套数组 `[[f64; 4]; 4]`。所有可选偏移量的默认值都是单位矩阵。

use crate::units::{UnitsError, ValueWithUnits};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// 4×4 行优先变换矩阵
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(pub [[f64; 4]; 4]);

impl Transform {
    /// 单位矩阵
    pub const IDENTITY: Self = Transform([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// 纯平移（单位：米）
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut rows = Self::IDENTITY.0;
        rows[0][3] = x;
        rows[1][3] = y;
        rows[2][3] = z;
        Transform(rows)
    }

    /// 平移分量（米）
    pub fn translation(&self) -> [f64; 3] {
        [self.0[0][3], self.0[1][3], self.0[2][3]]
    }

    /// 平移分量的欧氏长度（米）
    pub fn translation_norm(&self) -> f64 {
        let [x, y, z] = self.translation();
        (x * x + y * y + z * z).sqrt()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// 转换为 nalgebra 矩阵
    pub fn to_matrix4(&self) -> Matrix4<f64> {
        Matrix4::from_fn(|r, c| self.0[r][c])
    }

    /// 从 nalgebra 矩阵构造
    pub fn from_matrix4(matrix: &Matrix4<f64>) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = matrix[(r, c)];
            }
        }
        Transform(rows)
    }

    /// 复合变换 `self * other`（先 other 后 self）
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform::from_matrix4(&(self.to_matrix4() * other.to_matrix4()))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[[f64; 4]; 4]> for Transform {
    fn from(rows: [[f64; 4]; 4]) -> Self {
        Transform(rows)
    }
}

/// 构造变换矩阵
///
/// `x`/`y`/`z` 为平移（任意长度单位，内部换算为米），`a` 为绕 z 轴的旋转
/// （任意角度单位）。未提供的分量取 0。
///
/// # Example
///
/// ```rust
/// use tcode_protocol::transform::create_transform;
/// use tcode_protocol::units::mm;
///
/// let t = create_transform(None, None, Some(&mm(5.0)), None).unwrap();
/// assert!((t.translation()[2] - 0.005).abs() < 1e-12);
/// ```
pub fn create_transform(
    x: Option<&ValueWithUnits>,
    y: Option<&ValueWithUnits>,
    z: Option<&ValueWithUnits>,
    a: Option<&ValueWithUnits>,
) -> Result<Transform, UnitsError> {
    let meters = |v: Option<&ValueWithUnits>| -> Result<f64, UnitsError> {
        v.map_or(Ok(0.0), |v| v.magnitude_in("m"))
    };
    let x = meters(x)?;
    let y = meters(y)?;
    let z = meters(z)?;
    let a = a.map_or(Ok(0.0), |v| v.magnitude_in("rad"))?;

    let (sin, cos) = a.sin_cos();
    Ok(Transform([
        [cos, -sin, 0.0, x],
        [sin, cos, 0.0, y],
        [0.0, 0.0, 1.0, z],
        [0.0, 0.0, 0.0, 1.0],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{mm, rad, s};

    #[test]
    fn test_identity_default() {
        assert_eq!(Transform::default(), Transform::IDENTITY);
        assert!(Transform::default().is_identity());
    }

    #[test]
    fn test_wire_format_is_nested_rows() {
        let json = serde_json::to_value(Transform::from_translation(0.1, 0.0, 0.0)).unwrap();
        assert_eq!(json[0][3], 0.1);
        assert_eq!(json.as_array().unwrap().len(), 4);

        // 非 4×4 矩阵解析失败
        let bad: Result<Transform, _> = serde_json::from_str("[[1.0, 0.0], [0.0, 1.0]]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_create_transform_converts_to_meters() {
        let t = create_transform(Some(&mm(10.0)), Some(&mm(-20.0)), Some(&mm(30.0)), None)
            .unwrap();
        let [x, y, z] = t.translation();
        assert!((x - 0.01).abs() < 1e-12);
        assert!((y + 0.02).abs() < 1e-12);
        assert!((z - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_create_transform_rotation_about_z() {
        let t = create_transform(None, None, None, Some(&rad(std::f64::consts::FRAC_PI_2)))
            .unwrap();
        assert!(t.0[0][0].abs() < 1e-12);
        assert!((t.0[1][0] - 1.0).abs() < 1e-12);
        assert!((t.0[0][1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_create_transform_rejects_wrong_dimension() {
        assert!(create_transform(Some(&s(1.0)), None, None, None).is_err());
    }

    #[test]
    fn test_compose_translations() {
        let a = Transform::from_translation(0.1, 0.0, 0.0);
        let b = Transform::from_translation(0.0, 0.2, 0.0);
        let c = a.compose(&b);
        let [x, y, _] = c.translation();
        assert!((x - 0.1).abs() < 1e-12);
        assert!((y - 0.2).abs() < 1e-12);
        assert!((c.translation_norm() - (0.05f64).sqrt()).abs() < 1e-12);
    }
}
